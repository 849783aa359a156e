//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use rttc_core::languages::is_language_code;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub allowed_origin: String,
    pub database_url: String,
    pub log_level: Level,
    pub rapidapi_key: String,
    pub rapidapi_host: String,
    pub translate_base_url: String,
    pub openai_api_key: Option<String>,
    pub ocr_model: String,
    pub stt_model: String,
    pub tts_voice: String,
    pub session_path: PathBuf,
    pub default_language: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required =
            |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        // --- Bridge and Database Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "127.0.0.1:8787");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;
        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:8081");

        let database_url = required("DATABASE_URL")?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Translation Gateway ---
        let rapidapi_key = required("RAPIDAPI_KEY")?;
        let rapidapi_host = var_or("RAPIDAPI_HOST", "translateai.p.rapidapi.com");
        let translate_base_url = var_or(
            "TRANSLATE_BASE_URL",
            &format!("https://{}", rapidapi_host),
        );

        // --- OpenAI-backed Services (optional) ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|key| !key.is_empty());
        let ocr_model = var_or("OCR_MODEL", "gpt-4o-mini");
        let stt_model = var_or("STT_MODEL", "whisper-1");
        let tts_voice = var_or("TTS_VOICE", "alloy");

        // --- Device Session ---
        let session_path = lookup("SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./.rttc/session.json"));
        let default_language = var_or("DEFAULT_LANGUAGE", "pt");
        if !is_language_code(&default_language) {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_LANGUAGE".to_string(),
                format!("'{}' is not a two-letter language code", default_language),
            ));
        }

        Ok(Self {
            bind_address,
            allowed_origin,
            database_url,
            log_level,
            rapidapi_key,
            rapidapi_host,
            translate_base_url,
            openai_api_key,
            ocr_model,
            stt_model,
            tts_voice,
            session_path,
            default_language,
        })
    }
}
