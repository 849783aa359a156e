//! services/app/src/bin/app.rs

use app_lib::{
    adapters::{
        tts::parse_voice, Argon2Verifier, DbAdapter, FileSessionStorage, OpenAiOcrAdapter,
        OpenAiSstAdapter, OpenAiTtsAdapter, RapidApiTranslateAdapter,
    },
    config::{Config, ConfigError},
    error::AppError,
    web::{self, state::Services, AppState},
};
use async_openai::{config::OpenAIConfig, types::SpeechModel, Client};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use rttc_core::ports::{OcrService, SpeechToTextService, TextToSpeechService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type OpenAiServices = (
    Option<Arc<dyn OcrService>>,
    Option<Arc<dyn SpeechToTextService>>,
    Option<Arc<dyn TextToSpeechService>>,
);

/// Builds the OpenAI-backed adapters, or none of them when no key is configured.
fn openai_services(config: &Config) -> Result<OpenAiServices, AppError> {
    let Some(api_key) = config.openai_api_key.as_ref() else {
        warn!("OPENAI_API_KEY is not set; OCR, transcription and speech are disabled.");
        return Ok((None, None, None));
    };
    let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));

    let tts_voice = parse_voice(&config.tts_voice).ok_or_else(|| {
        ConfigError::InvalidValue(
            "TTS_VOICE".to_string(),
            format!("'{}' is not a known voice", config.tts_voice),
        )
    })?;

    let ocr: Arc<dyn OcrService> = Arc::new(OpenAiOcrAdapter::new(
        openai_client.clone(),
        config.ocr_model.clone(),
    ));
    let stt: Arc<dyn SpeechToTextService> = Arc::new(OpenAiSstAdapter::new(
        openai_client.clone(),
        config.stt_model.clone(),
    ));
    let tts: Arc<dyn TextToSpeechService> = Arc::new(OpenAiTtsAdapter::new(
        openai_client,
        SpeechModel::Tts1,
        tts_voice,
    ));
    Ok((Some(ocr), Some(stt), Some(tts)))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting bridge...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let http = reqwest::Client::builder().build()?;
    let translate_adapter = Arc::new(RapidApiTranslateAdapter::new(
        http,
        config.translate_base_url.clone(),
        config.rapidapi_key.clone(),
        config.rapidapi_host.clone(),
    ));
    let (ocr, stt, tts) = openai_services(&config)?;

    // --- 4. Build the Shared AppState & Restore the Session ---
    let services = Services {
        accounts: db_adapter.clone(),
        translations: db_adapter.clone(),
        conversations: db_adapter.clone(),
        ocr_history: db_adapter.clone(),
        phrases: db_adapter,
        session_storage: Arc::new(FileSessionStorage::new(config.session_path.clone())),
        verifier: Arc::new(Argon2Verifier::new()),
        detector: translate_adapter.clone(),
        translator: translate_adapter,
        ocr,
        stt,
        tts,
    };
    let app_state = Arc::new(AppState::new(config.clone(), services));
    // Nothing may read the stores before the cached profile is back.
    let restored = app_state.session.restore_session().await;
    info!("Session state at startup: {:?}", restored);

    // --- 5. Create the Web Router ---
    let allowed_origin = config.allowed_origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);
    let app = web::router(app_state).layer(cors);

    // --- 6. Start the Server ---
    info!("Starting bridge on {}", config.bind_address);
    info!(
        "OpenAPI document available at http://{}/api-docs/openapi.json",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
