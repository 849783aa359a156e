//! services/app/src/adapters/rapidapi.rs
//!
//! This module contains the adapter for the RapidAPI "translateai" gateway.
//! It implements the `LanguageDetectionService` and `TranslationService` ports.

use async_trait::async_trait;
use reqwest::Client;
use rttc_core::domain::Detection;
use rttc_core::normalize::{extract_detection, extract_translation};
use rttc_core::ports::{LanguageDetectionService, PortError, PortResult, TranslationService};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

//=========================================================================================
// Wire Payloads
//=========================================================================================

#[derive(Serialize)]
struct DetectRequest<'a> {
    input_text: &'a str,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    origin_language: &'a str,
    target_language: &'a str,
    input_text: &'a str,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter for the detect and translate endpoints of one RapidAPI host.
#[derive(Clone)]
pub struct RapidApiTranslateAdapter {
    http: Client,
    base_url: String,
    api_key: String,
    api_host: String,
}

impl RapidApiTranslateAdapter {
    /// Creates a new `RapidApiTranslateAdapter`.
    pub fn new(http: Client, base_url: String, api_key: String, api_host: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_host,
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> PortResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .json(body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "{} returned {}: {}",
                url, status, text
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PortError::Malformed(format!("{} returned invalid JSON: {}", url, e)))
    }
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl LanguageDetectionService for RapidApiTranslateAdapter {
    async fn detect(&self, text: &str) -> PortResult<Detection> {
        let reply = self.post("/detect", &DetectRequest { input_text: text }).await?;
        let (language, confidence) = extract_detection(&reply)
            .ok_or_else(|| PortError::Malformed(format!("no language in {}", reply)))?;
        debug!("Detected '{}' ({:?})", language, confidence);
        Ok(Detection {
            language,
            confidence,
        })
    }
}

#[async_trait]
impl TranslationService for RapidApiTranslateAdapter {
    async fn translate(&self, source: &str, target: &str, text: &str) -> PortResult<String> {
        let request = TranslateRequest {
            origin_language: source,
            target_language: target,
            input_text: text,
        };
        let reply = self.post("/google/translate/text", &request).await?;
        extract_translation(&reply)
            .ok_or_else(|| PortError::Malformed(format!("no translation in {}", reply)))
    }
}
