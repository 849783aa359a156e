//! crates/rttc_core/src/orchestrator.rs
//!
//! Sequences detect → translate → normalize for a single input. Shared by the voice,
//! conversation, image and typed-text flows.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::TranslationResult;
use crate::ports::{LanguageDetectionService, TranslationService};

/// Runs one detection followed by one translation.
///
/// Failures never escape as errors: the caller only checks whether a result came back.
#[derive(Clone)]
pub struct Orchestrator {
    detector: Arc<dyn LanguageDetectionService>,
    translator: Arc<dyn TranslationService>,
}

impl Orchestrator {
    pub fn new(
        detector: Arc<dyn LanguageDetectionService>,
        translator: Arc<dyn TranslationService>,
    ) -> Self {
        Self {
            detector,
            translator,
        }
    }

    /// Detects the language of `text` and translates it into `target_language`.
    ///
    /// Returns `None` for blank input (no remote call is made) or when either remote
    /// call fails or answers with an unusable payload. Nothing is retried. Translation
    /// still runs when the detected language equals the target.
    pub async fn translate_and_detect(
        &self,
        text: &str,
        target_language: &str,
    ) -> Option<TranslationResult> {
        if text.trim().is_empty() {
            debug!("Skipping translation of blank input");
            return None;
        }

        let detection = match self.detector.detect(text).await {
            Ok(detection) if !detection.language.trim().is_empty() => detection,
            Ok(_) => {
                warn!("Language detection returned no language");
                return None;
            }
            Err(e) => {
                warn!("Language detection failed: {}", e);
                return None;
            }
        };
        debug!(
            language = %detection.language,
            confidence = ?detection.confidence,
            "Detected input language"
        );

        let translated_text = match self
            .translator
            .translate(&detection.language, target_language, text)
            .await
        {
            Ok(translated) if !translated.trim().is_empty() => translated,
            Ok(_) => {
                warn!("Translation returned an empty text");
                return None;
            }
            Err(e) => {
                warn!(
                    "Translation {} -> {} failed: {}",
                    detection.language, target_language, e
                );
                return None;
            }
        };

        Some(TranslationResult {
            original_text: text.to_string(),
            translated_text,
            detected_language: detection.language,
            target_lang: target_language.to_string(),
        })
    }

    /// Runs [`Self::translate_and_detect`] and hands a successful result to `persist`.
    ///
    /// The result is returned whatever `persist` does; persistence reports its own
    /// failures through the store it writes to.
    pub async fn translate_and_record<F, Fut>(
        &self,
        text: &str,
        target_language: &str,
        persist: F,
    ) -> Option<TranslationResult>
    where
        F: FnOnce(TranslationResult) -> Fut,
        Fut: Future<Output = ()>,
    {
        let result = self.translate_and_detect(text, target_language).await?;
        persist(result.clone()).await;
        Some(result)
    }
}
