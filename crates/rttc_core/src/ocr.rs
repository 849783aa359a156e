//! crates/rttc_core/src/ocr.rs
//!
//! Image → text → translation pipeline.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{OcrCapture, OcrRecord, TranslationResult};
use crate::history::HistoryStore;
use crate::normalize::coerce_to_text;
use crate::orchestrator::Orchestrator;
use crate::ports::OcrService;

/// Reads the text of a picture, translates it and records the capture.
pub struct ImageTranslator {
    ocr: Arc<dyn OcrService>,
    orchestrator: Orchestrator,
    history: Arc<HistoryStore<OcrRecord>>,
}

impl ImageTranslator {
    pub fn new(
        ocr: Arc<dyn OcrService>,
        orchestrator: Orchestrator,
        history: Arc<HistoryStore<OcrRecord>>,
    ) -> Self {
        Self {
            ocr,
            orchestrator,
            history,
        }
    }

    /// Returns `None` when OCR fails, finds no text, or translation fails.
    pub async fn run(&self, image_url: &str, target_language: &str) -> Option<TranslationResult> {
        let reply = match self.ocr.extract_text(image_url).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("OCR failed for {}: {}", image_url, e);
                return None;
            }
        };

        let extracted = coerce_to_text(&reply);
        if extracted.trim().is_empty() {
            debug!("No text found in {}", image_url);
            return None;
        }

        let history = &self.history;
        self.orchestrator
            .translate_and_record(extracted.trim(), target_language, |result| async move {
                // Failures are kept in the history view.
                let _ = history
                    .save(OcrCapture {
                        image_url: image_url.to_string(),
                        result,
                    })
                    .await;
            })
            .await
    }
}
