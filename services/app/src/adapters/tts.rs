//! services/app/src/adapters/tts.rs
//!
//! This module contains the adapter for OpenAI's Text-to-Speech (TTS) service.
//! It implements the `TextToSpeechService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequestArgs, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use rttc_core::ports::{PortError, PortResult, TextToSpeechService};
use tracing::debug;

/// Playback speed used when reading translations aloud.
const SPEECH_RATE: f32 = 0.9;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `TextToSpeechService` port using the OpenAI TTS API.
#[derive(Clone)]
pub struct OpenAiTtsAdapter {
    client: Client<OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
}

impl OpenAiTtsAdapter {
    /// Creates a new `OpenAiTtsAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: SpeechModel, voice: Voice) -> Self {
        Self {
            client,
            model,
            voice,
        }
    }
}

/// Maps a configured voice name onto the API's voices.
pub fn parse_voice(name: &str) -> Option<Voice> {
    match name.to_lowercase().as_str() {
        "alloy" => Some(Voice::Alloy),
        "echo" => Some(Voice::Echo),
        "fable" => Some(Voice::Fable),
        "onyx" => Some(Voice::Onyx),
        "nova" => Some(Voice::Nova),
        "shimmer" => Some(Voice::Shimmer),
        _ => None,
    }
}

//=========================================================================================
// `TextToSpeechService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextToSpeechService for OpenAiTtsAdapter {
    /// Generates audio for `text`. The voices are multilingual and pick the language up
    /// from the text itself, so the locale is only logged.
    async fn synthesize(&self, text: &str, locale: &str) -> PortResult<Vec<u8>> {
        debug!("Synthesizing {} characters for {}", text.len(), locale);
        let request = CreateSpeechRequestArgs::default()
            .model(self.model.clone())
            .input(text)
            .voice(self.voice.clone())
            .speed(SPEECH_RATE)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        Ok(response.bytes.to_vec())
    }
}
