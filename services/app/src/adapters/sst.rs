//! services/app/src/adapters/sst.rs
//!
//! This module contains the adapter for OpenAI's Speech-to-Text (Whisper) service.
//! It implements the `SpeechToTextService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{AudioInput, CreateTranscriptionRequestArgs},
    Client,
};
use async_trait::async_trait;
use hound::{WavSpec, WavWriter};
use rttc_core::ports::{PortError, PortResult, SpeechToTextService};

/// Sample rate of the PCM16 clips recorded by the device microphone.
pub const DEVICE_SAMPLE_RATE: u32 = 16_000;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SpeechToTextService` port using the OpenAI Whisper API.
#[derive(Clone)]
pub struct OpenAiSstAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSstAdapter {
    /// Creates a new `OpenAiSstAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Wraps mono little-endian PCM16 samples in a WAV container.
pub fn pcm16_to_wav(pcm_data: &[u8], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let mut cursor = std::io::Cursor::new(Vec::new());

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::new(&mut cursor, spec)?;
    for chunk in pcm_data.chunks_exact(2) {
        let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}

//=========================================================================================
// `SpeechToTextService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SpeechToTextService for OpenAiSstAdapter {
    /// Transcribes a PCM16 clip with the configured Whisper model.
    async fn transcribe(&self, audio_data: &[u8], language: Option<&str>) -> PortResult<String> {
        let wav_data = pcm16_to_wav(audio_data, DEVICE_SAMPLE_RATE)
            .map_err(|e| PortError::Unexpected(format!("Failed to encode WAV: {}", e)))?;

        let mut request = CreateTranscriptionRequestArgs::default();
        request
            .file(AudioInput::from_vec_u8("recording.wav".to_string(), wav_data))
            .model(self.model.clone());
        if let Some(language) = language {
            request.language(language);
        }
        let request = request
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        Ok(response.text.trim().to_string())
    }
}
