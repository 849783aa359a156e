//! services/app/src/adapters/ocr.rs
//!
//! This module contains the OCR adapter backed by an OpenAI vision model.
//! It implements the `OcrService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use rttc_core::ports::{OcrService, PortError, PortResult};
use serde_json::Value;
use std::sync::OnceLock;

const OCR_INSTRUCTIONS: &str = "You read text from photos of signs, menus and documents. \
Reply with the text exactly as written in the image, keeping line breaks, and nothing else. \
If the image contains no readable text, reply with an empty string.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `OcrService` using an OpenAI vision-capable model.
#[derive(Clone)]
pub struct OpenAiOcrAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiOcrAdapter {
    /// Creates a new `OpenAiOcrAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

static CODE_FENCE: OnceLock<Regex> = OnceLock::new();

fn code_fence() -> &'static Regex {
    CODE_FENCE.get_or_init(|| {
        Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").expect("code fence pattern is valid")
    })
}

/// Models sometimes wrap their answer in JSON or a markdown fence; keep it structured
/// when they do.
fn parse_reply(content: &str) -> Value {
    let content = content.trim();
    let trimmed = match code_fence().captures(content).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => content,
    };
    if trimmed.starts_with('{') {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
            return value;
        }
    }
    Value::String(trimmed.to_string())
}

//=========================================================================================
// `OcrService` Trait Implementation
//=========================================================================================

#[async_trait]
impl OcrService for OpenAiOcrAdapter {
    async fn extract_text(&self, image_url: &str) -> PortResult<Value> {
        let image = ImageUrlArgs::default()
            .url(image_url)
            .detail(ImageDetail::High)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
            ChatCompletionRequestMessageContentPartTextArgs::default()
                .text("Extract the text from this image.")
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(image)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(OCR_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(parts)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Malformed("OCR model returned no text content.".to_string())
            })?;
        Ok(parse_reply(&content))
    }
}
