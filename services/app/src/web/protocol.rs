//! services/app/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the mobile UI and the local bridge.

use chrono::{DateTime, NaiveDate, Utc};
use rttc_core::domain::{
    BilingualRecord, OcrRecord, Phrase, SessionState, SpeakerSide, TranslationRecord,
    TranslationResult, User,
};
use rttc_core::languages::Language;
use rttc_core::speech::SpeechEvent;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Session
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub preferred_language: String,
}

#[derive(Deserialize, ToSchema)]
pub struct PreferredLanguageRequest {
    pub language: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub preferred_language: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            preferred_language: user.preferred_language,
        }
    }
}

/// The current session as the UI sees it.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// One of `authenticated`, `guest` or `unauthenticated`.
    pub state: String,
    pub user: Option<UserResponse>,
    /// The language translations default to.
    pub preferred_language: String,
}

impl SessionResponse {
    pub fn new(state: SessionState, preferred_language: String) -> Self {
        let (name, user) = match state {
            SessionState::Authenticated(user) => ("authenticated", Some(user.into())),
            SessionState::Guest => ("guest", None),
            SessionState::Unauthenticated => ("unauthenticated", None),
        };
        Self {
            state: name.to_string(),
            user,
            preferred_language,
        }
    }
}

//=========================================================================================
// Translation
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct TranslateRequest {
    pub text: String,
    /// Defaults to the user's preferred language.
    pub target_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TranslationResponse {
    pub original_text: String,
    pub translated_text: String,
    pub detected_language: String,
    pub target_language: String,
}

impl From<TranslationResult> for TranslationResponse {
    fn from(result: TranslationResult) -> Self {
        Self {
            original_text: result.original_text,
            translated_text: result.translated_text,
            detected_language: result.detected_language,
            target_language: result.target_lang,
        }
    }
}

//=========================================================================================
// History
//=========================================================================================

/// The three history lists kept per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Translations,
    Conversations,
    Ocr,
}

/// Conversation participant as sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub enum Side {
    A,
    B,
}

impl From<Side> for SpeakerSide {
    fn from(side: Side) -> Self {
        match side {
            Side::A => SpeakerSide::A,
            Side::B => SpeakerSide::B,
        }
    }
}

impl From<SpeakerSide> for Side {
    fn from(side: SpeakerSide) -> Self {
        match side {
            SpeakerSide::A => Side::A,
            SpeakerSide::B => Side::B,
        }
    }
}

/// One row of any history list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HistoryItem {
    pub id: Uuid,
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<TranslationRecord> for HistoryItem {
    fn from(record: TranslationRecord) -> Self {
        Self {
            id: record.id,
            original_text: record.original_text,
            translated_text: record.translated_text,
            source_language: record.source_language,
            target_language: record.target_language,
            is_favorite: record.is_favorite,
            created_at: record.created_at,
            speaker_side: None,
            image_url: None,
        }
    }
}

impl From<BilingualRecord> for HistoryItem {
    fn from(record: BilingualRecord) -> Self {
        Self {
            id: record.id,
            original_text: record.original_text,
            translated_text: record.translated_text,
            source_language: record.source_lang,
            target_language: record.target_lang,
            is_favorite: record.is_favorite,
            created_at: record.created_at,
            speaker_side: Some(record.speaker_side.into()),
            image_url: None,
        }
    }
}

impl From<OcrRecord> for HistoryItem {
    fn from(record: OcrRecord) -> Self {
        Self {
            id: record.id,
            original_text: record.extracted_text,
            translated_text: record.translated_text,
            source_language: record.source_language,
            target_language: record.target_language,
            is_favorite: record.is_favorite,
            created_at: record.created_at,
            speaker_side: None,
            image_url: Some(record.image_url),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct FavoriteRequest {
    pub is_favorite: bool,
}

//=========================================================================================
// Conversation & OCR
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ConversationTurnRequest {
    pub text: String,
    pub speaker_side: Side,
    /// The other participant's language.
    pub target_language: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DayGroupResponse {
    pub date: NaiveDate,
    pub records: Vec<HistoryItem>,
}

#[derive(Deserialize, ToSchema)]
pub struct OcrRequest {
    pub image_url: String,
    pub target_language: Option<String>,
}

//=========================================================================================
// Phrases
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PhraseQuery {
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PhraseResponse {
    pub id: Uuid,
    pub text: String,
    pub category: String,
    pub language: String,
    pub translation: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Generic phrases are curated and cannot be deleted.
    pub is_generic: bool,
}

impl From<Phrase> for PhraseResponse {
    fn from(phrase: Phrase) -> Self {
        Self {
            id: phrase.id,
            is_generic: phrase.user_id.is_none(),
            text: phrase.text,
            category: phrase.category,
            language: phrase.language,
            translation: phrase.translation,
            created_at: phrase.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PhraseListResponse {
    pub language: String,
    pub user_phrases: Vec<PhraseResponse>,
    pub generic_phrases: Vec<PhraseResponse>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddPhraseRequest {
    pub text: String,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddPhraseResponse {
    /// The detected language of the new phrase. Absent when nothing was saved.
    pub language: Option<String>,
}

//=========================================================================================
// Speech
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SpeakRequest {
    pub text: String,
    pub language: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LanguageResponse {
    pub code: String,
    pub label: String,
    pub locale: String,
}

impl From<&Language> for LanguageResponse {
    fn from(language: &Language) -> Self {
        Self {
            code: language.code.to_string(),
            label: language.label.to_string(),
            locale: language.locale.to_string(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct VoiceStartRequest {
    pub target_language: Option<String>,
    /// Set when the recording is a conversation turn.
    pub speaker_side: Option<Side>,
}

/// Events forwarded from the device recognizer.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoiceEventRequest {
    Result { transcript: String, is_final: bool },
    End,
    Error { message: String },
}

impl From<VoiceEventRequest> for SpeechEvent {
    fn from(event: VoiceEventRequest) -> Self {
        match event {
            VoiceEventRequest::Result {
                transcript,
                is_final,
            } => SpeechEvent::Result {
                transcript,
                is_final,
            },
            VoiceEventRequest::End => SpeechEvent::End,
            VoiceEventRequest::Error { message } => SpeechEvent::Error(message),
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TranscribeQuery {
    pub target_language: Option<String>,
    /// Spoken language hint for the recognizer.
    pub language: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VoiceStatusResponse {
    /// One of `idle`, `listening`, `completed` or `failed`.
    pub state: String,
    pub transcript: Option<String>,
    pub result: Option<TranslationResponse>,
    pub error: Option<String>,
}
