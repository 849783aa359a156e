//! crates/rttc_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Detection, HistoryEntry, NewPhrase, Phrase, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    Conflict(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Remote Gateways
//=========================================================================================

#[async_trait]
pub trait LanguageDetectionService: Send + Sync {
    /// Infers the language of `text`.
    async fn detect(&self, text: &str) -> PortResult<Detection>;
}

#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translates `text` from `source` (a code or `auto`) into `target`.
    async fn translate(&self, source: &str, target: &str, text: &str) -> PortResult<String>;
}

#[async_trait]
pub trait OcrService: Send + Sync {
    /// Reads the text in an image. The reply is either a bare string or a structured
    /// object; see `normalize::coerce_to_text`.
    async fn extract_text(&self, image_url: &str) -> PortResult<serde_json::Value>;
}

#[async_trait]
pub trait SpeechToTextService: Send + Sync {
    /// Transcribes a slice of PCM16 audio into text.
    async fn transcribe(&self, audio_data: &[u8], language: Option<&str>) -> PortResult<String>;
}

#[async_trait]
pub trait TextToSpeechService: Send + Sync {
    /// Generates audio data for `text` spoken in `locale`.
    async fn synthesize(&self, text: &str, locale: &str) -> PortResult<Vec<u8>>;
}

//=========================================================================================
// Backend Data Store
//=========================================================================================

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        preferred_language: &str,
    ) -> PortResult<User>;

    async fn update_preferred_language(&self, user_id: Uuid, language: &str) -> PortResult<User>;
}

/// Storage for one kind of history record, always scoped to a user.
#[async_trait]
pub trait HistoryRepository<E: HistoryEntry>: Send + Sync {
    async fn insert(
        &self,
        user_id: Uuid,
        payload: &E::Payload,
        created_at: DateTime<Utc>,
    ) -> PortResult<E>;

    async fn list_for_user(&self, user_id: Uuid) -> PortResult<Vec<E>>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> PortResult<()>;

    async fn set_favorite(&self, user_id: Uuid, id: Uuid, value: bool) -> PortResult<()>;
}

#[async_trait]
pub trait PhraseRepository: Send + Sync {
    async fn list_generic(&self, language: &str) -> PortResult<Vec<Phrase>>;

    async fn list_for_user(&self, user_id: Uuid, language: &str) -> PortResult<Vec<Phrase>>;

    async fn insert(&self, phrase: NewPhrase) -> PortResult<Phrase>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> PortResult<()>;

    /// True when `id` names a curated phrase, in any language.
    async fn is_generic(&self, id: Uuid) -> PortResult<bool>;
}

//=========================================================================================
// Device-local Collaborators
//=========================================================================================

/// Durable local storage holding the cached profile of the signed-in user.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load(&self) -> PortResult<Option<User>>;
    async fn save(&self, user: &User) -> PortResult<()>;
    async fn clear(&self) -> PortResult<()>;
}

/// Hashes and checks account passwords.
pub trait CredentialVerifier: Send + Sync {
    fn hash(&self, password: &str) -> PortResult<String>;
    fn verify(&self, password: &str, password_hash: &str) -> bool;
}

/// Read access to the current session, injected into the stores.
pub trait SessionContext: Send + Sync {
    fn current_user(&self) -> Option<User>;
}
