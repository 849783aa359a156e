//! crates/rttc_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

//=========================================================================================
// Identity
//=========================================================================================

/// Represents a user profile - used throughout the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub preferred_language: Option<String>,
}

// Only used internally for sign-in - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// The fields collected by the registration form.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub preferred_language: String,
}

/// The three mutually exclusive session states of the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Guest,
    Authenticated(User),
}

impl SessionState {
    /// The signed-in user, if any. Guests have none.
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, SessionState::Guest)
    }
}

//=========================================================================================
// Translation
//=========================================================================================

/// The outcome of a detection call. The confidence is informational only.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub language: String,
    pub confidence: Option<f64>,
}

/// The normalized output of one detect + translate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub original_text: String,
    pub translated_text: String,
    pub detected_language: String,
    pub target_lang: String,
}

//=========================================================================================
// History
//=========================================================================================

/// Common view over every kind of persisted history record.
pub trait HistoryEntry: Clone + Send + Sync + 'static {
    /// What the caller hands to the store to create a record of this kind.
    type Payload: Send + Sync + 'static;

    fn id(&self) -> Uuid;
    fn is_favorite(&self) -> bool;
    fn created_at(&self) -> DateTime<Utc>;
}

/// A single voice or text translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry for TranslationRecord {
    type Payload = TranslationResult;

    fn id(&self) -> Uuid {
        self.id
    }
    fn is_favorite(&self) -> bool {
        self.is_favorite
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Which of the two conversation participants produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeakerSide {
    A,
    B,
}

impl SpeakerSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeakerSide::A => "A",
            SpeakerSide::B => "B",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "A" | "a" => Some(SpeakerSide::A),
            "B" | "b" => Some(SpeakerSide::B),
            _ => None,
        }
    }
}

/// A translated turn of a two-party conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BilingualRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub speaker_side: SpeakerSide,
}

/// Payload for saving one conversation turn.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub result: TranslationResult,
    pub speaker_side: SpeakerSide,
}

impl HistoryEntry for BilingualRecord {
    type Payload = ConversationTurn;

    fn id(&self) -> Uuid {
        self.id
    }
    fn is_favorite(&self) -> bool {
        self.is_favorite
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Text read from a picture and its translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub extracted_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for saving one OCR capture.
#[derive(Debug, Clone)]
pub struct OcrCapture {
    pub image_url: String,
    pub result: TranslationResult,
}

impl HistoryEntry for OcrRecord {
    type Payload = OcrCapture;

    fn id(&self) -> Uuid {
        self.id
    }
    fn is_favorite(&self) -> bool {
        self.is_favorite
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Records of a single calendar day, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup<E> {
    pub date: NaiveDate,
    pub records: Vec<E>,
}

//=========================================================================================
// Phrases
//=========================================================================================

/// A phrase-book entry. Generic phrases have no owner and are read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub id: Uuid,
    pub text: String,
    pub category: String,
    pub language: String,
    pub user_id: Option<Uuid>,
    pub translation: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user phrase ready to be inserted. The language always comes from detection.
#[derive(Debug, Clone)]
pub struct NewPhrase {
    pub user_id: Uuid,
    pub text: String,
    pub category: String,
    pub language: String,
}

/// The two phrase populations shown for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseList {
    pub user_phrases: Vec<Phrase>,
    pub generic_phrases: Vec<Phrase>,
}
