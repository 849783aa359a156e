//! An `AppState` wired to in-memory backends, for driving the handlers directly.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use app_lib::adapters::{Argon2Verifier, FileSessionStorage};
use app_lib::config::Config;
use app_lib::web::state::{AppState, Services};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rttc_core::ports::{
    AccountRepository, CredentialVerifier, HistoryRepository, LanguageDetectionService,
    PhraseRepository, PortError, PortResult, SpeechToTextService, TranslationService,
};
use rttc_core::{
    BilingualRecord, Detection, HistoryEntry, NewPhrase, OcrRecord, Phrase, TranslationRecord,
    User, UserCredentials,
};
use tempfile::TempDir;
use uuid::Uuid;

pub const EMAIL: &str = "ana@example.com";
pub const PASSWORD: &str = "obrigado123";

//=========================================================================================
// Backend fakes
//=========================================================================================

#[derive(Default)]
pub struct MemoryAccounts {
    accounts: Mutex<Vec<UserCredentials>>,
}

#[async_trait]
impl AccountRepository for MemoryAccounts {
    async fn find_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        preferred_language: &str,
    ) -> PortResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            username: username.to_string(),
            preferred_language: Some(preferred_language.to_string()),
        };
        self.accounts.lock().unwrap().push(UserCredentials {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        Ok(user)
    }

    async fn update_preferred_language(&self, user_id: Uuid, language: &str) -> PortResult<User> {
        let mut accounts = self.accounts.lock().unwrap();
        let credentials = accounts
            .iter_mut()
            .find(|c| c.user.id == user_id)
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))?;
        credentials.user.preferred_language = Some(language.to_string());
        Ok(credentials.user.clone())
    }
}

/// Builds a stored record from a payload, as the backend would.
pub trait Materialize: HistoryEntry {
    fn materialize(user_id: Uuid, payload: &Self::Payload, created_at: DateTime<Utc>) -> Self;
    fn owner(&self) -> Uuid;
    fn set_favorite_flag(&mut self, value: bool);
}

impl Materialize for TranslationRecord {
    fn materialize(user_id: Uuid, payload: &Self::Payload, created_at: DateTime<Utc>) -> Self {
        TranslationRecord {
            id: Uuid::new_v4(),
            user_id,
            original_text: payload.original_text.clone(),
            translated_text: payload.translated_text.clone(),
            source_language: payload.detected_language.clone(),
            target_language: payload.target_lang.clone(),
            is_favorite: false,
            created_at,
        }
    }
    fn owner(&self) -> Uuid {
        self.user_id
    }
    fn set_favorite_flag(&mut self, value: bool) {
        self.is_favorite = value;
    }
}

impl Materialize for BilingualRecord {
    fn materialize(user_id: Uuid, payload: &Self::Payload, created_at: DateTime<Utc>) -> Self {
        BilingualRecord {
            id: Uuid::new_v4(),
            user_id,
            original_text: payload.result.original_text.clone(),
            translated_text: payload.result.translated_text.clone(),
            source_lang: payload.result.detected_language.clone(),
            target_lang: payload.result.target_lang.clone(),
            is_favorite: false,
            created_at,
            speaker_side: payload.speaker_side,
        }
    }
    fn owner(&self) -> Uuid {
        self.user_id
    }
    fn set_favorite_flag(&mut self, value: bool) {
        self.is_favorite = value;
    }
}

impl Materialize for OcrRecord {
    fn materialize(user_id: Uuid, payload: &Self::Payload, created_at: DateTime<Utc>) -> Self {
        OcrRecord {
            id: Uuid::new_v4(),
            user_id,
            image_url: payload.image_url.clone(),
            extracted_text: payload.result.original_text.clone(),
            translated_text: payload.result.translated_text.clone(),
            source_language: payload.result.detected_language.clone(),
            target_language: payload.result.target_lang.clone(),
            is_favorite: false,
            created_at,
        }
    }
    fn owner(&self) -> Uuid {
        self.user_id
    }
    fn set_favorite_flag(&mut self, value: bool) {
        self.is_favorite = value;
    }
}

pub struct MemoryHistory<E> {
    rows: Mutex<Vec<E>>,
}

impl<E> Default for MemoryHistory<E> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }
}

impl<E: Clone> MemoryHistory<E> {
    pub fn rows(&self) -> Vec<E> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl<E: Materialize> HistoryRepository<E> for MemoryHistory<E> {
    async fn insert(
        &self,
        user_id: Uuid,
        payload: &E::Payload,
        created_at: DateTime<Utc>,
    ) -> PortResult<E> {
        let record = E::materialize(user_id, payload, created_at);
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_for_user(&self, user_id: Uuid) -> PortResult<Vec<E>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner() == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> PortResult<()> {
        self.rows
            .lock()
            .unwrap()
            .retain(|r| !(r.owner() == user_id && r.id() == id));
        Ok(())
    }

    async fn set_favorite(&self, user_id: Uuid, id: Uuid, value: bool) -> PortResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.owner() == user_id && r.id() == id)
            .ok_or_else(|| PortError::NotFound(id.to_string()))?;
        row.set_favorite_flag(value);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPhrases {
    user: Mutex<Vec<Phrase>>,
}

#[async_trait]
impl PhraseRepository for MemoryPhrases {
    async fn list_generic(&self, language: &str) -> PortResult<Vec<Phrase>> {
        Ok(vec![Phrase {
            id: Uuid::nil(),
            text: "Obrigado".to_string(),
            category: "Greetings".to_string(),
            language: language.to_string(),
            user_id: None,
            translation: Some("Thank you".to_string()),
            created_at: Utc::now(),
        }])
    }

    async fn list_for_user(&self, user_id: Uuid, language: &str) -> PortResult<Vec<Phrase>> {
        Ok(self
            .user
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == Some(user_id) && p.language == language)
            .cloned()
            .collect())
    }

    async fn insert(&self, phrase: NewPhrase) -> PortResult<Phrase> {
        let stored = Phrase {
            id: Uuid::new_v4(),
            text: phrase.text,
            category: phrase.category,
            language: phrase.language,
            user_id: Some(phrase.user_id),
            translation: None,
            created_at: Utc::now(),
        };
        self.user.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> PortResult<()> {
        self.user
            .lock()
            .unwrap()
            .retain(|p| !(p.user_id == Some(user_id) && p.id == id));
        Ok(())
    }

    async fn is_generic(&self, id: Uuid) -> PortResult<bool> {
        Ok(id == Uuid::nil())
    }
}

//=========================================================================================
// Remote gateway fakes
//=========================================================================================

/// Every input is Portuguese.
pub struct PortugueseDetector;

#[async_trait]
impl LanguageDetectionService for PortugueseDetector {
    async fn detect(&self, _text: &str) -> PortResult<Detection> {
        Ok(Detection {
            language: "pt".to_string(),
            confidence: Some(0.99),
        })
    }
}

/// Answers only the translations it was given.
pub struct TableTranslator(HashMap<(String, String), String>);

impl TableTranslator {
    pub fn phrasebook() -> Self {
        let entries = [
            ("Onde fica a praia?", "en", "Where is the beach?"),
            ("Bom dia", "en", "Good morning"),
        ];
        Self(
            entries
                .iter()
                .map(|(text, target, out)| ((text.to_string(), target.to_string()), out.to_string()))
                .collect(),
        )
    }
}

#[async_trait]
impl TranslationService for TableTranslator {
    async fn translate(&self, _source: &str, target: &str, text: &str) -> PortResult<String> {
        self.0
            .get(&(text.to_string(), target.to_string()))
            .cloned()
            .ok_or_else(|| PortError::Malformed("no translation field".to_string()))
    }
}

/// Hears the same sentence in every clip.
pub struct FixedTranscriber(pub &'static str);

#[async_trait]
impl SpeechToTextService for FixedTranscriber {
    async fn transcribe(&self, _audio_data: &[u8], _language: Option<&str>) -> PortResult<String> {
        Ok(self.0.to_string())
    }
}

//=========================================================================================
// Harness
//=========================================================================================

pub struct Harness {
    pub state: Arc<AppState>,
    pub translations: Arc<MemoryHistory<TranslationRecord>>,
    pub conversations: Arc<MemoryHistory<BilingualRecord>>,
    pub session_dir: TempDir,
}

impl Harness {
    pub fn session_file(&self) -> std::path::PathBuf {
        self.session_dir.path().join("session.json")
    }
}

/// A bridge with one registered account (`EMAIL` / `PASSWORD`, Portuguese).
pub fn harness() -> Harness {
    let session_dir = tempfile::tempdir().unwrap();
    let session_path = session_dir.path().join("session.json");
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/rttc_test".to_string()),
        "RAPIDAPI_KEY" => Some("test-key".to_string()),
        "SESSION_PATH" => Some(session_path.to_string_lossy().into_owned()),
        _ => None,
    })
    .unwrap();

    let verifier = Argon2Verifier::new();
    let accounts = MemoryAccounts::default();
    accounts.accounts.lock().unwrap().push(UserCredentials {
        user: User {
            id: Uuid::new_v4(),
            email: EMAIL.to_string(),
            username: "Ana Silva".to_string(),
            preferred_language: Some("pt".to_string()),
        },
        password_hash: verifier.hash(PASSWORD).unwrap(),
    });

    let translations = Arc::new(MemoryHistory::<TranslationRecord>::default());
    let conversations = Arc::new(MemoryHistory::<BilingualRecord>::default());
    let services = Services {
        accounts: Arc::new(accounts),
        translations: translations.clone(),
        conversations: conversations.clone(),
        ocr_history: Arc::new(MemoryHistory::<OcrRecord>::default()),
        phrases: Arc::new(MemoryPhrases::default()),
        session_storage: Arc::new(FileSessionStorage::new(config.session_path.clone())),
        verifier: Arc::new(verifier),
        detector: Arc::new(PortugueseDetector),
        translator: Arc::new(TableTranslator::phrasebook()),
        ocr: None,
        stt: Some(Arc::new(FixedTranscriber("Bom dia"))),
        tts: None,
    };

    Harness {
        state: Arc::new(AppState::new(Arc::new(config), services)),
        translations,
        conversations,
        session_dir,
    }
}
