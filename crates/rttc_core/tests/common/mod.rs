//! In-memory fakes of every port, shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rttc_core::{
    AccountRepository, BilingualRecord, CredentialVerifier, Detection, HistoryEntry,
    HistoryRepository, LanguageDetectionService, NewPhrase, OcrRecord, OcrService, Phrase,
    PhraseRepository, PortError, PortResult, SessionContext, SessionStorage, TranslationRecord,
    TranslationService, User, UserCredentials,
};
use uuid::Uuid;

pub fn user(email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        username: "Ana Silva".to_string(),
        preferred_language: Some("pt".to_string()),
    }
}

//=========================================================================================
// Session fixtures
//=========================================================================================

/// A session context that always reports the same user (or nobody).
pub struct FixedSession(pub Option<User>);

impl SessionContext for FixedSession {
    fn current_user(&self) -> Option<User> {
        self.0.clone()
    }
}

#[derive(Default)]
pub struct MemorySessionStorage {
    pub stored: Mutex<Option<User>>,
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self) -> PortResult<Option<User>> {
        Ok(self.stored.lock().unwrap().clone())
    }
    async fn save(&self, user: &User) -> PortResult<()> {
        *self.stored.lock().unwrap() = Some(user.clone());
        Ok(())
    }
    async fn clear(&self) -> PortResult<()> {
        *self.stored.lock().unwrap() = None;
        Ok(())
    }
}

/// Stores passwords with a visible prefix instead of hashing them.
pub struct PlainVerifier;

impl CredentialVerifier for PlainVerifier {
    fn hash(&self, password: &str) -> PortResult<String> {
        Ok(format!("plain:{}", password))
    }
    fn verify(&self, password: &str, password_hash: &str) -> bool {
        password_hash == format!("plain:{}", password)
    }
}

#[derive(Default)]
pub struct MemoryAccounts {
    pub accounts: Mutex<Vec<UserCredentials>>,
}

impl MemoryAccounts {
    pub fn with_account(user: User, password: &str) -> Self {
        let accounts = Self::default();
        accounts.accounts.lock().unwrap().push(UserCredentials {
            user,
            password_hash: format!("plain:{}", password),
        });
        accounts
    }
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

//=========================================================================================
// Remote gateways
//=========================================================================================

/// Detects a fixed language, or fails when built with `failing`.
pub struct FakeDetector {
    language: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeDetector {
    pub fn new(language: &str) -> Self {
        Self {
            language: Some(language.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            language: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageDetectionService for FakeDetector {
    async fn detect(&self, _text: &str) -> PortResult<Detection> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.language {
            Some(language) => Ok(Detection {
                language: language.clone(),
                confidence: Some(0.97),
            }),
            None => Err(PortError::Unexpected("detection unavailable".to_string())),
        }
    }
}

/// Answers only the translations it was given.
#[derive(Default)]
pub struct FakeTranslator {
    table: HashMap<(String, String, String), String>,
    pub requests: Mutex<Vec<(String, String, String)>>,
}

impl FakeTranslator {
    pub fn with(entries: &[(&str, &str, &str, &str)]) -> Self {
        let table = entries
            .iter()
            .map(|(source, target, text, translated)| {
                (
                    (source.to_string(), target.to_string(), text.to_string()),
                    translated.to_string(),
                )
            })
            .collect();
        Self {
            table,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationService for FakeTranslator {
    async fn translate(&self, source: &str, target: &str, text: &str) -> PortResult<String> {
        let key = (source.to_string(), target.to_string(), text.to_string());
        self.requests.lock().unwrap().push(key.clone());
        self.table
            .get(&key)
            .cloned()
            .ok_or_else(|| PortError::Malformed("no translation field".to_string()))
    }
}

pub struct FakeOcr(pub PortResult<serde_json::Value>);

#[async_trait]
impl OcrService for FakeOcr {
    async fn extract_text(&self, _image_url: &str) -> PortResult<serde_json::Value> {
        match &self.0 {
            Ok(value) => Ok(value.clone()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }
}

//=========================================================================================
// Backend tables
//=========================================================================================

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
    pub rows: Mutex<Vec<E>>,
    pub fail_writes: AtomicBool,
}

impl<E> Default for MemoryHistory<E> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }
}

impl<E: Clone> MemoryHistory<E> {
    pub fn with_rows(rows: Vec<E>) -> Self {
        Self {
            rows: Mutex::new(rows),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn rows(&self) -> Vec<E> {
        self.rows.lock().unwrap().clone()
    }

    fn check_writes(&self) -> PortResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("Connection timeout".to_string()));
        }
        Ok(())
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
        self.check_writes()?;
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
        self.check_writes()?;
        self.rows
            .lock()
            .unwrap()
            .retain(|r| !(r.owner() == user_id && r.id() == id));
        Ok(())
    }

    async fn set_favorite(&self, user_id: Uuid, id: Uuid, value: bool) -> PortResult<()> {
        self.check_writes()?;
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
    pub generic: Vec<Phrase>,
    pub user: Mutex<Vec<Phrase>>,
}

impl MemoryPhrases {
    pub fn with_generic(generic: Vec<Phrase>) -> Self {
        Self {
            generic,
            user: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PhraseRepository for MemoryPhrases {
    async fn list_generic(&self, language: &str) -> PortResult<Vec<Phrase>> {
        Ok(self
            .generic
            .iter()
            .filter(|p| p.language == language)
            .cloned()
            .collect())
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
        Ok(self.generic.iter().any(|p| p.id == id))
    }
}

pub fn generic_phrase(text: &str, language: &str) -> Phrase {
    Phrase {
        id: Uuid::new_v4(),
        text: text.to_string(),
        category: "Travel".to_string(),
        language: language.to_string(),
        user_id: None,
        translation: None,
        created_at: Utc::now(),
    }
}
