//! services/app/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of the
//! account, history and phrase ports from the `core` crate. It handles all
//! interactions with the PostgreSQL backend using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rttc_core::domain::{
    BilingualRecord, ConversationTurn, NewPhrase, OcrCapture, OcrRecord, Phrase, SpeakerSide,
    TranslationRecord, TranslationResult, User, UserCredentials,
};
use rttc_core::ports::{
    AccountRepository, HistoryRepository, PhraseRepository, PortError, PortResult,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the backend ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn ensure_affected(rows: u64, what: &str, id: Uuid) -> PortResult<()> {
    if rows == 0 {
        return Err(PortError::NotFound(format!("{} {} not found", what, id)));
    }
    Ok(())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    preferred_language: Option<String>,
}
impl UserRow {
    fn to_user(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            preferred_language: self.preferred_language.clone(),
        }
    }
    fn to_credentials(self) -> UserCredentials {
        UserCredentials {
            user: self.to_user(),
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct TranslationRow {
    id: Uuid,
    user_id: Uuid,
    original_text: String,
    translated_text: String,
    source_language: String,
    target_language: String,
    is_favorite: bool,
    created_at: DateTime<Utc>,
}
impl TranslationRow {
    fn to_domain(self) -> TranslationRecord {
        TranslationRecord {
            id: self.id,
            user_id: self.user_id,
            original_text: self.original_text,
            translated_text: self.translated_text,
            source_language: self.source_language,
            target_language: self.target_language,
            is_favorite: self.is_favorite,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct BilingualRow {
    id: Uuid,
    user_id: Uuid,
    original_text: String,
    translated_text: String,
    source_lang: String,
    target_lang: String,
    is_favorite: bool,
    speaker_side: String,
    created_at: DateTime<Utc>,
}
impl BilingualRow {
    fn to_domain(self) -> PortResult<BilingualRecord> {
        let speaker_side = SpeakerSide::parse(&self.speaker_side).ok_or_else(|| {
            PortError::Malformed(format!("unknown speaker side '{}'", self.speaker_side))
        })?;
        Ok(BilingualRecord {
            id: self.id,
            user_id: self.user_id,
            original_text: self.original_text,
            translated_text: self.translated_text,
            source_lang: self.source_lang,
            target_lang: self.target_lang,
            is_favorite: self.is_favorite,
            created_at: self.created_at,
            speaker_side,
        })
    }
}

#[derive(FromRow)]
struct OcrRow {
    id: Uuid,
    user_id: Uuid,
    image_url: String,
    extracted_text: String,
    translated_text: String,
    source_language: String,
    target_language: String,
    is_favorite: bool,
    created_at: DateTime<Utc>,
}
impl OcrRow {
    fn to_domain(self) -> OcrRecord {
        OcrRecord {
            id: self.id,
            user_id: self.user_id,
            image_url: self.image_url,
            extracted_text: self.extracted_text,
            translated_text: self.translated_text,
            source_language: self.source_language,
            target_language: self.target_language,
            is_favorite: self.is_favorite,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct PhraseRow {
    id: Uuid,
    text: String,
    category: String,
    language: String,
    user_id: Option<Uuid>,
    translation: Option<String>,
    created_at: DateTime<Utc>,
}
impl PhraseRow {
    fn to_domain(self) -> Phrase {
        Phrase {
            id: self.id,
            text: self.text,
            category: self.category,
            language: self.language,
            user_id: self.user_id,
            translation: self.translation,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `AccountRepository` Implementation
//=========================================================================================

const USER_COLUMNS: &str = "id, username, email, password_hash, preferred_language";

#[async_trait]
impl AccountRepository for DbAdapter {
    async fn find_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(row.to_credentials())
    }

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        preferred_language: &str,
    ) -> PortResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, username, email, password_hash, preferred_language) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(preferred_language)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::Conflict(format!("email {}", email))
            }
            other => unexpected(other),
        })?;
        Ok(row.to_user())
    }

    async fn update_preferred_language(&self, user_id: Uuid, language: &str) -> PortResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET preferred_language = $1 WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(language)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", user_id)),
            _ => unexpected(e),
        })?;
        Ok(row.to_user())
    }
}

//=========================================================================================
// `HistoryRepository` Implementations
//=========================================================================================

/// Shared delete/favorite statements; every history table has the same key columns.
impl DbAdapter {
    async fn delete_owned(&self, table: &str, user_id: Uuid, id: Uuid) -> PortResult<()> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2",
            table
        ))
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        ensure_affected(result.rows_affected(), "Record", id)
    }

    async fn set_favorite_owned(
        &self,
        table: &str,
        user_id: Uuid,
        id: Uuid,
        value: bool,
    ) -> PortResult<()> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET is_favorite = $1 WHERE id = $2 AND user_id = $3",
            table
        ))
        .bind(value)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        ensure_affected(result.rows_affected(), "Record", id)
    }
}

#[async_trait]
impl HistoryRepository<TranslationRecord> for DbAdapter {
    async fn insert(
        &self,
        user_id: Uuid,
        payload: &TranslationResult,
        created_at: DateTime<Utc>,
    ) -> PortResult<TranslationRecord> {
        let row = sqlx::query_as::<_, TranslationRow>(
            "INSERT INTO translations \
             (id, user_id, original_text, translated_text, source_language, target_language, is_favorite, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7) \
             RETURNING id, user_id, original_text, translated_text, source_language, target_language, is_favorite, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&payload.original_text)
        .bind(&payload.translated_text)
        .bind(&payload.detected_language)
        .bind(&payload.target_lang)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(row.to_domain())
    }

    async fn list_for_user(&self, user_id: Uuid) -> PortResult<Vec<TranslationRecord>> {
        let rows = sqlx::query_as::<_, TranslationRow>(
            "SELECT id, user_id, original_text, translated_text, source_language, target_language, is_favorite, created_at \
             FROM translations WHERE user_id = $1 ORDER BY is_favorite DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(rows.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_owned("translations", user_id, id).await
    }

    async fn set_favorite(&self, user_id: Uuid, id: Uuid, value: bool) -> PortResult<()> {
        self.set_favorite_owned("translations", user_id, id, value).await
    }
}

#[async_trait]
impl HistoryRepository<BilingualRecord> for DbAdapter {
    async fn insert(
        &self,
        user_id: Uuid,
        payload: &ConversationTurn,
        created_at: DateTime<Utc>,
    ) -> PortResult<BilingualRecord> {
        let row = sqlx::query_as::<_, BilingualRow>(
            "INSERT INTO bilingual_history \
             (id, user_id, original_text, translated_text, source_lang, target_lang, is_favorite, speaker_side, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $8) \
             RETURNING id, user_id, original_text, translated_text, source_lang, target_lang, is_favorite, speaker_side, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&payload.result.original_text)
        .bind(&payload.result.translated_text)
        .bind(&payload.result.detected_language)
        .bind(&payload.result.target_lang)
        .bind(payload.speaker_side.as_str())
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        row.to_domain()
    }

    async fn list_for_user(&self, user_id: Uuid) -> PortResult<Vec<BilingualRecord>> {
        let rows = sqlx::query_as::<_, BilingualRow>(
            "SELECT id, user_id, original_text, translated_text, source_lang, target_lang, is_favorite, speaker_side, created_at \
             FROM bilingual_history WHERE user_id = $1 ORDER BY is_favorite DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        rows.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_owned("bilingual_history", user_id, id).await
    }

    async fn set_favorite(&self, user_id: Uuid, id: Uuid, value: bool) -> PortResult<()> {
        self.set_favorite_owned("bilingual_history", user_id, id, value)
            .await
    }
}

#[async_trait]
impl HistoryRepository<OcrRecord> for DbAdapter {
    async fn insert(
        &self,
        user_id: Uuid,
        payload: &OcrCapture,
        created_at: DateTime<Utc>,
    ) -> PortResult<OcrRecord> {
        let row = sqlx::query_as::<_, OcrRow>(
            "INSERT INTO ocr_history \
             (id, user_id, image_url, extracted_text, translated_text, source_language, target_language, is_favorite, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8) \
             RETURNING id, user_id, image_url, extracted_text, translated_text, source_language, target_language, is_favorite, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&payload.image_url)
        .bind(&payload.result.original_text)
        .bind(&payload.result.translated_text)
        .bind(&payload.result.detected_language)
        .bind(&payload.result.target_lang)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(row.to_domain())
    }

    async fn list_for_user(&self, user_id: Uuid) -> PortResult<Vec<OcrRecord>> {
        let rows = sqlx::query_as::<_, OcrRow>(
            "SELECT id, user_id, image_url, extracted_text, translated_text, source_language, target_language, is_favorite, created_at \
             FROM ocr_history WHERE user_id = $1 ORDER BY is_favorite DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(rows.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_owned("ocr_history", user_id, id).await
    }

    async fn set_favorite(&self, user_id: Uuid, id: Uuid, value: bool) -> PortResult<()> {
        self.set_favorite_owned("ocr_history", user_id, id, value).await
    }
}

//=========================================================================================
// `PhraseRepository` Implementation
//=========================================================================================

#[async_trait]
impl PhraseRepository for DbAdapter {
    async fn list_generic(&self, language: &str) -> PortResult<Vec<Phrase>> {
        let rows = sqlx::query_as::<_, PhraseRow>(
            "SELECT id, text, category, language, NULL::uuid AS user_id, translation, created_at \
             FROM generic_phrases WHERE language = $1 ORDER BY category, text",
        )
        .bind(language)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(rows.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_for_user(&self, user_id: Uuid, language: &str) -> PortResult<Vec<Phrase>> {
        let rows = sqlx::query_as::<_, PhraseRow>(
            "SELECT id, text, category, language, user_id, translation, created_at \
             FROM user_phrases WHERE user_id = $1 AND language = $2 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(language)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(rows.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn insert(&self, phrase: NewPhrase) -> PortResult<Phrase> {
        let row = sqlx::query_as::<_, PhraseRow>(
            "INSERT INTO user_phrases (id, user_id, text, category, language) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, text, category, language, user_id, translation, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(phrase.user_id)
        .bind(&phrase.text)
        .bind(&phrase.category)
        .bind(&phrase.language)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(row.to_domain())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> PortResult<()> {
        self.delete_owned("user_phrases", user_id, id).await
    }

    async fn is_generic(&self, id: Uuid) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM generic_phrases WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }
}
