//! crates/rttc_core/src/phrases.rs
//!
//! The Phrase Store Adapter: curated generic phrases plus the user's own phrase book.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::domain::{NewPhrase, PhraseList};
use crate::error::StoreError;
use crate::ports::{LanguageDetectionService, PhraseRepository, SessionContext};

/// Category given to phrases added without one.
pub const DEFAULT_CATEGORY: &str = "Personal";

struct PhraseView {
    language: Option<String>,
    phrases: PhraseList,
    last_error: Option<String>,
}

pub struct PhraseStore {
    session: Arc<dyn SessionContext>,
    repository: Arc<dyn PhraseRepository>,
    detector: Arc<dyn LanguageDetectionService>,
    view: RwLock<PhraseView>,
}

impl PhraseStore {
    pub fn new(
        session: Arc<dyn SessionContext>,
        repository: Arc<dyn PhraseRepository>,
        detector: Arc<dyn LanguageDetectionService>,
    ) -> Self {
        Self {
            session,
            repository,
            detector,
            view: RwLock::new(PhraseView {
                language: None,
                phrases: PhraseList::default(),
                last_error: None,
            }),
        }
    }

    /// Generic phrases in `language`, and the user's own phrases in `language` newest
    /// first. Guests only see generic phrases.
    pub async fn list(&self, language: &str) -> Result<PhraseList, StoreError> {
        let generic_phrases = self
            .repository
            .list_generic(language)
            .await
            .map_err(|e| self.fail("listing generic", e.into()))?;

        let mut user_phrases = match self.session.current_user() {
            Some(user) => self
                .repository
                .list_for_user(user.id, language)
                .await
                .map_err(|e| self.fail("listing user", e.into()))?,
            None => Vec::new(),
        };
        user_phrases.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let phrases = PhraseList {
            user_phrases,
            generic_phrases,
        };
        let mut view = self.view.write();
        view.language = Some(language.to_string());
        view.phrases = phrases.clone();
        view.last_error = None;
        Ok(phrases)
    }

    /// Adds a phrase to the user's book, tagged with its detected language.
    ///
    /// Returns the detected language so the caller can switch its filter to it, or
    /// `None` when nobody is signed in (nothing is stored then).
    pub async fn add(
        &self,
        text: &str,
        category: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::Validation("Text is required".to_string()));
        }
        let Some(user) = self.session.current_user() else {
            debug!("No signed-in user, not storing phrase");
            return Ok(None);
        };

        let detection = self
            .detector
            .detect(text)
            .await
            .map_err(|e| self.fail("detecting", StoreError::Detection(e.to_string())))?;
        let language = detection.language;

        let category = category
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();
        self.repository
            .insert(NewPhrase {
                user_id: user.id,
                text: text.to_string(),
                category,
                language: language.clone(),
            })
            .await
            .map_err(|e| self.fail("adding", e.into()))?;
        info!("Added phrase in '{}'", language);

        self.list(&language).await?;
        Ok(Some(language))
    }

    /// Deletes one of the user's phrases. Generic phrases cannot be deleted.
    pub async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        let is_generic = self
            .repository
            .is_generic(id)
            .await
            .map_err(|e| self.fail("looking up", e.into()))?;
        if is_generic {
            return Err(StoreError::Validation(
                "Generic phrases cannot be deleted".to_string(),
            ));
        }
        let Some(user) = self.session.current_user() else {
            return Ok(());
        };

        self.repository
            .delete(user.id, id)
            .await
            .map_err(|e| self.fail("deleting", e.into()))?;

        let language = self.view.read().language.clone();
        match language {
            Some(language) => self.list(&language).await.map(|_| ()),
            None => Ok(()),
        }
    }

    /// The phrases as of the last successful listing.
    pub fn phrases(&self) -> PhraseList {
        self.view.read().phrases.clone()
    }

    /// The language of the last successful listing.
    pub fn language(&self) -> Option<String> {
        self.view.read().language.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.view.read().last_error.clone()
    }

    fn fail(&self, action: &str, e: StoreError) -> StoreError {
        error!("Error {} phrases: {}", action, e);
        self.view.write().last_error = Some(e.to_string());
        e
    }
}
