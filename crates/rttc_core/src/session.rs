//! crates/rttc_core/src/session.rs
//!
//! The Session/Identity Store: who is using the app right now.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{NewAccount, SessionState, User};
use crate::error::AuthError;
use crate::languages::is_language_code;
use crate::ports::{
    AccountRepository, CredentialVerifier, PortError, SessionContext, SessionStorage,
};

/// Holds exactly one of {authenticated user, guest, unauthenticated}.
pub struct SessionStore {
    accounts: Arc<dyn AccountRepository>,
    storage: Arc<dyn SessionStorage>,
    verifier: Arc<dyn CredentialVerifier>,
    default_language: String,
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        storage: Arc<dyn SessionStorage>,
        verifier: Arc<dyn CredentialVerifier>,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            accounts,
            storage,
            verifier,
            default_language: default_language.into(),
            state: RwLock::new(SessionState::Unauthenticated),
        }
    }

    /// Reads the cached profile from local storage. Must complete before any store is
    /// consulted. A missing or unreadable cache leaves the session unauthenticated.
    pub async fn restore_session(&self) -> SessionState {
        match self.storage.load().await {
            Ok(Some(user)) => {
                info!("Restored session for {}", user.email);
                *self.state.write() = SessionState::Authenticated(user);
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to load the cached session: {}", e),
        }
        self.state()
    }

    /// Looks the account up by email, checks the password and caches the profile.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required.".to_string(),
            ));
        }

        let credentials = self.accounts.find_by_email(email).await.map_err(|e| match e {
            PortError::NotFound(_) => AuthError::UserNotFound,
            other => {
                error!("Failed to look up {}: {}", email, other);
                AuthError::Unexpected(other.to_string())
            }
        })?;

        if !self.verifier.verify(password, &credentials.password_hash) {
            return Err(AuthError::WrongPassword);
        }

        let user = credentials.user;
        self.persist_profile(&user).await;
        *self.state.write() = SessionState::Authenticated(user.clone());
        info!("Signed in as {}", user.email);
        Ok(user)
    }

    /// Creates an account and signs straight into it.
    pub async fn register(&self, account: NewAccount) -> Result<User, AuthError> {
        let username = account.username.trim();
        let email = account.email.trim();
        if username.is_empty()
            || email.is_empty()
            || account.password.is_empty()
            || account.preferred_language.is_empty()
        {
            return Err(AuthError::Validation("Please fill in all fields.".to_string()));
        }
        if !is_language_code(&account.preferred_language) {
            return Err(AuthError::Validation(format!(
                "'{}' is not a language code",
                account.preferred_language
            )));
        }

        match self.accounts.find_by_email(email).await {
            Ok(_) => return Err(AuthError::EmailTaken),
            Err(PortError::NotFound(_)) => {}
            Err(e) => return Err(AuthError::Unexpected(e.to_string())),
        }

        let password_hash = self
            .verifier
            .hash(&account.password)
            .map_err(|e| AuthError::Unexpected(e.to_string()))?;
        self.accounts
            .create_user(username, email, &password_hash, &account.preferred_language)
            .await
            .map_err(|e| match e {
                PortError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Unexpected(other.to_string()),
            })?;

        self.sign_in(email, &account.password).await
    }

    /// Enters guest mode. The cached profile of any signed-in user is cleared too, so a
    /// restart does not sign them back in.
    pub async fn sign_in_as_guest(&self) {
        if let Err(e) = self.storage.clear().await {
            error!("Failed to clear the cached session: {}", e);
        }
        *self.state.write() = SessionState::Guest;
    }

    /// Clears both the cached profile and the guest flag.
    pub async fn sign_out(&self) {
        if let Err(e) = self.storage.clear().await {
            error!("Failed to clear the cached session: {}", e);
        }
        *self.state.write() = SessionState::Unauthenticated;
    }

    /// Changes the signed-in user's native language.
    pub async fn set_preferred_language(&self, language: &str) -> Result<User, AuthError> {
        if !is_language_code(language) {
            return Err(AuthError::Validation(format!(
                "'{}' is not a language code",
                language
            )));
        }
        let user_id: Uuid = self
            .current_user()
            .map(|user| user.id)
            .ok_or(AuthError::NotSignedIn)?;

        let user = self
            .accounts
            .update_preferred_language(user_id, language)
            .await
            .map_err(|e| AuthError::Unexpected(e.to_string()))?;
        self.persist_profile(&user).await;
        *self.state.write() = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn is_guest(&self) -> bool {
        self.state.read().is_guest()
    }

    /// The user's preferred language, or the configured default.
    pub fn preferred_language(&self) -> String {
        self.state
            .read()
            .user()
            .and_then(|user| user.preferred_language.clone())
            .filter(|language| !language.is_empty())
            .unwrap_or_else(|| self.default_language.clone())
    }

    async fn persist_profile(&self, user: &User) {
        // The session still works for this run if the cache cannot be written.
        if let Err(e) = self.storage.save(user).await {
            warn!("Failed to cache the session profile: {}", e);
        }
    }
}

impl SessionContext for SessionStore {
    fn current_user(&self) -> Option<User> {
        self.state.read().user().cloned()
    }
}
