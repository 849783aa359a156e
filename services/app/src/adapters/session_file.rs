//! services/app/src/adapters/session_file.rs
//!
//! Keeps the signed-in user's profile in a JSON file so the session survives restarts.
//! It implements the `SessionStorage` port from the `core` crate.

use std::path::PathBuf;

use async_trait::async_trait;
use rttc_core::domain::User;
use rttc_core::ports::{PortError, PortResult, SessionStorage};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// The on-disk shape of the cached profile.
#[derive(Debug, Serialize, Deserialize)]
struct StoredProfile {
    id: Uuid,
    email: String,
    username: String,
    #[serde(default)]
    preferred_language: Option<String>,
}

impl From<&User> for StoredProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            preferred_language: user.preferred_language.clone(),
        }
    }
}

impl From<StoredProfile> for User {
    fn from(profile: StoredProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            username: profile.username,
            preferred_language: profile.preferred_language,
        }
    }
}

/// A `SessionStorage` backed by a single JSON file.
#[derive(Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self) -> PortResult<Option<User>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        };

        // A corrupt cache behaves like an empty one; the user simply signs in again.
        match serde_json::from_slice::<StoredProfile>(&raw) {
            Ok(profile) => Ok(Some(profile.into())),
            Err(e) => {
                warn!("Ignoring unreadable session file {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    async fn save(&self, user: &User) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PortError::Unexpected(e.to_string()))?;
            }
        }
        let body = serde_json::to_vec_pretty(&StoredProfile::from(user))
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn clear(&self) -> PortResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }
}
