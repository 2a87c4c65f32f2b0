use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, LoginResponse};
use crate::models::{Identity, UserProfile};
use crate::validation::ValidationError;

use super::AuthError;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

// ============================================================================
// Backend seam
// ============================================================================

/// The calls the session store makes against the backend.
///
/// `ApiClient` is the production implementation; tests substitute a mock.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// Fetch the profile for whichever token is currently attached
    async fn fetch_profile(&self) -> Result<UserProfile, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    /// Attach (or detach) the token on all subsequent requests
    fn set_token(&self, token: Option<String>);
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        ApiClient::login(self, email, password).await
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        ApiClient::fetch_profile(self).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        ApiClient::logout(self).await
    }

    fn set_token(&self, token: Option<String>) {
        ApiClient::set_token(self, token)
    }
}

// ============================================================================
// Persisted session
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn for_identity(identity: &Identity) -> Self {
        Self {
            token: identity.token.clone(),
            email: identity.user.email.clone(),
            full_name: identity.user.full_name.clone(),
            created_at: Utc::now(),
        }
    }
}

/// JSON session file in the cache directory
pub struct SessionFile {
    cache_dir: PathBuf,
}

impl SessionFile {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Load session from disk
    pub fn load(&self) -> Result<Option<SessionData>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData = serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(data))
    }

    /// Save session to disk
    pub fn save(&self, data: &SessionData) -> Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session file {}", path.display()))?;
        Ok(())
    }

    /// Remove the session file if present
    pub fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }
}

// ============================================================================
// Session store
// ============================================================================

/// Holds the current identity and keeps the backend token and the session
/// file in step with it.
pub struct SessionStore<B: AuthBackend> {
    backend: B,
    file: SessionFile,
    identity: Option<Identity>,
}

impl<B: AuthBackend> SessionStore<B> {
    pub fn new(backend: B, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            file: SessionFile::new(cache_dir),
            identity: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.identity.as_ref().map(|i| &i.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Restore a persisted session.
    ///
    /// Returns `true` when the stored token was accepted. Any failure
    /// (unreadable file, rejected token, network error) discards the stored
    /// token and leaves the store anonymous.
    pub async fn hydrate(&mut self) -> bool {
        let stored = match self.file.load() {
            Ok(Some(data)) => data,
            Ok(None) => return false,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session file");
                self.discard();
                return false;
            }
        };

        self.backend.set_token(Some(stored.token.clone()));
        match self.backend.fetch_profile().await {
            Ok(user) => {
                info!(email = %user.email, "Restored session");
                self.identity = Some(Identity {
                    user,
                    token: stored.token,
                });
                true
            }
            Err(e) => {
                warn!(error = %e, "Stored session rejected, continuing anonymously");
                self.discard();
                false
            }
        }
    }

    /// Authenticate and persist the token.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Identity, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::Required("Email").into());
        }
        if password.is_empty() {
            return Err(ValidationError::Required("Password").into());
        }

        let response = self.backend.login(email, password).await.map_err(|e| {
            debug!(error = %e, "Login request failed");
            AuthError::from_login_failure(e)
        })?;

        self.backend.set_token(Some(response.token.clone()));
        let identity = Identity {
            user: response.user,
            token: response.token,
        };
        if let Err(e) = self.file.save(&SessionData::for_identity(&identity)) {
            warn!(error = %e, "Failed to persist session");
        }
        info!(email = %identity.user.email, role = %identity.user.role, "Logged in");

        Ok(self.identity.insert(identity))
    }

    /// Notify the backend (best effort) and always clear local state.
    pub async fn logout(&mut self) {
        if self.identity.is_some() {
            if let Err(e) = self.backend.logout().await {
                warn!(error = %e, "Backend logout failed; clearing local session anyway");
            }
        }
        self.discard();
        info!("Logged out");
    }

    /// Refetch the profile for the current session.
    ///
    /// A 401 means the token was revoked elsewhere; the session is dropped
    /// and `AuthError::InvalidToken` returned.
    pub async fn refresh_profile(&mut self) -> Result<&UserProfile, AuthError> {
        if self.identity.is_none() {
            return Err(AuthError::InvalidToken);
        }
        match self.backend.fetch_profile().await {
            Ok(user) => {
                let identity = self.identity.as_mut().ok_or(AuthError::InvalidToken)?;
                identity.user = user;
                Ok(&identity.user)
            }
            Err(ApiError::Unauthorized(_)) => {
                warn!("Session token rejected while refreshing profile");
                self.discard();
                Err(AuthError::InvalidToken)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn discard(&mut self) {
        self.identity = None;
        self.backend.set_token(None);
        if let Err(e) = self.file.clear() {
            warn!(error = %e, "Failed to remove session file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_file_roundtrip_and_clear() {
        let dir = TempDir::new().unwrap();
        let file = SessionFile::new(dir.path());
        assert!(file.load().unwrap().is_none());

        let data = SessionData {
            token: "abc".to_string(),
            email: "jane@amrita.edu".to_string(),
            full_name: "Jane".to_string(),
            created_at: Utc::now(),
        };
        file.save(&data).unwrap();
        assert!(file.exists());
        assert_eq!(file.load().unwrap().unwrap().token, "abc");

        file.clear().unwrap();
        assert!(!file.exists());
        file.clear().unwrap();
    }

    #[test]
    fn test_session_file_creates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let file = SessionFile::new(dir.path().join("nested").join("satchi"));
        let data = SessionData {
            token: "t".to_string(),
            email: "e@amrita.edu".to_string(),
            full_name: String::new(),
            created_at: Utc::now(),
        };
        file.save(&data).unwrap();
        assert!(file.path().exists());
    }

    #[test]
    fn test_corrupt_session_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = SessionFile::new(dir.path());
        std::fs::write(file.path(), "{not json").unwrap();
        assert!(file.load().is_err());
    }
}
