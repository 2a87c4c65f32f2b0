use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use satchi_core::api::LoginResponse;
use satchi_core::auth::{SessionData, SessionFile};
use satchi_core::models::{UserProfile, UserRole};
use satchi_core::{ApiError, AuthBackend, AuthError, SessionStore};
use tempfile::TempDir;

/// Backend double that accepts one token and records what it was asked
#[derive(Clone, Default)]
struct MockBackend {
    valid_token: Option<String>,
    fail_logout: bool,
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    token: Option<String>,
    calls: Vec<String>,
}

impl MockBackend {
    fn accepting(token: &str) -> Self {
        Self {
            valid_token: Some(token.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn current_token(&self) -> Option<String> {
        self.state.lock().unwrap().token.clone()
    }

    fn record(&self, call: &str) {
        self.state.lock().unwrap().calls.push(call.to_string());
    }
}

fn user(email: &str) -> UserProfile {
    UserProfile {
        email: email.to_string(),
        full_name: "Jane Doe".to_string(),
        role: UserRole::EventAdmin,
        ..UserProfile::default()
    }
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.record("login");
        match &self.valid_token {
            Some(token) if password == "correct-horse" => Ok(LoginResponse {
                token: token.clone(),
                user: user(email),
            }),
            _ => Err(ApiError::from_status(
                StatusCode::BAD_REQUEST,
                r#"{"error": "Invalid credentials"}"#,
            )),
        }
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.record("profile");
        let token = self.current_token();
        if token.is_some() && token == self.valid_token {
            Ok(user("jane@amrita.edu"))
        } else {
            Err(ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail": "Invalid token."}"#))
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record("logout");
        if self.fail_logout {
            Err(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "down"))
        } else {
            Ok(())
        }
    }

    fn set_token(&self, token: Option<String>) {
        self.state.lock().unwrap().token = token;
    }
}

fn store_token(dir: &TempDir, token: &str) {
    SessionFile::new(dir.path())
        .save(&SessionData {
            token: token.to_string(),
            email: "jane@amrita.edu".to_string(),
            full_name: "Jane Doe".to_string(),
            created_at: chrono::Utc::now(),
        })
        .unwrap();
}

#[tokio::test]
async fn test_login_persists_token_and_attaches_it() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::accepting("tok-1");
    let mut store = SessionStore::new(backend.clone(), dir.path());

    let identity = store.login(" jane@amrita.edu ", "correct-horse").await.unwrap();
    assert_eq!(identity.token, "tok-1");
    assert_eq!(identity.email(), "jane@amrita.edu");

    assert_eq!(backend.current_token().as_deref(), Some("tok-1"));
    let saved = SessionFile::new(dir.path()).load().unwrap().unwrap();
    assert_eq!(saved.token, "tok-1");
}

#[tokio::test]
async fn test_rejected_login_stays_anonymous() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::accepting("tok-1");
    let mut store = SessionStore::new(backend.clone(), dir.path());

    let err = store.login("jane@amrita.edu", "wrong").await.unwrap_err();
    assert!(matches!(&err, AuthError::Rejected(m) if m == "Invalid credentials"));
    assert!(!store.is_authenticated());
    assert!(backend.current_token().is_none());
    assert!(!SessionFile::new(dir.path()).exists());
}

#[tokio::test]
async fn test_login_validates_before_calling_backend() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::accepting("tok-1");
    let mut store = SessionStore::new(backend.clone(), dir.path());

    assert!(matches!(store.login("   ", "pw").await, Err(AuthError::Validation(_))));
    assert!(matches!(store.login("jane@amrita.edu", "").await, Err(AuthError::Validation(_))));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_hydrate_restores_valid_token() {
    let dir = TempDir::new().unwrap();
    store_token(&dir, "tok-1");
    let backend = MockBackend::accepting("tok-1");
    let mut store = SessionStore::new(backend.clone(), dir.path());

    assert!(store.hydrate().await);
    assert_eq!(store.token(), Some("tok-1"));
    assert_eq!(store.user().map(|u| u.role), Some(UserRole::EventAdmin));
    assert_eq!(backend.calls(), vec!["profile"]);
}

#[tokio::test]
async fn test_hydrate_discards_rejected_token() {
    let dir = TempDir::new().unwrap();
    store_token(&dir, "stale");
    let backend = MockBackend::accepting("tok-1");
    let mut store = SessionStore::new(backend.clone(), dir.path());

    assert!(!store.hydrate().await);
    assert!(!store.is_authenticated());
    assert!(backend.current_token().is_none());
    assert!(!SessionFile::new(dir.path()).exists());
}

#[tokio::test]
async fn test_hydrate_without_session_file_makes_no_calls() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::accepting("tok-1");
    let mut store = SessionStore::new(backend.clone(), dir.path());

    assert!(!store.hydrate().await);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_hydrate_discards_corrupt_session_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(SessionFile::new(dir.path()).path(), "garbage").unwrap();
    let backend = MockBackend::accepting("tok-1");
    let mut store = SessionStore::new(backend.clone(), dir.path());

    assert!(!store.hydrate().await);
    assert!(!SessionFile::new(dir.path()).exists());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_logout_clears_state_even_when_backend_fails() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend {
        fail_logout: true,
        ..MockBackend::accepting("tok-1")
    };
    let mut store = SessionStore::new(backend.clone(), dir.path());
    store.login("jane@amrita.edu", "correct-horse").await.unwrap();

    store.logout().await;

    assert!(!store.is_authenticated());
    assert!(backend.current_token().is_none());
    assert!(!SessionFile::new(dir.path()).exists());
    assert_eq!(backend.calls(), vec!["login", "logout"]);
}

#[tokio::test]
async fn test_refresh_profile_drops_revoked_session() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::accepting("tok-1");
    let mut store = SessionStore::new(backend.clone(), dir.path());
    store.login("jane@amrita.edu", "correct-horse").await.unwrap();

    assert!(store.refresh_profile().await.is_ok());

    // Token revoked server-side
    backend.set_token(Some("revoked".to_string()));
    assert!(matches!(store.refresh_profile().await, Err(AuthError::InvalidToken)));
    assert!(!store.is_authenticated());
    assert!(!SessionFile::new(dir.path()).exists());
}
