//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `SessionStore`: login/logout/hydrate lifecycle around an `AuthBackend`
//! - `SessionFile`: the persisted token in the cache directory
//! - `CredentialStore`: remembered passwords via the OS keyring
//!
//! Backend tokens do not expire on their own; a stored token is trusted
//! only after the backend accepts it during `hydrate`.

pub mod credentials;
pub mod error;
pub mod session;

pub use credentials::CredentialStore;
pub use error::AuthError;
pub use session::{AuthBackend, SessionData, SessionFile, SessionStore};
