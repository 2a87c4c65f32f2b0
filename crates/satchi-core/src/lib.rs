//! Core library for the satchi tech-fest client.
//!
//! Everything the front end needs apart from drawing lives here:
//!
//! - `api`: HTTP client for the festival backend
//! - `auth`: session/identity store with token persistence
//! - `models`: wire and domain types (event tree, identity, registrations)
//! - `catalog`: expandable event browser with registration entry points
//! - `registration`: team registration form with size bounds
//! - `admin`: in-memory event tree, role assignments and permission derivation
//! - `evaluation`: drill-down evaluation console
//! - `legacy`: backdated registration console
//! - `signup`, `profile`: account creation and the profile page

pub mod admin;
pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod evaluation;
pub mod fixtures;
pub mod legacy;
pub mod models;
pub mod profile;
pub mod registration;
pub mod signup;
pub mod utils;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthBackend, AuthError, SessionStore};
pub use config::{AuthScheme, Config};
pub use validation::{SubmitError, ValidationError};
