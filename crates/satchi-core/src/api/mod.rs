//! REST API client module for the festival backend.
//!
//! This module provides the `ApiClient` for logging in, browsing the
//! published event hierarchy, submitting registrations and driving the
//! evaluation endpoints.
//!
//! The backend uses Django REST framework token authentication; the token
//! comes from `user/login/` and is sent as `Authorization: Token <key>`.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse};
pub use error::ApiError;
