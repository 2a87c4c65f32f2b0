//! API client for the festival backend.
//!
//! `ApiClient` wraps a shared `reqwest::Client`, a cookie jar and the
//! session token. Clones share all three, so setting the token once (at
//! login or hydrate) authorizes every request made through any clone.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{header, Client, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::{AuthScheme, Config};
use crate::legacy::{LegacyPayload, LegacyReceipt};
use crate::models::registration::MyRegistrationsResponse;
use crate::models::evaluation::JudgesResponse;
use crate::models::{
    EventId, EventNode, Judge, MyRegistration, RegistrationSubmission, SubmissionReceipt, UserProfile,
};
use crate::signup::SignupPayload;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cookie set by Django's CSRF middleware
const CSRF_COOKIE: &str = "csrftoken";

/// Header Django expects the CSRF token echoed in
const CSRF_HEADER: &str = "x-csrftoken";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    user: UserProfile,
}

/// API client for the festival backend.
/// Clone is cheap - the reqwest client, cookie jar and token slot are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    scheme: AuthScheme,
    token: Arc<RwLock<Option<String>>>,
    jar: Arc<Jar>,
}

impl ApiClient {
    /// Create a new API client for `base_url`
    pub fn new(base_url: &str, scheme: AuthScheme) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            scheme,
            token: Arc::new(RwLock::new(None)),
            jar,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.auth_scheme)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set or clear the session token for every clone of this client
    pub fn set_token(&self, token: Option<String>) {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn has_token(&self) -> bool {
        self.token.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The `csrftoken` cookie value, if the backend has set one
    pub fn csrf_token(&self) -> Option<String> {
        let url = Url::parse(&self.base_url).ok()?;
        let cookies = self.jar.cookies(&url)?;
        let cookies = cookies.to_str().ok()?;
        cookies.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == CSRF_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.token() {
            let value = header::HeaderValue::from_str(&format!("{} {}", self.scheme.prefix(), token))
                .map_err(|e| ApiError::InvalidRequest(format!("Invalid token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn post_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = self.auth_headers()?;
        if let Some(csrf) = self.csrf_token() {
            if let Ok(value) = header::HeaderValue::from_str(&csrf) {
                headers.insert(CSRF_HEADER, value);
            }
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self.client.get(&url).headers(self.auth_headers()?).send().await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, &url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let response = self
            .client
            .post(&url)
            .headers(self.post_headers()?)
            .json(body)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, &url).await
    }

    /// POST with an empty JSON object, for list endpoints that only accept POST
    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.post(path, &serde_json::json!({})).await
    }

    // ===== Account =====

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.post("user/login/", &LoginRequest { email, password }).await
    }

    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        let response: ProfileResponse = self.get("user/profile/").await?;
        Ok(response.user)
    }

    /// Tell the backend to drop the token. The response body is ignored.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.url("user/logout/");
        debug!(url = %url, "POST");
        let response = self.client.post(&url).headers(self.post_headers()?).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    pub async fn signup(&self, payload: &SignupPayload) -> Result<Value, ApiError> {
        self.post("user/signup/", payload).await
    }

    // ===== Events =====

    pub async fn fetch_events(&self) -> Result<Vec<EventNode>, ApiError> {
        self.get("events/getEvents/").await
    }

    pub async fn fetch_event_details(&self, id: EventId) -> Result<EventNode, ApiError> {
        self.get(&format!("events/details/{}/", id)).await
    }

    // ===== Registrations =====

    pub async fn submit_project(&self, submission: &RegistrationSubmission) -> Result<SubmissionReceipt, ApiError> {
        self.post("api/submit-project/", submission).await
    }

    pub async fn fetch_my_registrations(&self) -> Result<Vec<MyRegistration>, ApiError> {
        let response: MyRegistrationsResponse = self.get("api/my-registrations/").await?;
        Ok(response.registrations)
    }

    // ===== Evaluation =====

    pub async fn fetch_main_events(&self) -> Result<Vec<EventNode>, ApiError> {
        self.post_empty("eval/get_main_events/").await
    }

    pub async fn fetch_sub_events(&self, main_event_id: EventId) -> Result<Vec<EventNode>, ApiError> {
        self.post_empty(&format!("eval/get_subevents/{}/", main_event_id)).await
    }

    pub async fn fetch_competitions(&self, sub_event_id: EventId) -> Result<Vec<EventNode>, ApiError> {
        self.post_empty(&format!("eval/get_subsubevents/{}/", sub_event_id)).await
    }

    pub async fn fetch_judges(&self, competition_id: EventId) -> Result<Vec<Judge>, ApiError> {
        let response: JudgesResponse = self
            .get(&format!("eval/subsubevents/{}/judges/", competition_id))
            .await?;
        Ok(response.judges)
    }

    pub async fn submit_legacy_registration(&self, payload: &LegacyPayload) -> Result<LegacyReceipt, ApiError> {
        self.post("eval/legacy/registrations/", payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://127.0.0.1:8000/api/", AuthScheme::Token).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let api = client();
        assert_eq!(api.base_url(), "http://127.0.0.1:8000/api");
        assert_eq!(api.url("/user/login/"), "http://127.0.0.1:8000/api/user/login/");
        assert_eq!(api.url("events/getEvents/"), "http://127.0.0.1:8000/api/events/getEvents/");
    }

    #[test]
    fn test_token_shared_between_clones() {
        let api = client();
        let clone = api.clone();
        assert!(!clone.has_token());

        api.set_token(Some("abc".to_string()));
        assert_eq!(clone.token().as_deref(), Some("abc"));

        clone.set_token(None);
        assert!(!api.has_token());
    }

    #[test]
    fn test_auth_header_uses_scheme() {
        let api = client();
        assert!(api.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());

        api.set_token(Some("abc".to_string()));
        let headers = api.auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Token abc");

        let bearer = ApiClient::new("http://localhost/api", AuthScheme::Bearer).unwrap();
        bearer.set_token(Some("jwt".to_string()));
        assert_eq!(bearer.auth_headers().unwrap().get(header::AUTHORIZATION).unwrap(), "Bearer jwt");
    }

    #[test]
    fn test_csrf_token_from_jar() {
        let api = client();
        assert_eq!(api.csrf_token(), None);
        assert!(api.post_headers().unwrap().get(CSRF_HEADER).is_none());

        let url = Url::parse("http://127.0.0.1:8000/api/user/login/").unwrap();
        api.jar.add_cookie_str("csrftoken=xyz789; Path=/", &url);
        api.jar.add_cookie_str("sessionid=s1; Path=/", &url);

        assert_eq!(api.csrf_token().as_deref(), Some("xyz789"));
        assert_eq!(api.post_headers().unwrap().get(CSRF_HEADER).unwrap(), "xyz789");
    }

    #[test]
    fn test_login_response_parse() {
        let json = r#"{"token": "t0k", "user": {"email": "a@amrita.edu", "full_name": "A", "role": "PARTICIPANT"}}"#;
        let parsed: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.token, "t0k");
        assert_eq!(parsed.user.email, "a@amrita.edu");
    }
}
