//! Team registration form for a single competition.
//!
//! The captain is the logged-in user; additional members are entered by
//! email. Team size counts the captain, so the member list is kept within
//! `[min - 1, max - 1]` slots. Validation runs before any request.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::catalog::RegistrationTarget;
use crate::models::{normalize_email, RegistrationSubmission, SubmissionReceipt, UserProfile, MAX_TEAM_SIZE};
use crate::utils::digits_only;
use crate::validation::{SubmitError, ValidationError};

pub const SUBMITTING: &str = "Submitting...";
pub const SUBMITTED: &str = "Project submitted successfully!";

#[async_trait]
pub trait RegistrationBackend: Send + Sync {
    async fn submit_project(&self, submission: &RegistrationSubmission) -> Result<SubmissionReceipt, ApiError>;
}

#[async_trait]
impl RegistrationBackend for ApiClient {
    async fn submit_project(&self, submission: &RegistrationSubmission) -> Result<SubmissionReceipt, ApiError> {
        ApiClient::submit_project(self, submission).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Succeeded(String),
    Failed(String),
}

impl SubmissionStatus {
    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionStatus::Idle => None,
            SubmissionStatus::Submitting => Some(SUBMITTING),
            SubmissionStatus::Succeeded(m) | SubmissionStatus::Failed(m) => Some(m),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationForm {
    target: RegistrationTarget,
    captain_name: String,
    captain_email: String,
    pub captain_phone: String,
    members: Vec<String>,
    pub faculty_mentor_name: String,
    pub project_topic: String,
    pub team_name: String,
    status: SubmissionStatus,
}

impl RegistrationForm {
    pub fn new(target: RegistrationTarget, captain: &UserProfile) -> Self {
        let slots = initial_slots(&target);
        Self {
            captain_name: captain.full_name.trim().to_string(),
            captain_email: captain.email.trim().to_string(),
            captain_phone: captain.phone.clone().unwrap_or_default(),
            members: vec![String::new(); slots],
            faculty_mentor_name: String::new(),
            project_topic: String::new(),
            team_name: String::new(),
            status: SubmissionStatus::Idle,
            target,
        }
    }

    pub fn target(&self) -> &RegistrationTarget {
        &self.target
    }

    pub fn captain_name(&self) -> &str {
        &self.captain_name
    }

    pub fn captain_email(&self) -> &str {
        &self.captain_email
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn member_mut(&mut self, index: usize) -> Option<&mut String> {
        self.members.get_mut(index)
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    /// Captain plus member slots
    pub fn team_size(&self) -> u32 {
        1 + self.members.len() as u32
    }

    pub fn can_add_member(&self) -> bool {
        self.team_size() < self.target.bounds.max
    }

    pub fn can_remove_member(&self) -> bool {
        self.team_size() > self.target.bounds.min
    }

    /// Add an empty member slot; no-op at the upper bound
    pub fn add_member(&mut self) -> bool {
        if !self.can_add_member() {
            return false;
        }
        self.members.push(String::new());
        true
    }

    /// Remove a member slot; no-op at the lower bound
    pub fn remove_member(&mut self, index: usize) -> bool {
        if !self.can_remove_member() || index >= self.members.len() {
            return false;
        }
        self.members.remove(index);
        true
    }

    /// Check the form and build the normalized payload
    pub fn validate(&self) -> Result<RegistrationSubmission, ValidationError> {
        if self.captain_name.is_empty() {
            return Err(ValidationError::Required("Captain name"));
        }
        if self.captain_email.is_empty() {
            return Err(ValidationError::Required("Captain email"));
        }
        let phone = self.captain_phone.trim();
        if phone.is_empty() {
            return Err(ValidationError::Required("Captain phone"));
        }
        if digits_only(phone).len() < 10 {
            return Err(ValidationError::invalid("Captain phone", "must have at least 10 digits"));
        }
        if self.project_topic.trim().is_empty() {
            return Err(ValidationError::Required("Project topic"));
        }
        if self.target.faculty_mentor_required && self.faculty_mentor_name.trim().is_empty() {
            return Err(ValidationError::Required("Faculty mentor name"));
        }

        let team_members: Vec<String> = self
            .members
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();

        let size = 1 + team_members.len() as u32;
        if !self.target.bounds.contains(size) {
            return Err(ValidationError::TeamSize {
                min: self.target.bounds.min,
                max: self.target.bounds.max,
                actual: size,
            });
        }

        let mut seen = vec![normalize_email(&self.captain_email)];
        for email in &team_members {
            if !email.contains('@') {
                return Err(ValidationError::invalid("Team member", format!("'{}' is not an email address", email)));
            }
            let key = normalize_email(email);
            if seen.contains(&key) {
                return Err(ValidationError::DuplicateEmail(email.clone()));
            }
            seen.push(key);
        }

        Ok(RegistrationSubmission {
            event: self.target.event_id,
            captain_name: self.captain_name.clone(),
            captain_email: self.captain_email.clone(),
            captain_phone: phone.to_string(),
            team_members,
            faculty_mentor_name: self.faculty_mentor_name.trim().to_string(),
            project_topic: self.project_topic.trim().to_string(),
            team_name: self.team_name.trim().to_string(),
        })
    }

    /// Validate and submit once. Validation failures never reach the backend.
    pub async fn submit<B: RegistrationBackend + ?Sized>(&mut self, backend: &B) -> Result<SubmissionReceipt, SubmitError> {
        let submission = match self.validate() {
            Ok(s) => s,
            Err(e) => {
                self.status = SubmissionStatus::Failed(e.to_string());
                return Err(e.into());
            }
        };

        self.status = SubmissionStatus::Submitting;
        match backend.submit_project(&submission).await {
            Ok(receipt) => {
                info!(event = submission.event, project = ?receipt.id, "Project submitted");
                self.status = SubmissionStatus::Succeeded(SUBMITTED.to_string());
                self.reset_fields();
                Ok(receipt)
            }
            Err(e) => {
                warn!(event = submission.event, error = %e, "Project submission failed");
                self.status = SubmissionStatus::Failed(e.user_message());
                Err(e.into())
            }
        }
    }

    fn reset_fields(&mut self) {
        self.members = vec![String::new(); initial_slots(&self.target)];
        self.faculty_mentor_name.clear();
        self.project_topic.clear();
        self.team_name.clear();
    }
}

/// Empty member rows for a fresh form, never more than a full team
fn initial_slots(target: &RegistrationTarget) -> usize {
    target.bounds.min.clamp(1, MAX_TEAM_SIZE) as usize - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamBounds;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    struct MockBackend {
        fail_with: Option<&'static str>,
        received: Mutex<Vec<RegistrationSubmission>>,
    }

    impl MockBackend {
        fn ok() -> Self {
            Self { fail_with: None, received: Mutex::new(Vec::new()) }
        }

        fn failing(body: &'static str) -> Self {
            Self { fail_with: Some(body), received: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> usize {
            self.received.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RegistrationBackend for MockBackend {
        async fn submit_project(&self, submission: &RegistrationSubmission) -> Result<SubmissionReceipt, ApiError> {
            self.received.lock().unwrap().push(submission.clone());
            match self.fail_with {
                Some(body) => Err(ApiError::from_status(StatusCode::BAD_REQUEST, body)),
                None => Ok(SubmissionReceipt { id: Some(42), message: None }),
            }
        }
    }

    fn target(min: u32, max: u32, mentor: bool) -> RegistrationTarget {
        RegistrationTarget {
            event_id: 1001,
            event_code: Some("ANK-HACK".to_string()),
            name: "Hackathon".to_string(),
            context: "Anokha / Anokha 2025".to_string(),
            bounds: TeamBounds { min, max },
            faculty_mentor_required: mentor,
            min_female_members: 0,
            rules: String::new(),
        }
    }

    fn captain() -> UserProfile {
        UserProfile {
            email: "jane@amrita.edu".to_string(),
            full_name: "Jane Doe".to_string(),
            phone: Some("9876543210".to_string()),
            ..UserProfile::default()
        }
    }

    fn filled_form(min: u32, max: u32) -> RegistrationForm {
        let mut form = RegistrationForm::new(target(min, max, false), &captain());
        for (i, slot) in form.members.iter_mut().enumerate() {
            *slot = format!("member{}@amrita.edu", i);
        }
        form.project_topic = "Drones".to_string();
        form
    }

    // ===== Member slots =====

    #[test]
    fn test_starts_with_min_minus_one_slots() {
        let form = RegistrationForm::new(target(3, 5, false), &captain());
        assert_eq!(form.members().len(), 2);
        assert_eq!(form.team_size(), 3);
        assert_eq!(form.captain_phone, "9876543210");
    }

    #[test]
    fn test_add_member_is_noop_at_max() {
        let mut form = RegistrationForm::new(target(1, 2, false), &captain());
        assert!(form.add_member());
        assert!(!form.add_member());
        assert_eq!(form.team_size(), 2);
    }

    #[test]
    fn test_remove_member_is_noop_at_min() {
        let mut form = RegistrationForm::new(target(2, 4, false), &captain());
        assert!(!form.remove_member(0));
        assert!(form.add_member());
        assert!(form.remove_member(1));
        assert!(!form.remove_member(0));
        assert_eq!(form.members().len(), 1);
    }

    #[test]
    fn test_member_slots_walk_between_bounds() {
        let mut form = RegistrationForm::new(target(2, 4, false), &captain());
        assert_eq!(form.team_size(), 2);
        assert!(form.add_member());
        assert!(form.add_member());
        assert_eq!(form.team_size(), 4);
        assert!(!form.add_member(), "full team");
        assert_eq!(form.members().len(), 3);

        assert!(form.remove_member(2));
        assert!(form.remove_member(0));
        assert_eq!(form.team_size(), 2);
        assert!(!form.remove_member(0), "minimum team");
        assert_eq!(form.members().len(), 1);
    }

    #[test]
    fn test_oversized_minimum_caps_slots() {
        let form = RegistrationForm::new(target(4_000_000_000, 4_000_000_000, false), &captain());
        assert_eq!(form.members().len(), MAX_TEAM_SIZE as usize - 1);
    }

    // ===== Validation =====

    #[test]
    fn test_valid_form_builds_normalized_payload() {
        let mut form = filled_form(2, 4);
        form.add_member();
        form.members[0] = "  ravi@amrita.edu ".to_string();
        form.team_name = "  Rocket ".to_string();
        let submission = form.validate().unwrap();
        assert_eq!(submission.team_members, vec!["ravi@amrita.edu"], "blank rows dropped");
        assert_eq!(submission.team_name, "Rocket");
        assert_eq!(submission.event, 1001);
    }

    #[test]
    fn test_team_size_out_of_bounds() {
        let mut form = filled_form(3, 4);
        form.members[1].clear();
        assert_eq!(
            form.validate(),
            Err(ValidationError::TeamSize { min: 3, max: 4, actual: 2 })
        );
    }

    #[test]
    fn test_duplicate_emails_rejected() {
        let mut form = filled_form(3, 3);
        form.members[1] = "MEMBER0@amrita.edu".to_string();
        assert!(matches!(form.validate(), Err(ValidationError::DuplicateEmail(_))));

        let mut form = filled_form(2, 2);
        form.members[0] = "jane@amrita.edu".to_string();
        assert!(matches!(form.validate(), Err(ValidationError::DuplicateEmail(_))), "captain counts too");
    }

    #[test]
    fn test_required_fields() {
        let mut form = filled_form(1, 1);
        form.project_topic = "  ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::Required("Project topic")));

        let mut form = filled_form(1, 1);
        form.captain_phone.clear();
        assert_eq!(form.validate(), Err(ValidationError::Required("Captain phone")));
    }

    #[test]
    fn test_mentor_required_by_event() {
        let mut form = RegistrationForm::new(target(1, 1, true), &captain());
        form.project_topic = "Drones".to_string();
        assert_eq!(form.validate(), Err(ValidationError::Required("Faculty mentor name")));
        form.faculty_mentor_name = "Dr. Rao".to_string();
        assert!(form.validate().is_ok());
    }

    // ===== Submission =====

    #[tokio::test]
    async fn test_invalid_form_never_reaches_backend() {
        let backend = MockBackend::ok();
        let mut form = filled_form(3, 4);
        form.members.iter_mut().for_each(String::clear);

        let result = form.submit(&backend).await;
        assert!(matches!(result, Err(SubmitError::Validation(ValidationError::TeamSize { .. }))));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_submit_resets_fields() {
        let backend = MockBackend::ok();
        let mut form = filled_form(2, 4);
        let receipt = form.submit(&backend).await.unwrap();
        assert_eq!(receipt.id, Some(42));
        assert_eq!(form.status(), &SubmissionStatus::Succeeded(SUBMITTED.to_string()));
        assert!(form.project_topic.is_empty());
        assert_eq!(form.members(), &[String::new()]);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_surfaces_backend_payload() {
        let backend = MockBackend::failing(r#"{"error": "Faculty mentor is required for this event."}"#);
        let mut form = filled_form(2, 4);
        assert!(form.submit(&backend).await.is_err());
        assert_eq!(
            form.status().message(),
            Some(r#"{"error": "Faculty mentor is required for this event."}"#)
        );
        assert_eq!(form.project_topic, "Drones", "fields kept for retry");
    }
}
