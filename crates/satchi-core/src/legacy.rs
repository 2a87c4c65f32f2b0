//! Legacy registration console.
//!
//! Lets organizers record a registration after the fact, optionally with
//! judges' marks, against the evaluation endpoints. The competition is
//! picked through a cascading main -> sub -> competition selection; any
//! change higher up clears everything below it.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{parse_mark, EvaluationMark, EventId, EventNode, Judge, UserProfile};
use crate::validation::{SubmitError, ValidationError};

pub const SUBMITTING: &str = "Submitting legacy registration...";
const GENERIC_FAILURE: &str = "Submission failed. Please review inputs and retry.";

/// Accepted layouts for the optional submission time (local time)
const SUBMITTED_AT_FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[async_trait]
pub trait LegacyBackend: Send + Sync {
    async fn fetch_main_events(&self) -> Result<Vec<EventNode>, ApiError>;
    async fn fetch_sub_events(&self, main_event_id: EventId) -> Result<Vec<EventNode>, ApiError>;
    async fn fetch_competitions(&self, sub_event_id: EventId) -> Result<Vec<EventNode>, ApiError>;
    async fn fetch_judges(&self, competition_id: EventId) -> Result<Vec<Judge>, ApiError>;
    async fn submit_legacy_registration(&self, payload: &LegacyPayload) -> Result<LegacyReceipt, ApiError>;
}

#[async_trait]
impl LegacyBackend for ApiClient {
    async fn fetch_main_events(&self) -> Result<Vec<EventNode>, ApiError> {
        ApiClient::fetch_main_events(self).await
    }

    async fn fetch_sub_events(&self, main_event_id: EventId) -> Result<Vec<EventNode>, ApiError> {
        ApiClient::fetch_sub_events(self, main_event_id).await
    }

    async fn fetch_competitions(&self, sub_event_id: EventId) -> Result<Vec<EventNode>, ApiError> {
        ApiClient::fetch_competitions(self, sub_event_id).await
    }

    async fn fetch_judges(&self, competition_id: EventId) -> Result<Vec<Judge>, ApiError> {
        ApiClient::fetch_judges(self, competition_id).await
    }

    async fn submit_legacy_registration(&self, payload: &LegacyPayload) -> Result<LegacyReceipt, ApiError> {
        ApiClient::submit_legacy_registration(self, payload).await
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyMemberPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyProjectPayload {
    pub team_name: String,
    pub project_topic: String,
    pub captain_name: String,
    pub captain_email: String,
    pub captain_phone: String,
    pub faculty_mentor_name: String,
    pub team_members: Vec<LegacyMemberPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyEvaluationPayload {
    pub is_disqualified: bool,
    pub remarks: String,
    pub marks: Vec<EvaluationMark>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyPayload {
    pub subsubevent_id: EventId,
    pub project: LegacyProjectPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<LegacyEvaluationPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyProjectRef {
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyReceipt {
    #[serde(default)]
    pub project: Option<LegacyProjectRef>,
}

impl LegacyReceipt {
    pub fn project_id(&self) -> Option<i64> {
        self.project.as_ref().and_then(|p| p.id)
    }

    pub fn message(&self) -> String {
        match self.project_id() {
            Some(id) => format!("Legacy registration recorded (Project #{}).", id),
            None => "Legacy registration recorded successfully.".to_string(),
        }
    }
}

// ============================================================================
// Form state
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyProject {
    pub team_name: String,
    pub project_topic: String,
    pub captain_name: String,
    pub captain_email: String,
    pub captain_phone: String,
    pub faculty_mentor_name: String,
    /// Local date-time, e.g. `2024-02-14T10:30`
    pub submitted_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyMember {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl LegacyMember {
    fn sanitized(&self) -> Option<LegacyMemberPayload> {
        let member = LegacyMemberPayload {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        };
        let blank = member.name.is_empty() && member.email.is_empty() && member.phone.is_empty();
        (!blank).then_some(member)
    }
}

/// A judge's mark as typed into the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkRow {
    pub judge_name: String,
    pub mark: String,
    pub comments: String,
    pub judge_ref_id: Option<i64>,
}

impl MarkRow {
    fn for_judge(judge: &Judge) -> Self {
        Self {
            judge_name: judge.name.clone(),
            judge_ref_id: Some(judge.id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyStatus {
    pub kind: StatusKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LegacyConsole {
    main_events: Vec<EventNode>,
    sub_events: Vec<EventNode>,
    competitions: Vec<EventNode>,
    judges: Vec<Judge>,
    selected_main: Option<EventId>,
    selected_sub: Option<EventId>,
    selected_competition: Option<EventId>,
    pub project: LegacyProject,
    pub members: Vec<LegacyMember>,
    evaluation_enabled: bool,
    pub marks: Vec<MarkRow>,
    status: Option<LegacyStatus>,
}

impl Default for LegacyConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacyConsole {
    pub fn new() -> Self {
        Self {
            main_events: Vec::new(),
            sub_events: Vec::new(),
            competitions: Vec::new(),
            judges: Vec::new(),
            selected_main: None,
            selected_sub: None,
            selected_competition: None,
            project: LegacyProject::default(),
            members: vec![LegacyMember::default()],
            evaluation_enabled: true,
            marks: vec![MarkRow::default()],
            status: None,
        }
    }

    /// Only organizers may use the console
    pub fn is_allowed(user: Option<&UserProfile>) -> bool {
        user.is_some_and(UserProfile::is_privileged)
    }

    // ===== Accessors =====

    pub fn main_events(&self) -> &[EventNode] {
        &self.main_events
    }

    pub fn sub_events(&self) -> &[EventNode] {
        &self.sub_events
    }

    pub fn competitions(&self) -> &[EventNode] {
        &self.competitions
    }

    pub fn judges(&self) -> &[Judge] {
        &self.judges
    }

    pub fn selected_main(&self) -> Option<EventId> {
        self.selected_main
    }

    pub fn selected_sub(&self) -> Option<EventId> {
        self.selected_sub
    }

    pub fn selected_competition(&self) -> Option<EventId> {
        self.selected_competition
    }

    pub fn evaluation_enabled(&self) -> bool {
        self.evaluation_enabled
    }

    pub fn status(&self) -> Option<&LegacyStatus> {
        self.status.as_ref()
    }

    fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = Some(LegacyStatus {
            kind,
            message: message.into(),
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // ===== Cascading selection =====

    /// Reset marks to match the current judges and evaluation toggle
    fn reset_marks(&mut self) {
        self.marks = if !self.evaluation_enabled {
            Vec::new()
        } else if self.judges.is_empty() {
            vec![MarkRow::default()]
        } else {
            self.judges.iter().map(MarkRow::for_judge).collect()
        };
    }

    fn clear_below_main(&mut self) {
        self.sub_events.clear();
        self.selected_sub = None;
        self.clear_below_sub();
    }

    fn clear_below_sub(&mut self) {
        self.competitions.clear();
        self.selected_competition = None;
        self.judges.clear();
        self.reset_marks();
    }

    pub async fn load_main_events<B: LegacyBackend + ?Sized>(&mut self, backend: &B) {
        match backend.fetch_main_events().await {
            Ok(events) => self.main_events = events,
            Err(e) => {
                warn!(error = %e, "Failed to load main events");
                self.set_status(StatusKind::Error, "Unable to load main events.");
            }
        }
    }

    pub async fn select_main<B: LegacyBackend + ?Sized>(&mut self, backend: &B, id: EventId) {
        self.selected_main = Some(id);
        self.clear_below_main();
        match backend.fetch_sub_events(id).await {
            Ok(events) => self.sub_events = events,
            Err(e) => {
                warn!(error = %e, main_event = id, "Failed to load sub-events");
                self.set_status(StatusKind::Error, "Unable to load sub-events.");
            }
        }
    }

    pub async fn select_sub<B: LegacyBackend + ?Sized>(&mut self, backend: &B, id: EventId) {
        self.selected_sub = Some(id);
        self.clear_below_sub();
        match backend.fetch_competitions(id).await {
            Ok(events) => self.competitions = events,
            Err(e) => {
                warn!(error = %e, sub_event = id, "Failed to load competitions");
                self.set_status(StatusKind::Error, "Unable to load competitions.");
            }
        }
    }

    /// Select a competition and pre-fill one mark row per judge
    pub async fn select_competition<B: LegacyBackend + ?Sized>(&mut self, backend: &B, id: EventId) {
        self.selected_competition = Some(id);
        self.judges.clear();
        match backend.fetch_judges(id).await {
            Ok(judges) => self.judges = judges,
            Err(e) => warn!(error = %e, competition = id, "Failed to load judges"),
        }
        self.reset_marks();
    }

    // ===== Rows =====

    pub fn add_member(&mut self) {
        self.members.push(LegacyMember::default());
    }

    pub fn remove_member(&mut self, index: usize) -> bool {
        if index < self.members.len() {
            self.members.remove(index);
            true
        } else {
            false
        }
    }

    pub fn set_evaluation_enabled(&mut self, enabled: bool) {
        if self.evaluation_enabled != enabled {
            self.evaluation_enabled = enabled;
            self.reset_marks();
        }
    }

    pub fn add_mark_row(&mut self) -> bool {
        if !self.evaluation_enabled {
            return false;
        }
        self.marks.push(MarkRow::default());
        true
    }

    pub fn remove_mark_row(&mut self, index: usize) -> bool {
        if index < self.marks.len() {
            self.marks.remove(index);
            true
        } else {
            false
        }
    }

    // ===== Submission =====

    pub fn build_payload(&self) -> Result<LegacyPayload, ValidationError> {
        let subsubevent_id = self
            .selected_competition
            .ok_or_else(|| ValidationError::invalid("Competition", "Select a competition before submitting."))?;

        let p = &self.project;
        let required = [
            (p.team_name.trim(), "Team name"),
            (p.project_topic.trim(), "Project topic"),
            (p.captain_name.trim(), "Captain name"),
            (p.captain_email.trim(), "Captain email"),
        ];
        if let Some((_, field)) = required.iter().find(|(value, _)| value.is_empty()) {
            return Err(ValidationError::Required(field));
        }

        let submitted_at = match p.submitted_at.trim() {
            "" => None,
            raw => Some(local_to_utc_iso(raw).ok_or_else(|| {
                ValidationError::invalid("Submitted at", format!("'{}' is not a date and time", raw))
            })?),
        };

        let project = LegacyProjectPayload {
            team_name: p.team_name.trim().to_string(),
            project_topic: p.project_topic.trim().to_string(),
            captain_name: p.captain_name.trim().to_string(),
            captain_email: p.captain_email.trim().to_string(),
            captain_phone: p.captain_phone.trim().to_string(),
            faculty_mentor_name: p.faculty_mentor_name.trim().to_string(),
            team_members: self.members.iter().filter_map(LegacyMember::sanitized).collect(),
            submitted_at,
        };

        let evaluation = if self.evaluation_enabled {
            let mut marks = Vec::new();
            for row in self.marks.iter().filter(|r| !r.mark.trim().is_empty()) {
                let mark = EvaluationMark {
                    judge_name: row.judge_name.trim().to_string(),
                    mark: parse_mark(&row.mark)?,
                    comments: row.comments.trim().to_string(),
                    judge_ref_id: row.judge_ref_id,
                };
                mark.validate()?;
                marks.push(mark);
            }
            if marks.is_empty() {
                return Err(ValidationError::invalid(
                    "Evaluation",
                    "Enter at least one judge mark or disable evaluation entry.",
                ));
            }
            Some(LegacyEvaluationPayload {
                is_disqualified: false,
                remarks: String::new(),
                marks,
            })
        } else {
            None
        };

        Ok(LegacyPayload {
            subsubevent_id,
            project,
            evaluation,
        })
    }

    pub async fn submit<B: LegacyBackend + ?Sized>(&mut self, backend: &B) -> Result<LegacyReceipt, SubmitError> {
        self.clear_status();
        let payload = match self.build_payload() {
            Ok(p) => p,
            Err(e) => {
                let message = match &e {
                    ValidationError::Invalid { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                self.set_status(StatusKind::Error, message);
                return Err(e.into());
            }
        };

        self.set_status(StatusKind::Info, SUBMITTING);
        match backend.submit_legacy_registration(&payload).await {
            Ok(receipt) => {
                info!(competition = payload.subsubevent_id, project = ?receipt.project_id(), "Legacy registration recorded");
                self.set_status(StatusKind::Success, receipt.message());
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, "Legacy registration failed");
                let message = e.backend_message().unwrap_or_else(|| GENERIC_FAILURE.to_string());
                self.set_status(StatusKind::Error, message);
                Err(e.into())
            }
        }
    }
}

/// Interpret a local date-time and render it as ISO-8601 UTC with millis
pub fn local_to_utc_iso(raw: &str) -> Option<String> {
    let naive = SUBMITTED_AT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())?;
    let local = Local.from_local_datetime(&naive).earliest()?;
    Some(local.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
}
