use serde::{Deserialize, Serialize};

use super::event::EventId;

/// Body of `POST api/submit-project/`, built fresh for each submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationSubmission {
    pub event: EventId,
    pub captain_name: String,
    pub captain_email: String,
    pub captain_phone: String,
    pub team_members: Vec<String>,
    pub faculty_mentor_name: String,
    pub project_topic: String,
    pub team_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(alias = "project_id", alias = "projectId", default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationRole {
    Captain,
    #[serde(rename = "Team Member", alias = "TeamMember", alias = "Member")]
    TeamMember,
}

impl std::fmt::Display for RegistrationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationRole::Captain => write!(f, "Captain"),
            RegistrationRole::TeamMember => write!(f, "Team Member"),
        }
    }
}

/// Lightweight reference to an event level inside a registration
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRef {
    #[serde(default)]
    pub id: Option<EventId>,
    #[serde(rename = "eventId", default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One row of `GET api/my-registrations/`
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRegistration {
    pub project_id: i64,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub project_topic: Option<String>,
    pub role: RegistrationRole,
    #[serde(default)]
    pub registered_at: Option<String>,
    #[serde(default)]
    pub event: EventRef,
    #[serde(default)]
    pub sub_event: Option<EventRef>,
    #[serde(default)]
    pub main_event: Option<EventRef>,
}

impl MyRegistration {
    /// "Main / Sub / Competition" trail for list rows
    pub fn event_trail(&self) -> String {
        [self.main_event.as_ref(), self.sub_event.as_ref(), Some(&self.event)]
            .into_iter()
            .flatten()
            .filter_map(|r| r.name.as_deref())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MyRegistrationsResponse {
    #[serde(default)]
    pub registrations: Vec<MyRegistration>,
}
