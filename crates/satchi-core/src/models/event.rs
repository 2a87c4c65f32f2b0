use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::display_name_from_email;
use crate::validation::{check_email_domain, ValidationError};

pub type EventId = i64;

/// Depth of a node in the three-level hierarchy
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Main,
    Sub,
    SubSub,
}

impl EventLevel {
    pub const ALL: [EventLevel; 3] = [EventLevel::Main, EventLevel::Sub, EventLevel::SubSub];

    pub fn from_depth(depth: usize) -> Option<Self> {
        Self::ALL.get(depth).copied()
    }

    pub fn depth(&self) -> usize {
        match self {
            EventLevel::Main => 0,
            EventLevel::Sub => 1,
            EventLevel::SubSub => 2,
        }
    }

    /// Level of this node's children, `None` for leaves
    pub fn child(&self) -> Option<Self> {
        Self::from_depth(self.depth() + 1)
    }

    pub fn parent(&self) -> Option<Self> {
        self.depth().checked_sub(1).and_then(Self::from_depth)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventLevel::Main => "Main Event",
            EventLevel::Sub => "Sub-Event",
            EventLevel::SubSub => "Competition",
        }
    }
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Role assignments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Admin,
    Manager,
    Coordinator,
}

impl RoleKind {
    pub const ALL: [RoleKind; 3] = [RoleKind::Admin, RoleKind::Manager, RoleKind::Coordinator];

    pub fn label(&self) -> &'static str {
        match self {
            RoleKind::Admin => "Admins",
            RoleKind::Manager => "Managers",
            RoleKind::Coordinator => "Coordinators",
        }
    }
}

/// Per-node role lists. Emails are stored trimmed and lower-cased.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignments {
    #[serde(default, deserialize_with = "de_role_emails")]
    pub admins: Vec<String>,
    #[serde(default, deserialize_with = "de_role_emails")]
    pub managers: Vec<String>,
    #[serde(default, deserialize_with = "de_role_emails")]
    pub coordinators: Vec<String>,
}

/// Role entries arrive either as bare emails or as `{name, email}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum RoleEntry {
    Email(String),
    Person { email: String },
}

fn de_role_emails<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<RoleEntry>>::deserialize(deserializer)?.unwrap_or_default();
    let mut emails: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let email = match entry {
            RoleEntry::Email(e) | RoleEntry::Person { email: e } => normalize_email(&e),
        };
        if !email.is_empty() && !emails.contains(&email) {
            emails.push(email);
        }
    }
    Ok(emails)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl RoleAssignments {
    pub fn list(&self, kind: RoleKind) -> &[String] {
        match kind {
            RoleKind::Admin => &self.admins,
            RoleKind::Manager => &self.managers,
            RoleKind::Coordinator => &self.coordinators,
        }
    }

    fn list_mut(&mut self, kind: RoleKind) -> &mut Vec<String> {
        match kind {
            RoleKind::Admin => &mut self.admins,
            RoleKind::Manager => &mut self.managers,
            RoleKind::Coordinator => &mut self.coordinators,
        }
    }

    pub fn contains(&self, kind: RoleKind, email: &str) -> bool {
        let email = normalize_email(email);
        self.list(kind).iter().any(|e| *e == email)
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.contains(RoleKind::Admin, email)
    }

    pub fn is_manager_or_coordinator(&self, email: &str) -> bool {
        self.contains(RoleKind::Manager, email) || self.contains(RoleKind::Coordinator, email)
    }

    /// Add an email to a role list.
    ///
    /// Returns `Ok(false)` when the email is already present.
    pub fn add(&mut self, kind: RoleKind, email: &str, domain: &str) -> Result<bool, ValidationError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ValidationError::Required("Email"));
        }
        check_email_domain(&email, domain)?;
        if self.contains(kind, &email) {
            return Ok(false);
        }
        self.list_mut(kind).push(email);
        Ok(true)
    }

    pub fn remove(&mut self, kind: RoleKind, email: &str) -> bool {
        let email = normalize_email(email);
        let list = self.list_mut(kind);
        let before = list.len();
        list.retain(|e| *e != email);
        list.len() != before
    }

    /// `(display name, email)` pairs for a role list
    pub fn people(&self, kind: RoleKind) -> Vec<(String, &str)> {
        self.list(kind)
            .iter()
            .map(|e| (display_name_from_email(e), e.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.admins.is_empty() && self.managers.is_empty() && self.coordinators.is_empty()
    }
}

// ============================================================================
// Event tree node
// ============================================================================

/// Largest team size accepted from the catalog
pub const MAX_TEAM_SIZE: u32 = 50;

/// Inclusive bounds on team size, captain included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamBounds {
    pub min: u32,
    pub max: u32,
}

impl TeamBounds {
    pub fn new(min: u32, max: u32) -> Result<Self, ValidationError> {
        if min == 0 {
            return Err(ValidationError::invalid("Minimum team size", "must be at least 1"));
        }
        if min > max {
            return Err(ValidationError::InvalidBounds { min, max });
        }
        if max > MAX_TEAM_SIZE {
            return Err(ValidationError::invalid(
                "Maximum team size",
                format!("must be at most {}", MAX_TEAM_SIZE),
            ));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, size: u32) -> bool {
        (self.min..=self.max).contains(&size)
    }
}

impl Default for TeamBounds {
    fn default() -> Self {
        Self { min: 1, max: 1 }
    }
}

/// A node of the published event hierarchy.
///
/// The backend nests `subEvents` and `subSubEvents` and uses its own field
/// names for team constraints; both spellings are accepted.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNode {
    pub id: EventId,
    #[serde(rename = "eventId", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    #[serde(default = "default_open", deserialize_with = "de_open")]
    pub is_open: bool,
    #[serde(default, deserialize_with = "de_null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub rules: String,
    #[serde(alias = "minTeamSize", default = "default_team_size", deserialize_with = "de_team_size")]
    pub min_members: u32,
    #[serde(alias = "maxTeamSize", default = "default_team_size", deserialize_with = "de_team_size")]
    pub max_members: u32,
    #[serde(alias = "isFacultyMentorRequired", default, deserialize_with = "de_null_default")]
    pub faculty_mentor_required: bool,
    #[serde(alias = "minFemaleParticipants", default, deserialize_with = "de_null_default")]
    pub min_female_members: u32,
    #[serde(default)]
    pub roles: RoleAssignments,
    #[serde(alias = "subEvents", alias = "subSubEvents", default, deserialize_with = "de_null_default")]
    pub children: Vec<EventNode>,
}

fn default_open() -> bool {
    true
}

fn default_team_size() -> u32 {
    1
}

fn de_open<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

fn de_team_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(1))
}

fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl EventNode {
    pub fn new(id: EventId, name: impl Into<String>) -> Self {
        Self {
            id,
            code: None,
            name: name.into(),
            is_open: true,
            description: String::new(),
            rules: String::new(),
            min_members: 1,
            max_members: 1,
            faculty_mentor_required: false,
            min_female_members: 0,
            roles: RoleAssignments::default(),
            children: Vec::new(),
        }
    }

    pub fn closed(mut self) -> Self {
        self.is_open = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_team_size(mut self, min: u32, max: u32) -> Self {
        self.min_members = min;
        self.max_members = max;
        self
    }

    pub fn with_mentor_required(mut self) -> Self {
        self.faculty_mentor_required = true;
        self
    }

    pub fn with_roles(mut self, roles: RoleAssignments) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_children(mut self, children: Vec<EventNode>) -> Self {
        self.children = children;
        self
    }

    /// Team bounds as published, clamped to `1..=MAX_TEAM_SIZE`
    pub fn team_bounds(&self) -> TeamBounds {
        let min = self.min_members.clamp(1, MAX_TEAM_SIZE);
        TeamBounds {
            min,
            max: self.max_members.clamp(min, MAX_TEAM_SIZE),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first search for a node in this subtree
    pub fn find(&self, id: EventId) -> Option<&EventNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

/// Locate `id` in a forest and return the path to it, root first.
pub fn find_path(nodes: &[EventNode], id: EventId) -> Option<Vec<&EventNode>> {
    for node in nodes {
        if node.id == id {
            return Some(vec![node]);
        }
        if let Some(mut path) = find_path(&node.children, id) {
            path.insert(0, node);
            return Some(path);
        }
    }
    None
}
