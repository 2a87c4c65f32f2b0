use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Backend user role.
///
/// Role strings are compared after stripping everything but letters and
/// upper-casing, so `sub_event_admin`, `SubEventAdmin` and `SUBEVENTADMIN`
/// are the same role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UserRole {
    #[default]
    Participant,
    Coordinator,
    SubSubEventManager,
    SubEventManager,
    SubEventAdmin,
    EventManager,
    EventAdmin,
    SuperAdmin,
    /// Older accounts still carry the generic roles
    Manager,
    Admin,
    Unknown,
}

impl UserRole {
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match normalized.as_str() {
            "" | "PARTICIPANT" | "STUDENT" | "USER" => UserRole::Participant,
            "COORDINATOR" => UserRole::Coordinator,
            "SUBSUBEVENTMANAGER" => UserRole::SubSubEventManager,
            "SUBEVENTMANAGER" => UserRole::SubEventManager,
            "SUBEVENTADMIN" => UserRole::SubEventAdmin,
            "EVENTMANAGER" => UserRole::EventManager,
            "EVENTADMIN" => UserRole::EventAdmin,
            "SUPERADMIN" => UserRole::SuperAdmin,
            "MANAGER" => UserRole::Manager,
            "ADMIN" => UserRole::Admin,
            _ => UserRole::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Participant => "PARTICIPANT",
            UserRole::Coordinator => "COORDINATOR",
            UserRole::SubSubEventManager => "SUBSUBEVENTMANAGER",
            UserRole::SubEventManager => "SUBEVENTMANAGER",
            UserRole::SubEventAdmin => "SUBEVENTADMIN",
            UserRole::EventManager => "EVENTMANAGER",
            UserRole::EventAdmin => "EVENTADMIN",
            UserRole::SuperAdmin => "SUPERADMIN",
            UserRole::Manager => "MANAGER",
            UserRole::Admin => "ADMIN",
            UserRole::Unknown => "UNKNOWN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Participant => "Participant",
            UserRole::Coordinator => "Coordinator",
            UserRole::SubSubEventManager => "Competition Manager",
            UserRole::SubEventManager => "Sub-Event Manager",
            UserRole::SubEventAdmin => "Sub-Event Admin",
            UserRole::EventManager => "Event Manager",
            UserRole::EventAdmin => "Event Admin",
            UserRole::SuperAdmin => "Super Admin",
            UserRole::Manager => "Manager",
            UserRole::Admin => "Admin",
            UserRole::Unknown => "Unknown",
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, UserRole::SuperAdmin)
    }

    /// Any organizing role; gates the legacy registration console
    pub fn is_privileged(&self) -> bool {
        !matches!(self, UserRole::Participant | UserRole::Unknown)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(UserRole::parse).unwrap_or_default())
    }
}

/// Account details as returned by `user/login/` and `user/profile/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    #[serde(alias = "fullName", alias = "name", default)]
    pub full_name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(alias = "isSuperadmin", default)]
    pub is_superadmin: bool,
    #[serde(alias = "userType", default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(alias = "rollNo", default, skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<String>,
    #[serde(alias = "currentYear", default, skip_serializing_if = "Option::is_none")]
    pub current_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
}

impl UserProfile {
    pub fn is_super_admin(&self) -> bool {
        self.is_superadmin || self.role.is_super_admin()
    }

    pub fn is_privileged(&self) -> bool {
        self.is_superadmin || self.role.is_privileged()
    }

    /// Name to show in headers, falling back to the email
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

/// The authenticated user for one session
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user: UserProfile,
    pub token: String,
}

impl Identity {
    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn full_name(&self) -> &str {
        &self.user.full_name
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_normalizes() {
        assert_eq!(UserRole::parse("sub_event_admin"), UserRole::SubEventAdmin);
        assert_eq!(UserRole::parse("SubSubEventManager"), UserRole::SubSubEventManager);
        assert_eq!(UserRole::parse("SUPER ADMIN"), UserRole::SuperAdmin);
        assert_eq!(UserRole::parse("event-admin"), UserRole::EventAdmin);
        assert_eq!(UserRole::parse(""), UserRole::Participant);
        assert_eq!(UserRole::parse("janitor"), UserRole::Unknown);
    }

    #[test]
    fn test_role_privileges() {
        assert!(UserRole::SuperAdmin.is_super_admin());
        assert!(!UserRole::EventAdmin.is_super_admin());
        for role in [
            UserRole::Coordinator,
            UserRole::SubSubEventManager,
            UserRole::SubEventManager,
            UserRole::SubEventAdmin,
            UserRole::EventManager,
            UserRole::EventAdmin,
            UserRole::SuperAdmin,
            UserRole::Manager,
            UserRole::Admin,
        ] {
            assert!(role.is_privileged(), "{role:?} should be privileged");
        }
        assert!(!UserRole::Participant.is_privileged());
        assert!(!UserRole::Unknown.is_privileged());
    }

    #[test]
    fn test_profile_deserialize() {
        let json = r#"{
            "id": 7, "email": "jane@amrita.edu", "full_name": "Jane Doe",
            "role": "EventAdmin", "phone": "9876543210", "rollNo": "CB.EN.U4CSE21001",
            "school": null
        }"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, UserRole::EventAdmin);
        assert_eq!(user.roll_no.as_deref(), Some("CB.EN.U4CSE21001"));
        assert_eq!(user.school, None);
        assert!(user.is_privileged());
        assert!(!user.is_super_admin());
    }

    #[test]
    fn test_superadmin_flag_and_null_role() {
        let user: UserProfile =
            serde_json::from_str(r#"{"email": "root@amrita.edu", "role": null, "is_superadmin": true}"#).unwrap();
        assert_eq!(user.role, UserRole::Participant);
        assert!(user.is_super_admin());
        assert_eq!(user.display_name(), "root@amrita.edu");
    }

    #[test]
    fn test_role_serializes_canonical() {
        assert_eq!(serde_json::to_string(&UserRole::SubEventAdmin).unwrap(), "\"SUBEVENTADMIN\"");
    }
}
