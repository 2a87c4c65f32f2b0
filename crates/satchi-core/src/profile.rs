//! Profile page data: account details plus the caller's registrations.

use async_trait::async_trait;
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::models::{MyRegistration, RegistrationRole, UserProfile};
use crate::utils::{format_date, format_phone};

#[async_trait]
pub trait ProfileBackend: Send + Sync {
    async fn fetch_profile(&self) -> Result<UserProfile, ApiError>;
    async fn fetch_my_registrations(&self) -> Result<Vec<MyRegistration>, ApiError>;
}

#[async_trait]
impl ProfileBackend for ApiClient {
    async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        ApiClient::fetch_profile(self).await
    }

    async fn fetch_my_registrations(&self) -> Result<Vec<MyRegistration>, ApiError> {
        ApiClient::fetch_my_registrations(self).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user: UserProfile,
    pub registrations: Vec<MyRegistration>,
}

impl Profile {
    /// Fetch the profile and registrations concurrently
    pub async fn load<B: ProfileBackend + ?Sized>(backend: &B) -> Result<Self, ApiError> {
        let (user, registrations) = futures::try_join!(backend.fetch_profile(), backend.fetch_my_registrations())?;
        debug!(email = %user.email, registrations = registrations.len(), "Loaded profile");
        Ok(Self { user, registrations })
    }

    pub fn greeting(&self) -> String {
        let name = self.user.full_name.trim();
        format!("Welcome, {}!", if name.is_empty() { "User" } else { name })
    }

    /// Label/value rows for the details panel. Absent or blank fields are skipped.
    pub fn details(&self) -> Vec<(&'static str, String)> {
        let u = &self.user;
        let rows: [(&'static str, Option<String>); 10] = [
            ("Full Name", Some(u.full_name.clone())),
            ("Email", Some(u.email.clone())),
            ("Phone", u.phone.as_deref().map(format_phone)),
            ("Role", Some(u.role.label().to_string())),
            ("School", u.school.clone()),
            ("Degree", u.degree.clone()),
            ("Course", u.course.clone()),
            ("Roll Number", u.roll_no.clone()),
            ("Current Year", u.current_year.clone()),
            ("Position", u.position.clone()),
        ];
        rows.into_iter()
            .filter_map(|(label, value)| {
                let value = value?;
                (!value.trim().is_empty()).then_some((label, value))
            })
            .collect()
    }

    pub fn captain_count(&self) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.role == RegistrationRole::Captain)
            .count()
    }
}

/// One line of the registrations table
pub fn registration_summary(reg: &MyRegistration) -> [String; 4] {
    [
        reg.team_name.clone().unwrap_or_else(|| "-".to_string()),
        reg.event_trail(),
        reg.role.to_string(),
        reg.registered_at.as_deref().map(format_date).unwrap_or_default(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventRef, UserRole};
    use reqwest::StatusCode;

    struct Backend {
        fail_registrations: bool,
    }

    #[async_trait]
    impl ProfileBackend for Backend {
        async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
            Ok(UserProfile {
                email: "satchi.user@amrita.edu".into(),
                full_name: "Satchi User".into(),
                phone: Some("9876543210".into()),
                school: Some("School of Computing".into()),
                position: None,
                degree: Some("  ".into()),
                ..UserProfile::default()
            })
        }

        async fn fetch_my_registrations(&self) -> Result<Vec<MyRegistration>, ApiError> {
            if self.fail_registrations {
                return Err(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"));
            }
            Ok(vec![MyRegistration {
                project_id: 9,
                team_name: Some("Byte Busters".into()),
                project_topic: None,
                role: RegistrationRole::Captain,
                registered_at: Some("2025-02-14T10:30:00Z".into()),
                event: EventRef {
                    name: Some("Hackathon".into()),
                    ..EventRef::default()
                },
                sub_event: None,
                main_event: Some(EventRef {
                    name: Some("Anokha".into()),
                    ..EventRef::default()
                }),
            }])
        }
    }

    #[tokio::test]
    async fn test_load_and_details_skip_absent() {
        let profile = Profile::load(&Backend { fail_registrations: false }).await.unwrap();
        let labels: Vec<&str> = profile.details().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["Full Name", "Email", "Phone", "Role", "School"]);
        assert_eq!(profile.details()[2].1, "98765 43210");
        assert_eq!(profile.greeting(), "Welcome, Satchi User!");
        assert_eq!(profile.captain_count(), 1);
    }

    #[tokio::test]
    async fn test_load_fails_if_either_request_fails() {
        let result = Profile::load(&Backend { fail_registrations: true }).await;
        assert!(matches!(result, Err(ApiError::ServerError(_))));
    }

    #[test]
    fn test_registration_summary() {
        let reg = MyRegistration {
            project_id: 1,
            team_name: None,
            project_topic: None,
            role: RegistrationRole::TeamMember,
            registered_at: None,
            event: EventRef::default(),
            sub_event: None,
            main_event: None,
        };
        let row = registration_summary(&reg);
        assert_eq!(row[0], "-");
        assert_eq!(row[2], "Team Member");
        assert_eq!(row[3], "");
    }

    #[test]
    fn test_greeting_fallback() {
        let profile = Profile {
            user: UserProfile {
                role: UserRole::Coordinator,
                ..UserProfile::default()
            },
            registrations: Vec::new(),
        };
        assert_eq!(profile.greeting(), "Welcome, User!");
    }
}
