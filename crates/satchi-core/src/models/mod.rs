//! Data models for festival entities.
//!
//! - `EventNode`, `EventLevel`, `RoleAssignments`: the three-level event hierarchy
//! - `UserProfile`, `UserRole`, `Identity`: accounts and sessions
//! - `RegistrationSubmission`, `MyRegistration`: team registrations
//! - `EvaluationMark`, `Judge`, `Team`: evaluation data

pub mod evaluation;
pub mod event;
pub mod identity;
pub mod registration;

pub use evaluation::{parse_mark, EvaluationMark, Judge, Team, TeamId};
pub use event::{
    find_path, normalize_email, EventId, EventLevel, EventNode, RoleAssignments, RoleKind, TeamBounds,
    MAX_TEAM_SIZE,
};
pub use identity::{Identity, UserProfile, UserRole};
pub use registration::{EventRef, MyRegistration, RegistrationRole, RegistrationSubmission, SubmissionReceipt};
