//! Admin console for the three-level event hierarchy.
//!
//! - `tree`: index-based storage with create/delete/open-close/roles
//! - `permissions`: pure derivation of what an identity may do to a node
//! - `console`: the tree plus the acting identity and expansion state
//!
//! The console is a local mock; changes are not sent to the backend.

pub mod console;
pub mod permissions;
pub mod tree;

pub use console::{AdminConsole, AdminError, AdminRow};
pub use permissions::{
    administered_main_events, administered_sub_events, creatable_event_types, derive_permissions, permissions_for,
    AdminIdentity, PermissionSet, SubAdminScope,
};
pub use tree::{EventDraft, EventRecord, EventTree, TreeError};
