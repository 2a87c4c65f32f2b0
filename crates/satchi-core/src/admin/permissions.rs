//! Permission derivation for the admin console.
//!
//! Permissions are a pure function of who is asking, the node and its
//! ancestors (root first). Admin roles are read from main and sub-event
//! nodes; manager and coordinator roles count anywhere on the path.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{normalize_email, EventId, EventLevel, UserProfile};

use super::tree::{EventRecord, EventTree};

/// The caller, as far as permissions are concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub email: String,
    pub is_super_admin: bool,
}

impl AdminIdentity {
    pub fn new(email: &str, is_super_admin: bool) -> Self {
        Self {
            email: normalize_email(email),
            is_super_admin,
        }
    }

    pub fn from_profile(user: &UserProfile) -> Self {
        Self::new(&user.email, user.is_super_admin())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSet {
    pub can_edit: bool,
    pub can_create: bool,
    pub can_delete: bool,
    pub can_manage_roles: bool,
    pub can_manage_admin_role: bool,
}

impl PermissionSet {
    pub const ALL: PermissionSet = PermissionSet {
        can_edit: true,
        can_create: true,
        can_delete: true,
        can_manage_roles: true,
        can_manage_admin_role: true,
    };

    pub const NONE: PermissionSet = PermissionSet {
        can_edit: false,
        can_create: false,
        can_delete: false,
        can_manage_roles: false,
        can_manage_admin_role: false,
    };

    pub fn any(&self) -> bool {
        *self != Self::NONE
    }
}

/// Derive what `identity` may do to `node`, given its ancestors root first.
pub fn derive_permissions(identity: &AdminIdentity, node: &EventRecord, ancestors: &[&EventRecord]) -> PermissionSet {
    if identity.is_super_admin {
        return PermissionSet::ALL;
    }
    let email = identity.email.as_str();

    let main = ancestors.first().copied().unwrap_or(node);
    let is_main_admin = main.level == EventLevel::Main && main.roles.is_admin(email);

    let sub = ancestors
        .iter()
        .copied()
        .chain(std::iter::once(node))
        .find(|n| n.level == EventLevel::Sub);
    let is_sub_admin = sub.is_some_and(|s| s.roles.is_admin(email));

    let is_manager_or_coordinator = node.roles.is_manager_or_coordinator(email)
        || ancestors.iter().any(|a| a.roles.is_manager_or_coordinator(email));

    // Administered nodes strictly above this one
    let administers_ancestor = ancestors
        .iter()
        .any(|a| a.level != EventLevel::SubSub && a.roles.is_admin(email));
    let administers_self = node.level != EventLevel::SubSub && node.roles.is_admin(email);

    PermissionSet {
        can_edit: is_manager_or_coordinator || is_main_admin || is_sub_admin,
        can_create: node.level != EventLevel::SubSub && (administers_self || administers_ancestor),
        can_delete: administers_ancestor,
        can_manage_roles: is_main_admin || is_sub_admin,
        can_manage_admin_role: is_main_admin || (is_sub_admin && node.level == EventLevel::SubSub),
    }
}

/// Convenience wrapper that looks the node and its ancestors up in `tree`
pub fn permissions_for(identity: &AdminIdentity, tree: &EventTree, id: EventId) -> PermissionSet {
    match tree.get(id) {
        Some(node) => derive_permissions(identity, node, &tree.ancestors(id)),
        None => PermissionSet::NONE,
    }
}

/// A sub-event the identity administers, with its main event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubAdminScope {
    pub sub_event_id: EventId,
    pub parent_main_id: EventId,
}

pub fn administered_main_events(identity: &AdminIdentity, tree: &EventTree) -> Vec<EventId> {
    tree.roots()
        .iter()
        .filter_map(|id| tree.get(*id))
        .filter(|r| r.roles.is_admin(&identity.email))
        .map(|r| r.id)
        .collect()
}

pub fn administered_sub_events(identity: &AdminIdentity, tree: &EventTree) -> Vec<SubAdminScope> {
    let mut scopes: Vec<SubAdminScope> = tree
        .records()
        .filter(|r| r.level == EventLevel::Sub && r.roles.is_admin(&identity.email))
        .filter_map(|r| {
            Some(SubAdminScope {
                sub_event_id: r.id,
                parent_main_id: r.parent?,
            })
        })
        .collect();
    scopes.sort();
    scopes
}

/// Event levels the identity may create somewhere in the tree
pub fn creatable_event_types(identity: &AdminIdentity, tree: &EventTree) -> BTreeSet<EventLevel> {
    let mut levels = BTreeSet::new();
    if identity.is_super_admin {
        levels.extend(EventLevel::ALL);
        return levels;
    }
    if !administered_main_events(identity, tree).is_empty() {
        levels.insert(EventLevel::Sub);
        levels.insert(EventLevel::SubSub);
    }
    if !administered_sub_events(identity, tree).is_empty() {
        levels.insert(EventLevel::SubSub);
    }
    levels
}
