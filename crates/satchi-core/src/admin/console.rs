use std::collections::{BTreeSet, HashSet};

use thiserror::Error;
use tracing::{info, warn};

use crate::models::{EventId, EventLevel, EventNode, RoleAssignments, RoleKind};
use crate::validation::ValidationError;

use super::permissions::{
    administered_sub_events, creatable_event_types, permissions_for, AdminIdentity, PermissionSet, SubAdminScope,
};
use super::tree::{EventDraft, EventRecord, EventTree, TreeError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdminError {
    #[error("You do not have permission to {action} this event")]
    PermissionDenied { action: &'static str, id: EventId },

    #[error("You cannot create {0} events")]
    CannotCreate(EventLevel),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One visible line of the admin tree
#[derive(Debug, Clone, PartialEq)]
pub struct AdminRow {
    pub id: EventId,
    pub name: String,
    pub level: EventLevel,
    pub is_open: bool,
    pub expanded: bool,
    pub has_children: bool,
    pub permissions: PermissionSet,
}

/// The mock admin dashboard: an in-memory tree plus the acting identity.
///
/// Every mutation re-derives the caller's permissions on the target node
/// first. Nothing is persisted to the backend.
#[derive(Debug, Clone)]
pub struct AdminConsole {
    identity: AdminIdentity,
    tree: EventTree,
    expanded: HashSet<EventId>,
    email_domain: String,
}

impl AdminConsole {
    pub fn new(identity: AdminIdentity, tree: EventTree, email_domain: impl Into<String>) -> Self {
        let mut expanded = HashSet::new();
        if let Some(first) = tree.roots().first().copied() {
            expanded.insert(first);
            if let Some(first_sub) = tree.get(first).and_then(|r| r.children.first().copied()) {
                expanded.insert(first_sub);
            }
        }
        Self {
            identity,
            tree,
            expanded,
            email_domain: email_domain.into(),
        }
    }

    /// Seed from a nested hierarchy
    pub fn from_nodes(identity: AdminIdentity, nodes: &[EventNode], email_domain: &str) -> Result<Self, TreeError> {
        Ok(Self::new(identity, EventTree::from_nodes(nodes)?, email_domain))
    }

    pub fn identity(&self) -> &AdminIdentity {
        &self.identity
    }

    /// Switch the acting identity, e.g. after login
    pub fn set_identity(&mut self, identity: AdminIdentity) {
        self.identity = identity;
    }

    pub fn tree(&self) -> &EventTree {
        &self.tree
    }

    pub fn get(&self, id: EventId) -> Option<&EventRecord> {
        self.tree.get(id)
    }

    pub fn permissions(&self, id: EventId) -> PermissionSet {
        permissions_for(&self.identity, &self.tree, id)
    }

    pub fn creatable_event_types(&self) -> BTreeSet<EventLevel> {
        creatable_event_types(&self.identity, &self.tree)
    }

    pub fn administered_sub_events(&self) -> Vec<SubAdminScope> {
        administered_sub_events(&self.identity, &self.tree)
    }

    // ===== Expansion =====

    pub fn is_expanded(&self, id: EventId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn toggle_expand(&mut self, id: EventId) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    pub fn visible_rows(&self) -> Vec<AdminRow> {
        let mut rows = Vec::new();
        for id in self.tree.roots() {
            self.push_rows(*id, &mut rows);
        }
        rows
    }

    fn push_rows(&self, id: EventId, rows: &mut Vec<AdminRow>) {
        let Some(record) = self.tree.get(id) else {
            return;
        };
        let expanded = self.is_expanded(id);
        rows.push(AdminRow {
            id,
            name: record.name.clone(),
            level: record.level,
            is_open: record.is_open,
            expanded,
            has_children: !record.children.is_empty(),
            permissions: self.permissions(id),
        });
        if expanded {
            for child in &record.children {
                self.push_rows(*child, rows);
            }
        }
    }

    // ===== Mutations =====

    fn require(&self, id: EventId, action: &'static str, allowed: impl Fn(&PermissionSet) -> bool) -> Result<(), AdminError> {
        if self.tree.get(id).is_none() {
            return Err(TreeError::NotFound(id).into());
        }
        if allowed(&self.permissions(id)) {
            Ok(())
        } else {
            warn!(id, action, email = %self.identity.email, "Permission denied");
            Err(AdminError::PermissionDenied { action, id })
        }
    }

    /// Create an event. Main events need super-admin; children need
    /// `can_create` on the parent.
    pub fn create_event(&mut self, level: EventLevel, parent: Option<EventId>, draft: EventDraft) -> Result<EventId, AdminError> {
        if !self.creatable_event_types().contains(&level) {
            return Err(AdminError::CannotCreate(level));
        }
        if let Some(pid) = parent {
            self.require(pid, "add events under", |p| p.can_create)?;
        }
        let id = self.tree.create(level, parent, draft)?;
        if let Some(pid) = parent {
            self.expanded.insert(pid);
        }
        info!(id, ?level, ?parent, "Event created");
        Ok(id)
    }

    pub fn delete_event(&mut self, id: EventId) -> Result<Vec<EventId>, AdminError> {
        self.require(id, "delete", |p| p.can_delete)?;
        let removed = self.tree.delete(id)?;
        for rid in &removed {
            self.expanded.remove(rid);
        }
        info!(id, removed = removed.len(), "Event deleted");
        Ok(removed)
    }

    /// Open or close registration; returns the new state
    pub fn toggle_open(&mut self, id: EventId) -> Result<bool, AdminError> {
        self.require(id, "change registration for", |p| p.can_edit)?;
        let open = self.tree.toggle_open(id)?;
        info!(id, open, "Registration toggled");
        Ok(open)
    }

    /// Replace a node's role lists. Changing the admin list additionally
    /// needs `can_manage_admin_role`.
    pub fn replace_roles(&mut self, id: EventId, roles: RoleAssignments) -> Result<(), AdminError> {
        self.require(id, "manage roles for", |p| p.can_manage_roles)?;
        let admins_changed = self.tree.get(id).is_some_and(|r| r.roles.admins != roles.admins);
        if admins_changed {
            self.require(id, "manage admins for", |p| p.can_manage_admin_role)?;
        }
        self.tree.replace_roles(id, roles)?;
        Ok(())
    }

    /// Add one email to a role list; `Ok(false)` if it was already there
    pub fn add_role(&mut self, id: EventId, kind: RoleKind, email: &str) -> Result<bool, AdminError> {
        let mut roles = self.tree.get(id).ok_or(TreeError::NotFound(id))?.roles.clone();
        if !roles.add(kind, email, &self.email_domain)? {
            return Ok(false);
        }
        self.replace_roles(id, roles)?;
        Ok(true)
    }

    pub fn remove_role(&mut self, id: EventId, kind: RoleKind, email: &str) -> Result<bool, AdminError> {
        let mut roles = self.tree.get(id).ok_or(TreeError::NotFound(id))?.roles.clone();
        if !roles.remove(kind, email) {
            return Ok(false);
        }
        self.replace_roles(id, roles)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn console(email: &str, superadmin: bool) -> AdminConsole {
        AdminConsole::from_nodes(AdminIdentity::new(email, superadmin), &fixtures::admin_events(), "amrita.edu").unwrap()
    }

    #[test]
    fn test_initial_expansion() {
        let console = console(fixtures::SUPER_ADMIN_EMAIL, true);
        let first = console.tree().roots()[0];
        let first_sub = console.get(first).unwrap().children[0];
        assert!(console.is_expanded(first));
        assert!(console.is_expanded(first_sub));
        assert_eq!(console.visible_rows().iter().filter(|r| r.expanded).count(), 2);
    }

    #[test]
    fn test_stranger_cannot_mutate() {
        let mut console = console("stranger@amrita.edu", false);
        let target = console.tree().roots()[0];
        assert!(matches!(
            console.toggle_open(target),
            Err(AdminError::PermissionDenied { action: "change registration for", .. })
        ));
        assert!(matches!(
            console.create_event(EventLevel::Main, None, EventDraft::named("x")),
            Err(AdminError::CannotCreate(EventLevel::Main))
        ));
        assert!(console.get(target).unwrap().is_open);
    }

    #[test]
    fn test_super_admin_creates_main_and_deletes() {
        let mut console = console(fixtures::SUPER_ADMIN_EMAIL, true);
        let before = console.tree().len();
        let id = console.create_event(EventLevel::Main, None, EventDraft::named("Vidyut")).unwrap();
        assert_eq!(console.tree().len(), before + 1);
        assert_eq!(console.delete_event(id).unwrap(), vec![id]);
    }

    #[test]
    fn test_sub_admin_creates_only_competitions() {
        let mut console = console(fixtures::SUB_ADMIN_EMAIL, false);
        let scope = console.administered_sub_events()[0];

        assert!(matches!(
            console.create_event(EventLevel::Sub, Some(scope.parent_main_id), EventDraft::named("x")),
            Err(AdminError::CannotCreate(EventLevel::Sub))
        ));

        let mut draft = EventDraft::named("Code Golf");
        draft.min_members = 1;
        draft.max_members = 2;
        let id = console.create_event(EventLevel::SubSub, Some(scope.sub_event_id), draft).unwrap();
        assert!(console.permissions(id).can_delete);
        assert!(console.delete_event(scope.sub_event_id).is_err(), "cannot delete own sub-event");
    }

    #[test]
    fn test_sub_admin_cannot_change_own_admins() {
        let mut console = console(fixtures::SUB_ADMIN_EMAIL, false);
        let sub = console.administered_sub_events()[0].sub_event_id;

        assert_eq!(console.add_role(sub, RoleKind::Manager, "new.mgr@amrita.edu"), Ok(true));
        assert!(matches!(
            console.add_role(sub, RoleKind::Admin, "friend@amrita.edu"),
            Err(AdminError::PermissionDenied { action: "manage admins for", .. })
        ));

        let leaf = console.get(sub).unwrap().children[0];
        assert_eq!(console.add_role(leaf, RoleKind::Admin, "leaf.admin@amrita.edu"), Ok(true));
        assert_eq!(console.add_role(leaf, RoleKind::Admin, "LEAF.ADMIN@amrita.edu"), Ok(false));
        assert_eq!(console.remove_role(leaf, RoleKind::Admin, "leaf.admin@amrita.edu"), Ok(true));
    }

    #[test]
    fn test_role_domain_enforced() {
        let mut console = console(fixtures::SUPER_ADMIN_EMAIL, true);
        let first = console.tree().roots()[0];
        assert!(matches!(
            console.add_role(first, RoleKind::Coordinator, "someone@gmail.com"),
            Err(AdminError::Validation(ValidationError::EmailDomain(_)))
        ));
    }

    #[test]
    fn test_toggle_rejects_open_under_closed_parent() {
        let mut console = console(fixtures::SUPER_ADMIN_EMAIL, true);
        let main = console.tree().roots()[0];
        let sub = console.get(main).unwrap().children[0];

        assert_eq!(console.toggle_open(main), Ok(false));
        assert!(!console.get(sub).unwrap().is_open);
        assert!(matches!(
            console.toggle_open(sub),
            Err(AdminError::Tree(TreeError::ParentClosed { .. }))
        ));
    }
}
