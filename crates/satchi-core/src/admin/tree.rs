//! Index-based event tree.
//!
//! Nodes live in a flat map keyed by id; each record carries its parent
//! id and an ordered list of child ids. Mutations touch only the records
//! involved and never copy subtrees.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::models::{EventId, EventLevel, EventNode, RoleAssignments, TeamBounds};
use crate::validation::ValidationError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Event {0} not found")]
    NotFound(EventId),

    #[error("Cannot open event {id} while its parent {parent} is closed")]
    ParentClosed { id: EventId, parent: EventId },

    #[error("{level} events cannot have children")]
    NoChildren { level: EventLevel },

    #[error("A {expected} needs a parent of the level above it")]
    LevelMismatch { expected: EventLevel },

    #[error("Duplicate event id {0}")]
    DuplicateId(EventId),

    #[error("Event hierarchy is deeper than three levels")]
    TooDeep,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Fields a new event is created with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub rules: String,
    pub min_members: u32,
    pub max_members: u32,
    pub faculty_mentor_required: bool,
    pub min_female_members: u32,
}

impl EventDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_members: 1,
            max_members: 1,
            ..Self::default()
        }
    }

    /// Main and sub-event drafts only need a name; competitions also
    /// carry team bounds.
    pub fn validate(&self, level: EventLevel) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required("Event name"));
        }
        if level == EventLevel::SubSub {
            TeamBounds::new(self.min_members, self.max_members)?;
            if self.min_female_members > self.max_members {
                return Err(ValidationError::invalid(
                    "Minimum female participants",
                    "cannot exceed maximum team size",
                ));
            }
        }
        Ok(())
    }
}

/// One node in the tree, without its children inline
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: EventId,
    pub code: Option<String>,
    pub name: String,
    pub level: EventLevel,
    pub is_open: bool,
    pub description: String,
    pub rules: String,
    pub min_members: u32,
    pub max_members: u32,
    pub faculty_mentor_required: bool,
    pub min_female_members: u32,
    pub roles: RoleAssignments,
    pub parent: Option<EventId>,
    pub children: Vec<EventId>,
}

impl EventRecord {
    fn from_node(node: &EventNode, level: EventLevel, parent: Option<EventId>) -> Self {
        Self {
            id: node.id,
            code: node.code.clone(),
            name: node.name.clone(),
            level,
            is_open: node.is_open,
            description: node.description.clone(),
            rules: node.rules.clone(),
            min_members: node.min_members,
            max_members: node.max_members,
            faculty_mentor_required: node.faculty_mentor_required,
            min_female_members: node.min_female_members,
            roles: node.roles.clone(),
            parent,
            children: Vec::new(),
        }
    }

    fn to_node(&self) -> EventNode {
        EventNode {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
            is_open: self.is_open,
            description: self.description.clone(),
            rules: self.rules.clone(),
            min_members: self.min_members,
            max_members: self.max_members,
            faculty_mentor_required: self.faculty_mentor_required,
            min_female_members: self.min_female_members,
            roles: self.roles.clone(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventTree {
    nodes: HashMap<EventId, EventRecord>,
    roots: Vec<EventId>,
}

impl EventTree {
    /// Build from a nested hierarchy (at most three levels)
    pub fn from_nodes(nodes: &[EventNode]) -> Result<Self, TreeError> {
        let mut tree = Self::default();
        for node in nodes {
            tree.insert_nested(node, 0, None)?;
        }
        Ok(tree)
    }

    fn insert_nested(&mut self, node: &EventNode, depth: usize, parent: Option<EventId>) -> Result<(), TreeError> {
        let level = EventLevel::from_depth(depth).ok_or(TreeError::TooDeep)?;
        if self.nodes.contains_key(&node.id) {
            return Err(TreeError::DuplicateId(node.id));
        }
        self.nodes.insert(node.id, EventRecord::from_node(node, level, parent));
        match parent {
            Some(p) => self.record_mut(p)?.children.push(node.id),
            None => self.roots.push(node.id),
        }
        for child in &node.children {
            self.insert_nested(child, depth + 1, Some(node.id))?;
        }
        Ok(())
    }

    /// Rebuild the nested form
    pub fn to_nodes(&self) -> Vec<EventNode> {
        self.roots.iter().filter_map(|id| self.nested(*id)).collect()
    }

    fn nested(&self, id: EventId) -> Option<EventNode> {
        let record = self.nodes.get(&id)?;
        let mut node = record.to_node();
        node.children = record.children.iter().filter_map(|c| self.nested(*c)).collect();
        Some(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: EventId) -> Option<&EventRecord> {
        self.nodes.get(&id)
    }

    fn record_mut(&mut self, id: EventId) -> Result<&mut EventRecord, TreeError> {
        self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))
    }

    pub fn roots(&self) -> &[EventId] {
        &self.roots
    }

    pub fn records(&self) -> impl Iterator<Item = &EventRecord> {
        self.nodes.values()
    }

    pub fn children(&self, id: EventId) -> Vec<&EventRecord> {
        self.nodes
            .get(&id)
            .map(|r| r.children.iter().filter_map(|c| self.nodes.get(c)).collect())
            .unwrap_or_default()
    }

    /// Ancestors of `id`, root first, not including the node itself
    pub fn ancestors(&self, id: EventId) -> Vec<&EventRecord> {
        let mut chain = Vec::new();
        let mut current = self.nodes.get(&id).and_then(|r| r.parent);
        while let Some(pid) = current {
            match self.nodes.get(&pid) {
                Some(parent) => {
                    chain.push(parent);
                    current = parent.parent;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Every node below `id`, depth-first
    pub fn descendants(&self, id: EventId) -> Vec<EventId> {
        let mut out = Vec::new();
        let mut stack: Vec<EventId> = self
            .nodes
            .get(&id)
            .map(|r| r.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(record) = self.nodes.get(&next) {
                stack.extend(record.children.iter().rev().copied());
            }
        }
        out
    }

    fn next_id(&self) -> EventId {
        self.nodes.keys().max().map_or(1, |max| max + 1)
    }

    /// Create an event at `level` under `parent` (none for main events).
    ///
    /// New events start open unless their parent is closed.
    pub fn create(&mut self, level: EventLevel, parent: Option<EventId>, draft: EventDraft) -> Result<EventId, TreeError> {
        draft.validate(level)?;

        let parent_open = match (level, parent) {
            (EventLevel::Main, None) => true,
            (EventLevel::Main, Some(_)) | (_, None) => return Err(TreeError::LevelMismatch { expected: level }),
            (_, Some(pid)) => {
                let parent = self.get(pid).ok_or(TreeError::NotFound(pid))?;
                match parent.level.child() {
                    None => return Err(TreeError::NoChildren { level: parent.level }),
                    Some(child) if child != level => return Err(TreeError::LevelMismatch { expected: level }),
                    Some(_) => parent.is_open,
                }
            }
        };

        let id = self.next_id();
        let (min_members, max_members) = if level == EventLevel::SubSub {
            (draft.min_members, draft.max_members)
        } else {
            (1, 1)
        };
        let record = EventRecord {
            id,
            code: None,
            name: draft.name.trim().to_string(),
            level,
            is_open: parent_open,
            description: draft.description.trim().to_string(),
            rules: draft.rules.trim().to_string(),
            min_members,
            max_members,
            faculty_mentor_required: draft.faculty_mentor_required,
            min_female_members: draft.min_female_members,
            roles: RoleAssignments::default(),
            parent,
            children: Vec::new(),
        };
        self.nodes.insert(id, record);
        match parent {
            Some(pid) => self.record_mut(pid)?.children.push(id),
            None => self.roots.push(id),
        }
        debug!(id, ?level, ?parent, "Created event");
        Ok(id)
    }

    /// Remove `id` and its whole subtree; returns the removed ids
    pub fn delete(&mut self, id: EventId) -> Result<Vec<EventId>, TreeError> {
        let parent = self.get(id).ok_or(TreeError::NotFound(id))?.parent;

        let mut removed = vec![id];
        removed.extend(self.descendants(id));
        for rid in &removed {
            self.nodes.remove(rid);
        }
        match parent {
            Some(pid) => {
                if let Some(p) = self.nodes.get_mut(&pid) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        debug!(id, removed = removed.len(), "Deleted event subtree");
        Ok(removed)
    }

    /// Flip `is_open`. Closing cascades to every descendant; reopening
    /// touches only the node and is refused while the parent is closed.
    /// Returns the new state.
    pub fn toggle_open(&mut self, id: EventId) -> Result<bool, TreeError> {
        let record = self.get(id).ok_or(TreeError::NotFound(id))?;
        let opening = !record.is_open;

        if opening {
            if let Some(pid) = record.parent {
                if self.get(pid).is_some_and(|p| !p.is_open) {
                    return Err(TreeError::ParentClosed { id, parent: pid });
                }
            }
            self.record_mut(id)?.is_open = true;
        } else {
            let descendants = self.descendants(id);
            self.record_mut(id)?.is_open = false;
            for did in descendants {
                if let Some(d) = self.nodes.get_mut(&did) {
                    d.is_open = false;
                }
            }
        }
        Ok(opening)
    }

    pub fn replace_roles(&mut self, id: EventId, roles: RoleAssignments) -> Result<(), TreeError> {
        self.record_mut(id)?.roles = roles;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> EventTree {
        EventTree::from_nodes(&[
            EventNode::new(1, "Anokha").with_children(vec![
                EventNode::new(101, "Anokha 2025").with_children(vec![
                    EventNode::new(1001, "Hackathon"),
                    EventNode::new(1002, "Quiz"),
                ]),
                EventNode::new(102, "Anokha 2024").closed(),
            ]),
            EventNode::new(2, "Amritotsavam").closed(),
        ])
        .unwrap()
    }

    // ===== Construction =====

    #[test]
    fn test_from_nodes_assigns_levels_and_links() {
        let tree = tree();
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.roots(), &[1, 2]);
        assert_eq!(tree.get(101).unwrap().level, EventLevel::Sub);
        assert_eq!(tree.get(1002).unwrap().level, EventLevel::SubSub);
        assert_eq!(tree.get(1002).unwrap().parent, Some(101));

        let ancestors: Vec<EventId> = tree.ancestors(1001).iter().map(|r| r.id).collect();
        assert_eq!(ancestors, vec![1, 101]);
        assert_eq!(tree.descendants(1), vec![101, 1001, 1002, 102]);
    }

    #[test]
    fn test_from_nodes_rejects_bad_shapes() {
        let deep = EventNode::new(1, "a").with_children(vec![EventNode::new(2, "b")
            .with_children(vec![EventNode::new(3, "c").with_children(vec![EventNode::new(4, "d")])])]);
        assert_eq!(EventTree::from_nodes(&[deep]).unwrap_err(), TreeError::TooDeep);

        let dup = vec![EventNode::new(1, "a"), EventNode::new(1, "b")];
        assert_eq!(EventTree::from_nodes(&dup).unwrap_err(), TreeError::DuplicateId(1));
    }

    #[test]
    fn test_to_nodes_preserves_order() {
        let tree = tree();
        let nodes = tree.to_nodes();
        assert_eq!(nodes.len(), 2);
        let names: Vec<&str> = nodes[0].children[0].children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Hackathon", "Quiz"]);
    }

    // ===== Create / delete =====

    #[test]
    fn test_create_assigns_max_plus_one() {
        let mut tree = tree();
        let mut draft = EventDraft::named("Robo Race");
        draft.min_members = 2;
        draft.max_members = 3;
        let id = tree.create(EventLevel::SubSub, Some(101), draft).unwrap();
        assert_eq!(id, 1003);
        assert_eq!(tree.children(101).last().map(|r| r.id), Some(1003));
        assert!(tree.get(id).unwrap().is_open);

        let main = tree.create(EventLevel::Main, None, EventDraft::named("Vidyut")).unwrap();
        assert_eq!(main, 1004);
        assert_eq!(tree.roots().last(), Some(&1004));
    }

    #[test]
    fn test_create_under_closed_parent_starts_closed() {
        let mut tree = tree();
        let id = tree.create(EventLevel::SubSub, Some(102), EventDraft::named("Archive")).unwrap();
        assert!(!tree.get(id).unwrap().is_open);
    }

    #[test]
    fn test_create_validates_level_and_draft() {
        let mut tree = tree();
        assert!(matches!(
            tree.create(EventLevel::Sub, Some(101), EventDraft::named("x")),
            Err(TreeError::LevelMismatch { .. })
        ));
        assert!(matches!(
            tree.create(EventLevel::SubSub, Some(1001), EventDraft::named("x")),
            Err(TreeError::NoChildren { .. })
        ));
        assert!(matches!(
            tree.create(EventLevel::Sub, None, EventDraft::named("x")),
            Err(TreeError::LevelMismatch { .. })
        ));
        assert!(matches!(
            tree.create(EventLevel::Sub, Some(1), EventDraft::named("  ")),
            Err(TreeError::Validation(ValidationError::Required(_)))
        ));

        let mut draft = EventDraft::named("Bad bounds");
        draft.min_members = 4;
        draft.max_members = 2;
        assert!(matches!(
            tree.create(EventLevel::SubSub, Some(101), draft),
            Err(TreeError::Validation(ValidationError::InvalidBounds { min: 4, max: 2 }))
        ));
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_delete_removes_subtree() {
        let mut tree = tree();
        let mut removed = tree.delete(101).unwrap();
        removed.sort();
        assert_eq!(removed, vec![101, 1001, 1002]);
        assert!(tree.get(1001).is_none());
        assert_eq!(tree.get(1).unwrap().children, vec![102]);

        tree.delete(2).unwrap();
        assert_eq!(tree.roots(), &[1]);
        assert_eq!(tree.delete(2).unwrap_err(), TreeError::NotFound(2));
    }

    // ===== Open / close =====

    #[test]
    fn test_close_cascades_reopen_does_not() {
        let mut tree = tree();
        assert_eq!(tree.toggle_open(1), Ok(false));
        for id in [1, 101, 1001, 1002, 102] {
            assert!(!tree.get(id).unwrap().is_open, "{id} should be closed");
        }

        assert_eq!(tree.toggle_open(1), Ok(true));
        assert!(tree.get(1).unwrap().is_open);
        for id in [101, 1001, 1002, 102] {
            assert!(!tree.get(id).unwrap().is_open, "{id} stays closed after reopen");
        }
    }

    #[test]
    fn test_open_under_closed_parent_rejected() {
        let mut tree = tree();
        tree.toggle_open(101).unwrap();
        assert_eq!(
            tree.toggle_open(1001),
            Err(TreeError::ParentClosed { id: 1001, parent: 101 })
        );
        assert!(!tree.get(1001).unwrap().is_open);
    }

    #[test]
    fn test_replace_roles() {
        let mut tree = tree();
        let mut roles = RoleAssignments::default();
        roles.admins.push("jane@amrita.edu".to_string());
        tree.replace_roles(101, roles.clone()).unwrap();
        assert_eq!(tree.get(101).unwrap().roles, roles);
        assert_eq!(tree.replace_roles(999, roles), Err(TreeError::NotFound(999)));
    }
}
