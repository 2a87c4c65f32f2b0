//! Event catalog: the published hierarchy as an expandable tree.
//!
//! Expansion is local state keyed by node id. Only the first top-level
//! event starts expanded. A competition is registrable only when it and
//! every ancestor on its path are open.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::api::{ApiClient, ApiError};
use crate::models::{find_path, EventId, EventLevel, EventNode, TeamBounds};

/// Everything the registration form needs to know about its event
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationTarget {
    pub event_id: EventId,
    pub event_code: Option<String>,
    pub name: String,
    /// "Main / Sub" path for the form header
    pub context: String,
    pub bounds: TeamBounds,
    pub faculty_mentor_required: bool,
    pub min_female_members: u32,
    pub rules: String,
}

/// One visible line of the flattened tree
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub id: EventId,
    pub name: String,
    pub level: EventLevel,
    pub is_open: bool,
    /// Open along the whole path
    pub registration_open: bool,
    pub expanded: bool,
    pub has_children: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    events: Vec<EventNode>,
    expanded: HashSet<EventId>,
}

impl EventCatalog {
    pub fn new(events: Vec<EventNode>) -> Self {
        let expanded = events.first().map(|e| e.id).into_iter().collect();
        Self { events, expanded }
    }

    /// Fetch the published hierarchy
    pub async fn load(api: &ApiClient) -> Result<Self, ApiError> {
        let events = api.fetch_events().await?;
        info!(count = events.len(), "Loaded event catalog");
        Ok(Self::new(events))
    }

    pub fn events(&self) -> &[EventNode] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn find(&self, id: EventId) -> Option<&EventNode> {
        self.events.iter().find_map(|e| e.find(id))
    }

    pub fn is_expanded(&self, id: EventId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn toggle_expand(&mut self, id: EventId) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    /// Open along the whole path from the root to `id`
    pub fn is_registration_open(&self, id: EventId) -> bool {
        find_path(&self.events, id)
            .map(|path| path.iter().all(|n| n.is_open))
            .unwrap_or(false)
    }

    /// Depth-first listing of the rows currently visible
    pub fn visible_rows(&self) -> Vec<CatalogRow> {
        let mut rows = Vec::new();
        for event in &self.events {
            self.push_rows(event, 0, true, &mut rows);
        }
        rows
    }

    fn push_rows(&self, node: &EventNode, depth: usize, parent_open: bool, rows: &mut Vec<CatalogRow>) {
        let Some(level) = EventLevel::from_depth(depth) else {
            return;
        };
        let registration_open = parent_open && node.is_open;
        let expanded = self.is_expanded(node.id);
        rows.push(CatalogRow {
            id: node.id,
            name: node.name.clone(),
            level,
            is_open: node.is_open,
            registration_open,
            expanded,
            has_children: !node.children.is_empty(),
        });
        if expanded {
            for child in &node.children {
                self.push_rows(child, depth + 1, registration_open, rows);
            }
        }
    }

    /// Registration target for a competition, if it is currently registrable
    pub fn select_leaf(&self, id: EventId) -> Option<RegistrationTarget> {
        let path = find_path(&self.events, id)?;
        let node = *path.last()?;
        if EventLevel::from_depth(path.len() - 1) != Some(EventLevel::SubSub) {
            debug!(id, "Selection is not a competition");
            return None;
        }
        if !path.iter().all(|n| n.is_open) {
            debug!(id, "Registration closed on path");
            return None;
        }

        let context = path[..path.len() - 1]
            .iter()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>()
            .join(" / ");

        Some(RegistrationTarget {
            event_id: node.id,
            event_code: node.code.clone(),
            name: node.name.clone(),
            context,
            bounds: node.team_bounds(),
            faculty_mentor_required: node.faculty_mentor_required,
            min_female_members: node.min_female_members,
            rules: node.rules.clone(),
        })
    }

    /// Swap in a freshly fetched copy of a node, keeping its position.
    /// Returns false when the id is not in the catalog.
    pub fn replace_node(&mut self, fresh: EventNode) -> bool {
        fn replace_in(nodes: &mut [EventNode], fresh: &mut Option<EventNode>) -> bool {
            for node in nodes.iter_mut() {
                if fresh.as_ref().is_some_and(|f| f.id == node.id) {
                    if let Some(mut f) = fresh.take() {
                        // Details responses may omit children
                        if f.children.is_empty() {
                            f.children = std::mem::take(&mut node.children);
                        }
                        *node = f;
                    }
                    return true;
                }
                if replace_in(&mut node.children, fresh) {
                    return true;
                }
            }
            false
        }
        replace_in(&mut self.events, &mut Some(fresh))
    }

    /// Refetch one node from `events/details/:id/`
    pub async fn refresh_node(&mut self, api: &ApiClient, id: EventId) -> Result<bool, ApiError> {
        let node = api.fetch_event_details(id).await?;
        Ok(self.replace_node(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> EventCatalog {
        EventCatalog::new(vec![
            EventNode::new(1, "Anokha").with_children(vec![
                EventNode::new(101, "Anokha 2025").with_children(vec![
                    EventNode::new(1001, "Hackathon").with_team_size(2, 4).with_mentor_required(),
                    EventNode::new(1002, "Quiz").closed(),
                ]),
                EventNode::new(102, "Anokha 2024")
                    .closed()
                    .with_children(vec![EventNode::new(1003, "Robo Race")]),
            ]),
            EventNode::new(2, "Amritotsavam").with_children(vec![EventNode::new(201, "Amritotsavam 2025")]),
        ])
    }

    #[test]
    fn test_first_main_event_expanded() {
        let catalog = catalog();
        assert!(catalog.is_expanded(1));
        assert!(!catalog.is_expanded(2));

        let ids: Vec<EventId> = catalog.visible_rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 101, 102, 2]);
    }

    #[test]
    fn test_toggle_expand() {
        let mut catalog = catalog();
        catalog.toggle_expand(101);
        catalog.toggle_expand(2);
        let ids: Vec<EventId> = catalog.visible_rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 101, 1001, 1002, 102, 2, 201]);

        catalog.toggle_expand(1);
        let ids: Vec<EventId> = catalog.visible_rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 201]);
    }

    #[test]
    fn test_registration_closed_under_closed_ancestor() {
        let mut catalog = catalog();
        catalog.toggle_expand(102);
        assert!(catalog.is_registration_open(1001));
        assert!(!catalog.is_registration_open(1002));
        assert!(!catalog.is_registration_open(1003), "parent sub-event is closed");

        let row = catalog.visible_rows().into_iter().find(|r| r.id == 1003).unwrap();
        assert!(row.is_open);
        assert!(!row.registration_open);
    }

    #[test]
    fn test_select_leaf() {
        let catalog = catalog();
        let target = catalog.select_leaf(1001).unwrap();
        assert_eq!(target.bounds, TeamBounds { min: 2, max: 4 });
        assert!(target.faculty_mentor_required);
        assert_eq!(target.context, "Anokha / Anokha 2025");

        assert!(catalog.select_leaf(1002).is_none(), "closed competition");
        assert!(catalog.select_leaf(1003).is_none(), "closed ancestor");
        assert!(catalog.select_leaf(101).is_none(), "not a competition");
        assert!(catalog.select_leaf(9999).is_none());
    }

    #[test]
    fn test_replace_node_keeps_children() {
        let mut catalog = catalog();
        let fresh = EventNode::new(101, "Anokha 2025 (updated)").closed();
        assert!(catalog.replace_node(fresh));
        let node = catalog.find(101).unwrap();
        assert_eq!(node.name, "Anokha 2025 (updated)");
        assert_eq!(node.children.len(), 2);
        assert!(!catalog.is_registration_open(1001));

        assert!(!catalog.replace_node(EventNode::new(4242, "ghost")));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = EventCatalog::new(Vec::new());
        assert!(catalog.is_empty());
        assert!(catalog.visible_rows().is_empty());
    }
}
