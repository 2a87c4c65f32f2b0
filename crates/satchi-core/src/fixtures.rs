//! Built-in data for the screens that have no backend counterpart.
//!
//! The admin console and the evaluation console run against these
//! hierarchies.

use std::collections::HashMap;

use crate::models::{EventId, EventNode, RoleAssignments, Team};

pub const SUPER_ADMIN_EMAIL: &str = "superadmin@amrita.edu";
pub const MAIN_ADMIN_EMAIL: &str = "anokha.admin@amrita.edu";
pub const SUB_ADMIN_EMAIL: &str = "tech.lead@cb.amrita.edu";
pub const MANAGER_EMAIL: &str = "hack.manager@amrita.edu";
pub const COORDINATOR_EMAIL: &str = "robo.coord@amrita.edu";

fn roles(admins: &[&str], managers: &[&str], coordinators: &[&str]) -> RoleAssignments {
    let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
    RoleAssignments {
        admins: owned(admins),
        managers: owned(managers),
        coordinators: owned(coordinators),
    }
}

/// Mock hierarchy seeded into the admin console
pub fn admin_events() -> Vec<EventNode> {
    vec![
        EventNode::new(1, "Anokha")
            .with_description("National level techfest")
            .with_roles(roles(&[MAIN_ADMIN_EMAIL], &[], &[]))
            .with_children(vec![
                EventNode::new(101, "Anokha 2025")
                    .with_description("Current edition")
                    .with_roles(roles(&[SUB_ADMIN_EMAIL], &[MANAGER_EMAIL], &[]))
                    .with_children(vec![
                        EventNode::new(1001, "Hackathon")
                            .with_description("24 hour build sprint")
                            .with_team_size(2, 4)
                            .with_mentor_required(),
                        EventNode::new(1002, "Robo Wars")
                            .with_description("Arena combat robotics")
                            .with_team_size(3, 5)
                            .with_roles(roles(&[], &[], &[COORDINATOR_EMAIL])),
                        EventNode::new(1003, "Paper Presentation").with_team_size(1, 2),
                    ]),
                EventNode::new(102, "Anokha 2024")
                    .with_description("Previous edition")
                    .closed()
                    .with_children(vec![EventNode::new(1004, "Codeathon 2024").with_team_size(1, 3).closed()]),
            ]),
        EventNode::new(2, "Amritotsavam")
            .with_description("Cultural festival")
            .with_children(vec![EventNode::new(201, "Amritotsavam 2025")
                .closed()
                .with_children(vec![EventNode::new(2001, "Dance Battle").with_team_size(4, 8).closed()])]),
    ]
}

/// Static hierarchy and teams for the evaluation console
pub fn evaluation_hierarchy() -> (Vec<EventNode>, HashMap<EventId, Vec<Team>>) {
    let events = vec![
        EventNode::new(1, "Anokha").with_children(vec![
            EventNode::new(101, "Anokha 2025").with_children(vec![
                EventNode::new(1001, "Hackathon"),
                EventNode::new(1002, "Robo Wars"),
            ]),
            EventNode::new(102, "Anokha 2024").with_children(vec![EventNode::new(1004, "Codeathon 2024")]),
        ]),
        EventNode::new(2, "Amritotsavam").with_children(vec![
            EventNode::new(201, "Amritotsavam 2025").with_children(vec![EventNode::new(2001, "Dance Battle")]),
        ]),
    ];

    let teams = HashMap::from([
        (
            1001,
            vec![
                Team::new(1, "Byte Busters", "Smart irrigation controller"),
                Team::new(2, "Null Pointers", "Campus navigation app"),
                Team::new(3, "Rocket Science", "Low-cost telemetry board"),
            ],
        ),
        (
            1002,
            vec![
                Team::new(4, "Iron Claws", "Flipper bot"),
                Team::new(5, "Bolt Brigade", "Spinner bot"),
            ],
        ),
        (1004, vec![Team::new(6, "Legacy Coders", "Library management system")]),
        (2001, vec![Team::new(7, "Rhythm Nation", "Fusion folk routine")]),
    ]);

    (events, teams)
}
