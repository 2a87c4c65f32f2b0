use satchi_core::admin::{
    creatable_event_types, permissions_for, AdminConsole, AdminError, AdminIdentity, EventDraft, EventTree,
    PermissionSet, TreeError,
};
use satchi_core::fixtures::{self, COORDINATOR_EMAIL, MAIN_ADMIN_EMAIL, MANAGER_EMAIL, SUB_ADMIN_EMAIL};
use satchi_core::models::{EventLevel, RoleKind};

const ANOKHA: i64 = 1;
const ANOKHA_2025: i64 = 101;
const HACKATHON: i64 = 1001;
const ROBO_WARS: i64 = 1002;

fn tree() -> EventTree {
    EventTree::from_nodes(&fixtures::admin_events()).unwrap()
}

fn as_user(email: &str) -> AdminIdentity {
    AdminIdentity::new(email, false)
}

fn console(identity: AdminIdentity) -> AdminConsole {
    AdminConsole::from_nodes(identity, &fixtures::admin_events(), "amrita.edu").unwrap()
}

#[test]
fn test_super_admin_has_everything_everywhere() {
    let tree = tree();
    let root = AdminIdentity::new(fixtures::SUPER_ADMIN_EMAIL, true);
    for record in tree.records() {
        assert_eq!(permissions_for(&root, &tree, record.id), PermissionSet::ALL, "node {}", record.id);
    }
    assert_eq!(creatable_event_types(&root, &tree).len(), 3);
}

#[test]
fn test_main_admin_on_competition() {
    let tree = tree();
    let perms = permissions_for(&as_user(MAIN_ADMIN_EMAIL), &tree, HACKATHON);
    assert!(perms.can_edit);
    assert!(!perms.can_create, "competitions have no children");
    assert!(perms.can_delete);
    assert!(perms.can_manage_roles);
    assert!(perms.can_manage_admin_role);

    let own = permissions_for(&as_user(MAIN_ADMIN_EMAIL), &tree, ANOKHA);
    assert!(own.can_create);
    assert!(!own.can_delete, "nobody above a main event administers it");
}

#[test]
fn test_sub_admin_boundary() {
    let tree = tree();
    let lead = as_user(SUB_ADMIN_EMAIL);

    let own = permissions_for(&lead, &tree, ANOKHA_2025);
    assert!(own.can_edit && own.can_create && own.can_manage_roles);
    assert!(!own.can_delete);
    assert!(!own.can_manage_admin_role);

    let leaf = permissions_for(&lead, &tree, HACKATHON);
    assert!(leaf.can_delete);
    assert!(leaf.can_manage_admin_role);

    assert_eq!(permissions_for(&lead, &tree, ANOKHA), PermissionSet::NONE);
    assert_eq!(
        creatable_event_types(&lead, &tree).into_iter().collect::<Vec<_>>(),
        vec![EventLevel::SubSub]
    );
}

#[test]
fn test_manager_and_coordinator_can_only_edit() {
    let tree = tree();

    let manager = permissions_for(&as_user(MANAGER_EMAIL), &tree, HACKATHON);
    assert_eq!(
        manager,
        PermissionSet {
            can_edit: true,
            ..PermissionSet::NONE
        }
    );

    let coordinator = as_user(COORDINATOR_EMAIL);
    assert!(permissions_for(&coordinator, &tree, ROBO_WARS).can_edit);
    assert!(!permissions_for(&coordinator, &tree, HACKATHON).any());
    assert!(creatable_event_types(&coordinator, &tree).is_empty());
}

#[test]
fn test_emails_compare_case_insensitively() {
    let tree = tree();
    let shouting = as_user(&MAIN_ADMIN_EMAIL.to_uppercase());
    assert!(permissions_for(&shouting, &tree, HACKATHON).can_delete);
}

#[test]
fn test_close_cascades_and_reopen_is_local() {
    let mut console = console(as_user(MAIN_ADMIN_EMAIL));

    assert_eq!(console.toggle_open(ANOKHA), Ok(false));
    for id in console.tree().descendants(ANOKHA) {
        assert!(!console.get(id).unwrap().is_open, "descendant {} still open", id);
    }

    assert_eq!(console.toggle_open(ANOKHA), Ok(true));
    assert!(!console.get(ANOKHA_2025).unwrap().is_open);
    assert!(!console.get(HACKATHON).unwrap().is_open);

    assert_eq!(
        console.toggle_open(HACKATHON),
        Err(AdminError::Tree(TreeError::ParentClosed {
            id: HACKATHON,
            parent: ANOKHA_2025
        }))
    );
    assert_eq!(console.toggle_open(ANOKHA_2025), Ok(true));
    assert_eq!(console.toggle_open(HACKATHON), Ok(true));
}

#[test]
fn test_delete_removes_subtree_and_ids_keep_growing() {
    let mut console = console(AdminIdentity::new(fixtures::SUPER_ADMIN_EMAIL, true));
    let before = console.tree().len();

    let removed = console.delete_event(ANOKHA_2025).unwrap();
    assert_eq!(removed.len(), 4);
    assert_eq!(console.tree().len(), before - 4);
    assert!(console.get(HACKATHON).is_none());
    assert!(!console.get(ANOKHA).unwrap().children.contains(&ANOKHA_2025));

    let id = console
        .create_event(EventLevel::Sub, Some(ANOKHA), EventDraft::named("Anokha 2026"))
        .unwrap();
    let max_existing = console.tree().records().map(|r| r.id).filter(|r| *r != id).max().unwrap();
    assert!(id > max_existing);
    assert_eq!(console.get(id).unwrap().level, EventLevel::Sub);
}

#[test]
fn test_manager_cannot_delete_or_manage_roles() {
    let mut console = console(as_user(MANAGER_EMAIL));
    assert!(matches!(console.delete_event(HACKATHON), Err(AdminError::PermissionDenied { .. })));
    assert!(matches!(
        console.add_role(HACKATHON, RoleKind::Coordinator, "helper@amrita.edu"),
        Err(AdminError::PermissionDenied { .. })
    ));
    assert_eq!(console.toggle_open(HACKATHON), Ok(false));
}
