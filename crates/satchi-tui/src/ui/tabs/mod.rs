pub mod admin;
pub mod evaluation;
pub mod events;
pub mod legacy;
pub mod profile;
pub mod registration;
pub mod signup;

use satchi_core::models::EventLevel;

/// Indent plus expand marker for a tree row
pub(crate) fn tree_prefix(level: EventLevel, has_children: bool, expanded: bool) -> String {
    let marker = match (has_children, expanded) {
        (false, _) => "  ",
        (true, false) => "▸ ",
        (true, true) => "▾ ",
    };
    format!("{}{}", "  ".repeat(level.depth()), marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_prefix() {
        assert_eq!(tree_prefix(EventLevel::Main, true, false), "▸ ");
        assert_eq!(tree_prefix(EventLevel::SubSub, false, false), "      ");
        assert!(tree_prefix(EventLevel::Sub, true, true).ends_with("▾ "));
    }
}
