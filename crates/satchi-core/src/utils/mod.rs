//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    contains_ignore_case, digits_only, display_name_from_email, format_date, format_phone,
    truncate_string,
};
