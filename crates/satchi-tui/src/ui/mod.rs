//! Terminal UI built on ratatui.
//!
//! - `render`: frame layout, title/tab/status bars and overlays
//! - `input`: keyboard handling per state and tab
//! - `styles`: palette and text styles
//! - `tabs`: one renderer per tab plus the registration and signup forms

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
