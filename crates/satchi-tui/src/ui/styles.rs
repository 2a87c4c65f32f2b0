use ratatui::style::{Color, Modifier, Style};

use satchi_core::legacy::StatusKind;

// Color palette
pub const PRIMARY: Color = Color::Rgb(88, 120, 208);
pub const SECONDARY: Color = Color::Rgb(96, 176, 112);
pub const ACCENT: Color = Color::Rgb(224, 168, 64);
pub const ERROR: Color = Color::Rgb(208, 72, 72);
pub const MUTED: Color = Color::Rgb(128, 128, 136);
pub const HIGHLIGHT: Color = Color::Rgb(44, 48, 72);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        muted_style()
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

/// Text input box, highlighted while it has focus
pub fn input_style(focused: bool) -> Style {
    if focused {
        selected_style()
    } else {
        list_item_style()
    }
}

/// Registration open/closed marker
pub fn open_style(open: bool) -> Style {
    if open {
        success_style()
    } else {
        error_style()
    }
}

pub fn status_style(kind: StatusKind) -> Style {
    match kind {
        StatusKind::Info => highlight_style(),
        StatusKind::Success => success_style(),
        StatusKind::Error => error_style(),
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(30, 32, 44)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}
