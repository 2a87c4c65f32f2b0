use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab};

use super::styles;
use super::tabs::{admin, evaluation, events, legacy, profile, registration, signup};

/// Width of the text area inside input brackets
pub const INPUT_WIDTH: usize = 28;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::SigningUp => signup::render(frame, app),
        AppState::Registering => registration::render(frame, app),
        AppState::AdminPrompt => admin::render_prompt(frame, app),
        AppState::EnteringMarks => evaluation::render_marks_entry(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  satchi";
    let who = match app.user() {
        Some(user) => format!("{} ({})  [?] Help", user.display_name(), user.role.label()),
        None => "not logged in  [l]ogin [s]ignup  [?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(title.len() + who.chars().count() + 2))),
        Span::styled(who, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        spans.push(Span::styled(label, styles::tab_style(*tab == app.current_tab)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Events => events::render(frame, app, area),
        Tab::Admin => admin::render(frame, app, area),
        Tab::Evaluate => evaluation::render(frame, app, area),
        Tab::Legacy => legacy::render(frame, app, area),
        Tab::Profile => profile::render(frame, app, area),
    }
}

fn tab_shortcuts(app: &App) -> &'static str {
    match app.current_tab {
        Tab::Events => "[Enter] open/register [u]pdate [q]uit",
        Tab::Admin => "[o]pen/close [n]ew [d]elete [r]ole [q]uit",
        Tab::Evaluate => "[Enter] select [/] filter [Esc] back [q]uit",
        Tab::Legacy => "[Enter] edit [a]dd [x] remove [q]uit",
        Tab::Profile => "[u]pdate [l]ogout [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match (&app.status_message, app.events_loading) {
        (Some(msg), _) => format!(" {} ", msg),
        (None, true) => " Loading events... ".to_string(),
        (None, false) => format!(" {} events ", app.catalog.events().len()),
    };
    let right_text = format!(" {} ", tab_shortcuts(app));

    let padding = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(status_line).style(styles::status_bar_style()), area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(56, 30, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let lines = vec![
        Line::from(Span::styled("  satchi", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-5", "Switch tabs"),
        help_line("←/→", "Prev/next tab"),
        help_line("↑/↓", "Move selection"),
        help_line("Enter", "Expand / select / edit"),
        help_line("Esc", "Go back / close"),
        Line::from(""),
        Line::from(Span::styled(" Account", styles::highlight_style())),
        help_line("l", "Log in or out"),
        help_line("s", "Sign up"),
        help_line("u", "Refresh current tab"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Admin", styles::highlight_style())),
        help_line("o", "Open/close registration"),
        help_line("n / N", "New child / new main event"),
        help_line("d", "Delete event and everything below"),
        help_line("r / x", "Add / remove a role member"),
        Line::from(""),
        Line::from(Span::styled(" Forms", styles::highlight_style())),
        help_line("Tab/↑/↓", "Move between fields"),
        help_line("Ctrl+A/D", "Add / remove team member"),
        help_line("a / x", "Add / remove legacy rows"),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(overlay_block(" Help ")), area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 11 } else { 9 };
    let area = centered_rect_fixed(50, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    lines.push(input_line(
        "Email:    ",
        &app.login_email,
        app.login_focus == LoginFocus::Email,
    ));
    lines.push(input_line(
        "Password: ",
        &"*".repeat(app.login_password.chars().count()),
        app.login_focus == LoginFocus::Password,
    ));
    lines.push(Line::from(""));
    lines.push(button_line("Login", app.login_focus == LoginFocus::Button));

    if let Some(ref message) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", message), styles::error_style())));
    }

    frame.render_widget(Paragraph::new(lines).block(overlay_block(" Log in ")), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("   Are you sure you want to quit?", styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(overlay_block(" satchi ")), area);
}

// ============================================================================
// Shared helpers for overlays and forms
// ============================================================================

pub fn overlay_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default())
}

/// `label [value▌]`, showing the tail of long values
pub fn input_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let count = value.chars().count();
    let visible: String = value.chars().skip(count.saturating_sub(INPUT_WIDTH)).collect();
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw(" "),
        Span::styled(label.to_string(), styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(
            format!("{:<width$}", format!("{}{}", visible, cursor), width = INPUT_WIDTH + 1),
            styles::input_style(focused),
        ),
        Span::styled("]", styles::muted_style()),
    ])
}

/// `label < value >` for fields picked from a list
pub fn choice_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let shown = if value.is_empty() { "select..." } else { value };
    Line::from(vec![
        Span::raw(" "),
        Span::styled(label.to_string(), styles::muted_style()),
        Span::styled("< ", styles::muted_style()),
        Span::styled(format!("{:<width$}", shown, width = INPUT_WIDTH - 2), styles::input_style(focused)),
        Span::styled(" >", styles::muted_style()),
    ])
}

pub fn button_line(label: &str, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("            ["),
        Span::styled(text, styles::input_style(focused)),
        Span::raw("]"),
    ])
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let outer = Rect::new(0, 0, 40, 10);
        let rect = centered_rect_fixed(60, 20, outer);
        assert_eq!(rect, Rect::new(0, 0, 40, 10));

        let rect = centered_rect_fixed(20, 4, outer);
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (10, 3, 20, 4));
    }

    #[test]
    fn test_input_line_shows_tail() {
        let long = "x".repeat(INPUT_WIDTH + 5) + "end";
        let line = input_line("Email: ", &long, false);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("end"));
        assert!(text.chars().filter(|c| *c == 'x').count() <= INPUT_WIDTH);
    }
}
