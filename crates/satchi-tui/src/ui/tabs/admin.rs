//! Admin tab: the event hierarchy with per-node permissions and role lists.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use satchi_core::admin::PermissionSet;
use satchi_core::models::{EventLevel, RoleKind};

use crate::app::{AdminPromptKind, App};
use crate::ui::render::{centered_rect_fixed, input_line, overlay_block};
use crate::ui::styles;

use super::tree_prefix;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_tree(frame, app, chunks[0]);
    render_detail(frame, app, chunks[1]);
}

/// Compact `ECDRA` flags, dashes where a permission is missing
fn permission_flags(p: &PermissionSet) -> String {
    [
        (p.can_edit, 'E'),
        (p.can_create, 'C'),
        (p.can_delete, 'D'),
        (p.can_manage_roles, 'R'),
        (p.can_manage_admin_role, 'A'),
    ]
    .iter()
    .map(|(allowed, c)| if *allowed { *c } else { '-' })
    .collect()
}

fn render_tree(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([Cell::from("Event"), Cell::from("Open"), Cell::from("Access")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .admin
        .visible_rows()
        .into_iter()
        .map(|row| {
            let name = format!("{}{}", tree_prefix(row.level, row.has_children, row.expanded), row.name);
            let style = if row.permissions.any() {
                styles::list_item_style()
            } else {
                styles::muted_style()
            };
            Row::new(vec![
                Cell::from(name).style(style),
                Cell::from(if row.is_open { "yes" } else { "no" }).style(styles::open_style(row.is_open)),
                Cell::from(permission_flags(&row.permissions)).style(styles::muted_style()),
            ])
        })
        .collect();

    let widths = [Constraint::Fill(1), Constraint::Length(5), Constraint::Length(7)];
    let title = format!(" Event tree ({}) - local only ", app.admin.tree().len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.admin_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();

    match app.selected_admin_id().and_then(|id| app.admin.get(id)) {
        Some(record) => {
            let perms = app.admin.permissions(record.id);
            lines.push(Line::from(Span::styled(record.name.clone(), styles::title_style())));
            lines.push(Line::from(Span::styled(
                format!("{} #{}", record.level.label(), record.id),
                styles::muted_style(),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Registration: ", styles::muted_style()),
                Span::styled(
                    if record.is_open { "open" } else { "closed" },
                    styles::open_style(record.is_open),
                ),
            ]));
            if record.level == EventLevel::SubSub {
                lines.push(Line::from(vec![
                    Span::styled("Team size:    ", styles::muted_style()),
                    Span::raw(format!("{}-{}", record.min_members, record.max_members)),
                ]));
            }
            lines.push(Line::from(vec![
                Span::styled("Your access:  ", styles::muted_style()),
                Span::raw(permission_flags(&perms)),
            ]));

            for kind in RoleKind::ALL {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(kind.label(), styles::highlight_style())));
                let people = record.roles.people(kind);
                if people.is_empty() {
                    lines.push(Line::from(Span::styled("  none", styles::muted_style())));
                }
                for (name, email) in people {
                    lines.push(Line::from(vec![
                        Span::raw(format!("  {} ", name)),
                        Span::styled(email.to_string(), styles::muted_style()),
                    ]));
                }
            }
        }
        None => lines.push(Line::from(Span::styled("No events", styles::muted_style()))),
    }

    lines.push(Line::from(""));
    let creatable: Vec<&str> = app.admin.creatable_event_types().iter().map(|l| l.label()).collect();
    lines.push(Line::from(vec![
        Span::styled("You can create: ", styles::muted_style()),
        Span::raw(if creatable.is_empty() {
            "nothing".to_string()
        } else {
            creatable.join(", ")
        }),
    ]));
    let scopes = app.admin.administered_sub_events();
    if !scopes.is_empty() {
        let names: Vec<String> = scopes
            .iter()
            .filter_map(|s| app.admin.get(s.sub_event_id).map(|r| r.name.clone()))
            .collect();
        lines.push(Line::from(vec![
            Span::styled("Sub-events you lead: ", styles::muted_style()),
            Span::raw(names.join(", ")),
        ]));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Details ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );
    frame.render_widget(paragraph, area);
}

pub fn render_prompt(frame: &mut Frame, app: &App) {
    let Some(prompt) = app.admin_prompt.as_ref() else {
        return;
    };
    let area = centered_rect_fixed(60, 10, frame.area());
    frame.render_widget(Clear, area);

    let label = match prompt.kind {
        AdminPromptKind::NewEvent { .. } => "Name:      ",
        AdminPromptKind::AddRole { .. } | AdminPromptKind::RemoveRole { .. } => "Email:     ",
    };
    let mut lines = vec![Line::from(""), input_line(label, &prompt.input, !prompt.editing_size)];
    if prompt.wants_team_size() {
        lines.push(input_line("Team size: ", &prompt.team_size, prompt.editing_size));
    }
    lines.push(Line::from(""));
    if let Some(error) = prompt.error.as_deref() {
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }
    let tab_hint = match prompt.kind {
        AdminPromptKind::NewEvent { .. } if prompt.wants_team_size() => "[Tab] name/size ",
        AdminPromptKind::NewEvent { .. } => "",
        _ => "[Tab] switch list ",
    };
    lines.push(Line::from(vec![
        Span::styled(" [Enter] save ", styles::help_key_style()),
        Span::styled(tab_hint, styles::help_key_style()),
        Span::styled("[Esc] cancel", styles::help_key_style()),
    ]));

    let title = format!(" {} ", prompt.title());
    frame.render_widget(Paragraph::new(lines).block(overlay_block(&title)), area);
}
