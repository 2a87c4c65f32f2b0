use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use satchi_core::models::EventLevel;

use crate::app::App;
use crate::ui::styles;

use super::tree_prefix;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_event_tree(frame, app, chunks[0]);
    render_event_detail(frame, app, chunks[1]);
}

fn render_event_tree(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([Cell::from("Event"), Cell::from("Registration")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .catalog
        .visible_rows()
        .into_iter()
        .map(|row| {
            let name = format!("{}{}", tree_prefix(row.level, row.has_children, row.expanded), row.name);
            let status = if row.registration_open { "Open" } else { "Closed" };
            Row::new(vec![
                Cell::from(name).style(styles::list_item_style()),
                Cell::from(status).style(styles::open_style(row.registration_open)),
            ])
        })
        .collect();

    let widths = [Constraint::Fill(1), Constraint::Length(14)];
    let title = if app.events_loading {
        " Events (loading...) ".to_string()
    } else {
        format!(" Events ({}) ", app.catalog.events().len())
    };

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
    state.select(Some(app.events_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_event_detail(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app
        .catalog
        .visible_rows()
        .get(app.events_selection)
        .and_then(|row| app.catalog.find(row.id).map(|node| (row.clone(), node)));

    let content = match selected {
        Some((row, node)) => {
            let mut lines = vec![
                Line::from(Span::styled(node.name.clone(), styles::title_style())),
                Line::from(Span::styled(row.level.label(), styles::muted_style())),
                Line::from(""),
            ];
            if let Some(code) = node.code.as_deref() {
                lines.push(Line::from(vec![
                    Span::styled("Code:     ", styles::muted_style()),
                    Span::raw(code.to_string()),
                ]));
            }
            lines.push(Line::from(vec![
                Span::styled("Status:   ", styles::muted_style()),
                Span::styled(
                    if row.registration_open { "Open for registration" } else { "Registration closed" },
                    styles::open_style(row.registration_open),
                ),
            ]));

            if row.level == EventLevel::SubSub {
                let bounds = node.team_bounds();
                let size = if bounds.min == bounds.max {
                    format!("{}", bounds.min)
                } else {
                    format!("{} to {}", bounds.min, bounds.max)
                };
                lines.push(Line::from(vec![
                    Span::styled("Team:     ", styles::muted_style()),
                    Span::raw(format!("{} member(s) including captain", size)),
                ]));
                if node.faculty_mentor_required {
                    lines.push(Line::from(vec![
                        Span::styled("Mentor:   ", styles::muted_style()),
                        Span::raw("Faculty mentor required"),
                    ]));
                }
                if node.min_female_members > 0 {
                    lines.push(Line::from(vec![
                        Span::styled("Female:   ", styles::muted_style()),
                        Span::raw(format!("at least {}", node.min_female_members)),
                    ]));
                }
            } else {
                lines.push(Line::from(vec![
                    Span::styled("Contains: ", styles::muted_style()),
                    Span::raw(format!("{} event(s)", node.children.len())),
                ]));
            }

            if !node.description.trim().is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("About", styles::highlight_style())));
                lines.extend(node.description.lines().map(|l| Line::from(l.to_string())));
            }
            if !node.rules.trim().is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Rules", styles::highlight_style())));
                lines.extend(node.rules.lines().map(|l| Line::from(l.to_string())));
            }

            if row.level == EventLevel::SubSub && row.registration_open {
                lines.push(Line::from(""));
                let hint = if app.is_authenticated() {
                    "Press Enter to register a team"
                } else {
                    "Press Enter to log in and register"
                };
                lines.push(Line::from(Span::styled(hint, styles::help_key_style())));
            }
            lines
        }
        None if app.events_loading => vec![Line::from(Span::styled("Loading events...", styles::muted_style()))],
        None => vec![Line::from(Span::styled("No events published yet", styles::muted_style()))],
    };

    let paragraph = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Details ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );
    frame.render_widget(paragraph, area);
}
