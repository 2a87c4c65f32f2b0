use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use satchi_core::profile::registration_summary;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(profile) = app.profile.as_ref() else {
        let message = if !app.is_authenticated() {
            " Log in with [l] to see your profile."
        } else if app.profile_loading {
            " Loading profile..."
        } else {
            " Press [u] to load your profile."
        };
        let block = Block::default()
            .title(" Profile ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true));
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(message, styles::muted_style()))).block(block),
            area,
        );
        return;
    };

    let details = profile.details();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(details.len() as u16 + 4), Constraint::Min(5)])
        .split(area);

    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", profile.greeting()), styles::title_style())),
        Line::from(""),
    ];
    lines.extend(details.into_iter().map(|(label, value)| {
        Line::from(vec![
            Span::styled(format!(" {:<14}", label), styles::muted_style()),
            Span::raw(value),
        ])
    }));
    let block = Block::default()
        .title(" Profile ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

    let rows: Vec<Row> = profile
        .registrations
        .iter()
        .map(|reg| Row::new(registration_summary(reg).map(Cell::from)))
        .collect();
    let header = Row::new([
        Cell::from("Team"),
        Cell::from("Event"),
        Cell::from("Role"),
        Cell::from("Registered"),
    ])
    .style(styles::title_style());
    let widths = [
        Constraint::Percentage(22),
        Constraint::Fill(1),
        Constraint::Length(12),
        Constraint::Length(14),
    ];
    let title = format!(
        " My registrations ({}, captain of {}) ",
        profile.registrations.len(),
        profile.captain_count()
    );
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
    state.select(Some(app.profile_selection));
    frame.render_stateful_widget(table, chunks[1], &mut state);
}
