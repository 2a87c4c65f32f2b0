use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use satchi_core::evaluation::DrillState;

use crate::app::{App, AppState, MarksEntry};
use crate::ui::render::{centered_rect_fixed, overlay_block};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_breadcrumbs(frame, app, chunks[0]);
    if app.evaluation.state() == DrillState::AtTeamList {
        render_teams(frame, app, chunks[1]);
    } else {
        render_options(frame, app, chunks[1]);
    }
}

fn render_breadcrumbs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, crumb) in app.evaluation.breadcrumbs().into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" › ", styles::muted_style()));
        }
        spans.push(Span::styled(crumb.label, styles::highlight_style()));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_options(frame: &mut Frame, app: &App, area: Rect) {
    let options = app.evaluation.options();
    let rows: Vec<Row> = options
        .iter()
        .map(|node| {
            Row::new(vec![
                Cell::from(node.name.clone()),
                Cell::from(format!("{}", node.children.len())).style(styles::muted_style()),
            ])
        })
        .collect();

    let header = Row::new([Cell::from("Name"), Cell::from("Below")]).style(styles::title_style());
    let title = format!(" {} ({}) ", app.evaluation.state().title(), options.len());
    let table = Table::new(rows, [Constraint::Fill(1), Constraint::Length(8)])
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
    state.select(Some(app.eval_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_teams(frame: &mut Frame, app: &App, area: Rect) {
    let teams = app.evaluation.filtered_teams();
    let rows: Vec<Row> = teams
        .iter()
        .map(|team| {
            let evaluated = app.evaluation.is_evaluated(team.id);
            let marks = app
                .evaluation
                .marks_for(team.id)
                .map(|m| {
                    let total: f64 = m.iter().map(|x| x.mark).sum();
                    format!("{:.1} ({} judge(s))", total, m.len())
                })
                .unwrap_or_else(|| "-".to_string());
            Row::new(vec![
                Cell::from(team.name.clone()),
                Cell::from(team.project_topic.clone()).style(styles::muted_style()),
                Cell::from(marks).style(if evaluated {
                    styles::success_style()
                } else {
                    styles::muted_style()
                }),
            ])
        })
        .collect();

    let filter = app.evaluation.team_filter();
    let title = match (app.state == AppState::FilteringTeams, filter.is_empty()) {
        (true, _) => format!(" Teams - filter: {}▌ ", filter),
        (false, true) => format!(" Teams ({}) - [/] filter, [e]valuate ", teams.len()),
        (false, false) => format!(" Teams ({}) matching \"{}\" ", teams.len(), filter),
    };

    let header = Row::new([Cell::from("Team"), Cell::from("Project"), Cell::from("Marks")])
        .style(styles::title_style());
    let table = Table::new(
        rows,
        [Constraint::Percentage(35), Constraint::Fill(1), Constraint::Length(20)],
    )
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
    state.select(Some(app.eval_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

pub fn render_marks_entry(frame: &mut Frame, app: &App) {
    let Some(entry) = app.marks_entry.as_ref() else {
        return;
    };
    let height = (entry.rows.len() as u16 + 9).min(frame.area().height);
    let area = centered_rect_fixed(72, height, frame.area());
    frame.render_widget(Clear, area);

    let header: Vec<Span> = MarksEntry::COLUMNS
        .iter()
        .map(|c| Span::styled(format!(" {:<20}", c), styles::title_style()))
        .collect();
    let mut lines = vec![Line::from(""), Line::from(header)];

    for (r, row) in entry.rows.iter().enumerate() {
        let cells: Vec<Span> = row
            .iter()
            .enumerate()
            .map(|(c, value)| {
                let focused = r == entry.row && c == entry.col;
                let cursor = if focused { "▌" } else { "" };
                Span::styled(format!(" {:<20}", format!("{}{}", value, cursor)), styles::input_style(focused))
            })
            .collect();
        lines.push(Line::from(cells));
    }

    lines.push(Line::from(""));
    if let Some(error) = entry.error.as_deref() {
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }
    lines.push(Line::from(vec![
        Span::styled(" [Enter] save ", styles::help_key_style()),
        Span::styled("[Tab] next cell ", styles::help_key_style()),
        Span::styled("[Ctrl+A] add judge ", styles::help_key_style()),
        Span::styled("[Esc] cancel", styles::help_key_style()),
    ]));

    let title = format!(" Evaluate {} ", entry.team_name);
    frame.render_widget(Paragraph::new(lines).block(overlay_block(&title)), area);
}
