//! Team registration overlay for a single competition.

use ratatui::{
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use satchi_core::registration::SubmissionStatus;

use crate::app::{App, RegField};
use crate::ui::render::{button_line, centered_rect_fixed, input_line, overlay_block};
use crate::ui::styles;

const LABEL_WIDTH: usize = 17;

pub fn render(frame: &mut Frame, app: &App) {
    let Some(form) = app.registration.as_ref() else {
        return;
    };
    let target = form.target();
    let fields = app.registration_fields();

    let height = (fields.len() as u16 + 14).min(frame.area().height);
    let area = centered_rect_fixed(64, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", target.context), styles::muted_style())),
        Line::from(Span::styled(
            format!(
                " Team of {} to {}, you included as captain ({} now)",
                target.bounds.min,
                target.bounds.max,
                form.team_size()
            ),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!(" {:<width$}", "Captain", width = LABEL_WIDTH), styles::muted_style()),
            Span::raw(format!("{} <{}>", form.captain_name(), form.captain_email())),
        ]),
    ];

    for (i, field) in fields.iter().enumerate() {
        let label = format!("{:<width$}", field.label(), width = LABEL_WIDTH);
        let value = match field {
            RegField::Phone => form.captain_phone.as_str(),
            RegField::TeamName => form.team_name.as_str(),
            RegField::Topic => form.project_topic.as_str(),
            RegField::Mentor => form.faculty_mentor_name.as_str(),
            RegField::Member(m) => form.members().get(*m).map(String::as_str).unwrap_or_default(),
        };
        lines.push(input_line(&label, value, i == app.reg_focus));
    }

    lines.push(Line::from(""));
    lines.push(button_line("Submit", false));

    let status = match form.status() {
        SubmissionStatus::Idle => None,
        SubmissionStatus::Submitting => form.status().message().map(|m| (m, styles::highlight_style())),
        SubmissionStatus::Succeeded(m) => Some((m.as_str(), styles::success_style())),
        SubmissionStatus::Failed(m) => Some((m.as_str(), styles::error_style())),
    };
    lines.push(Line::from(""));
    if let Some((message, style)) = status {
        lines.push(Line::from(Span::styled(format!(" {}", message), style)));
    }
    if target.min_female_members > 0 {
        lines.push(Line::from(Span::styled(
            format!(" At least {} female member(s) required", target.min_female_members),
            styles::muted_style(),
        )));
    }

    let mut hints = vec![Span::styled(" [Enter] submit ", styles::help_key_style())];
    if form.can_add_member() {
        hints.push(Span::styled("[Ctrl+A] add member ", styles::help_key_style()));
    }
    if form.can_remove_member() {
        hints.push(Span::styled("[Ctrl+D] remove member ", styles::help_key_style()));
    }
    hints.push(Span::styled("[Esc] close", styles::help_key_style()));
    lines.push(Line::from(hints));

    let title = format!(" Register: {} ", target.name);
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(overlay_block(&title));
    frame.render_widget(paragraph, area);
}
