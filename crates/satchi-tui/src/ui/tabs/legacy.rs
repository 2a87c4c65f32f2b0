//! Legacy tab: backdated registrations with optional evaluation marks.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use satchi_core::legacy::LegacyConsole;
use satchi_core::models::{EventId, EventNode};

use crate::app::{App, AppState, LegacyField, LegacyLevel, MarkPart, MemberPart};
use crate::ui::render::{button_line, choice_line, input_line};
use crate::ui::styles;

const LABEL_WIDTH: usize = 22;

fn selected_name(options: &[EventNode], selected: Option<EventId>) -> String {
    selected
        .and_then(|id| options.iter().find(|o| o.id == id))
        .map(|o| o.name.clone())
        .unwrap_or_default()
}

fn select_value(console: &LegacyConsole, level: LegacyLevel) -> (&'static str, String, bool) {
    match level {
        LegacyLevel::Main => (
            "Main event",
            selected_name(console.main_events(), console.selected_main()),
            console.main_events().is_empty(),
        ),
        LegacyLevel::Sub => (
            "Sub-event",
            selected_name(console.sub_events(), console.selected_sub()),
            console.sub_events().is_empty(),
        ),
        LegacyLevel::Competition => (
            "Competition",
            selected_name(console.competitions(), console.selected_competition()),
            console.competitions().is_empty(),
        ),
    }
}

fn field_label(field: LegacyField) -> String {
    match field {
        LegacyField::Select(_) | LegacyField::Evaluation | LegacyField::Submit => String::new(),
        LegacyField::TeamName => "Team name".to_string(),
        LegacyField::Topic => "Project topic".to_string(),
        LegacyField::CaptainName => "Captain name".to_string(),
        LegacyField::CaptainEmail => "Captain email".to_string(),
        LegacyField::CaptainPhone => "Captain phone".to_string(),
        LegacyField::Mentor => "Faculty mentor".to_string(),
        LegacyField::SubmittedAt => "Submitted (local)".to_string(),
        LegacyField::Member(i, part) => {
            let part = match part {
                MemberPart::Name => "name",
                MemberPart::Email => "email",
                MemberPart::Phone => "phone",
            };
            format!("Member {} {}", i + 1, part)
        }
        LegacyField::Mark(i, part) => {
            let part = match part {
                MarkPart::Judge => "judge",
                MarkPart::Mark => "mark",
                MarkPart::Comments => "comments",
            };
            format!("Mark {} {}", i + 1, part)
        }
    }
}

fn field_value(console: &LegacyConsole, field: LegacyField) -> String {
    let project = &console.project;
    let value = match field {
        LegacyField::TeamName => &project.team_name,
        LegacyField::Topic => &project.project_topic,
        LegacyField::CaptainName => &project.captain_name,
        LegacyField::CaptainEmail => &project.captain_email,
        LegacyField::CaptainPhone => &project.captain_phone,
        LegacyField::Mentor => &project.faculty_mentor_name,
        LegacyField::SubmittedAt => &project.submitted_at,
        LegacyField::Member(i, part) => match console.members.get(i) {
            Some(m) => match part {
                MemberPart::Name => &m.name,
                MemberPart::Email => &m.email,
                MemberPart::Phone => &m.phone,
            },
            None => return String::new(),
        },
        LegacyField::Mark(i, part) => match console.marks.get(i) {
            Some(m) => match part {
                MarkPart::Judge => &m.judge_name,
                MarkPart::Mark => &m.mark,
                MarkPart::Comments => &m.comments,
            },
            None => return String::new(),
        },
        LegacyField::Select(_) | LegacyField::Evaluation | LegacyField::Submit => return String::new(),
    };
    value.clone()
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Legacy registration ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if !app.can_use_legacy() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                " Backdated registrations are limited to admins and coordinators.",
                styles::muted_style(),
            )),
            Line::from(Span::styled(" Press [l] to log in with such an account.", styles::muted_style())),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let console = &app.legacy;
    let fields = app.legacy_fields();
    let mut lines: Vec<Line> = Vec::with_capacity(fields.len() + 8);

    if let Some(status) = console.status() {
        lines.push(Line::from(Span::styled(
            format!(" {}", status.message),
            styles::status_style(status.kind),
        )));
        lines.push(Line::from(""));
    }

    for (i, field) in fields.iter().enumerate() {
        let focused = i == app.legacy_focus;
        match field {
            LegacyField::Select(level) => {
                let (label, value, empty) = select_value(console, *level);
                let value = if empty && value.is_empty() { "(none available)".to_string() } else { value };
                lines.push(choice_line(&format!("{:<width$}", label, width = LABEL_WIDTH), &value, focused));
            }
            LegacyField::Evaluation => {
                lines.push(Line::from(""));
                let mark = if console.evaluation_enabled() { "[x]" } else { "[ ]" };
                lines.push(Line::from(vec![
                    Span::raw(" "),
                    Span::styled(format!("{} Include evaluation", mark), styles::input_style(focused)),
                    Span::styled(
                        format!("  {} judge(s) on file", console.judges().len()),
                        styles::muted_style(),
                    ),
                ]));
            }
            LegacyField::Submit => {
                lines.push(Line::from(""));
                lines.push(button_line("Submit", focused));
            }
            text => {
                let editing = focused && app.state == AppState::EditingLegacy;
                let label = format!("{:<width$}", field_label(*text), width = LABEL_WIDTH);
                let line = input_line(&label, &field_value(console, *text), focused);
                if editing {
                    lines.push(line.style(styles::highlight_style()));
                } else {
                    lines.push(line);
                }
            }
        }
    }

    // Keep the focused line in view
    let inner_height = area.height.saturating_sub(2) as usize;
    let focus_line = app.legacy_focus + if console.status().is_some() { 2 } else { 0 };
    let scroll = focus_line.saturating_sub(inner_height.saturating_sub(3));

    let paragraph = Paragraph::new(lines).block(block).scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_labels() {
        assert_eq!(field_label(LegacyField::Member(0, MemberPart::Email)), "Member 1 email");
        assert_eq!(field_label(LegacyField::Mark(2, MarkPart::Mark)), "Mark 3 mark");
        assert_eq!(field_label(LegacyField::Submit), "");
    }

    #[test]
    fn test_field_value_reads_console() {
        let mut console = LegacyConsole::new();
        console.project.team_name = "Byte Busters".into();
        assert_eq!(field_value(&console, LegacyField::TeamName), "Byte Busters");
        assert_eq!(field_value(&console, LegacyField::Member(5, MemberPart::Name)), "");
    }
}
