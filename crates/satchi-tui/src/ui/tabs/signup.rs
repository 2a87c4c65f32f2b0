use ratatui::{
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::render::{centered_rect_fixed, choice_line, input_line, overlay_block};
use crate::ui::styles;

const LABEL_WIDTH: usize = 18;

pub fn render(frame: &mut Frame, app: &App) {
    let fields = app.visible_signup_fields();
    let height = (fields.len() as u16 + app.signup_errors.len() as u16 + 9).min(frame.area().height);
    let area = centered_rect_fixed(66, height, frame.area());
    frame.render_widget(Clear, area);

    let form = &app.signup;
    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Account type: ", styles::muted_style()),
            Span::styled(form.user_type().to_string(), styles::highlight_style()),
            Span::styled("  (Ctrl+T to switch)", styles::muted_style()),
        ]),
        Line::from(""),
    ];

    for (i, field) in fields.iter().enumerate() {
        let focused = i == app.signup_focus;
        let label = format!("{:<width$}", field.label(), width = LABEL_WIDTH);
        let value = form.value(*field);
        let line = if field.is_choice() {
            choice_line(&label, value, focused)
        } else if field.is_secret() {
            input_line(&label, &"*".repeat(value.chars().count()), focused)
        } else {
            input_line(&label, value, focused)
        };
        lines.push(line);
        if let Some(error) = app.signup_errors.get(field) {
            lines.push(Line::from(Span::styled(
                format!(" {:<width$}{}", "", error, width = LABEL_WIDTH),
                styles::error_style(),
            )));
        }
    }

    lines.push(Line::from(""));
    if let Some(status) = app.signup_status.as_deref() {
        let style = if app.signup_errors.is_empty() {
            styles::highlight_style()
        } else {
            styles::error_style()
        };
        lines.push(Line::from(Span::styled(format!(" {}", status), style)));
    }
    lines.push(Line::from(vec![
        Span::styled(" [Enter] create account ", styles::help_key_style()),
        Span::styled("[←/→] choose ", styles::help_key_style()),
        Span::styled("[Esc] cancel", styles::help_key_style()),
    ]));

    frame.render_widget(Paragraph::new(lines).block(overlay_block(" Sign up ")), area);
}
