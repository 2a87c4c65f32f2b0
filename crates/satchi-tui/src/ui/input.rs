//! Keyboard input handling for the TUI.
//!
//! Overlays take every key while open; otherwise global keys are checked
//! first and the rest goes to the current tab.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use satchi_core::evaluation::DrillState;
use satchi_core::models::RoleKind;
use satchi_core::signup::SignupField;

use crate::app::{
    can_add_email_char, can_add_field_char, can_add_password_char, AdminPromptKind, App, AppState, LegacyField,
    LoginFocus, MarksEntry, RegField, Tab, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => {
            handle_login_input(app, key);
            return Ok(false);
        }
        AppState::SigningUp => {
            handle_signup_input(app, key);
            return Ok(false);
        }
        AppState::Registering => {
            handle_registration_input(app, key);
            return Ok(false);
        }
        AppState::AdminPrompt => {
            handle_admin_prompt_input(app, key);
            return Ok(false);
        }
        AppState::EnteringMarks => {
            handle_marks_input(app, key);
            return Ok(false);
        }
        AppState::FilteringTeams => {
            handle_filter_input(app, key);
            return Ok(false);
        }
        AppState::EditingLegacy => {
            handle_legacy_edit_input(app, key);
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Left/Right step through choices on the legacy select lines
    let on_legacy_select = app.current_tab == Tab::Legacy
        && matches!(app.focused_legacy_field(), Some(LegacyField::Select(_)));

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            if let Some(tab) = Tab::ALL.get(index) {
                app.select_tab(*tab);
            }
            return Ok(false);
        }
        KeyCode::Left if !on_legacy_select => {
            app.select_tab(app.current_tab.prev());
            return Ok(false);
        }
        KeyCode::Right if !on_legacy_select => {
            app.select_tab(app.current_tab.next());
            return Ok(false);
        }
        KeyCode::Char('l') => {
            if app.is_authenticated() {
                app.logout();
            } else {
                app.start_login();
            }
            return Ok(false);
        }
        KeyCode::Char('s') if !app.is_authenticated() => {
            app.start_signup();
            return Ok(false);
        }
        _ => {}
    }

    match app.current_tab {
        Tab::Events => handle_events_input(app, key),
        Tab::Admin => handle_admin_input(app, key),
        Tab::Evaluate => handle_evaluation_input(app, key),
        Tab::Legacy => handle_legacy_input(app, key),
        Tab::Profile => handle_profile_input(app, key),
    }
    Ok(false)
}

/// Move a list selection for the usual navigation keys.
/// Returns false if the key was not a navigation key.
fn navigate(selection: &mut usize, len: usize, code: KeyCode) -> bool {
    let last = len.saturating_sub(1);
    *selection = match code {
        KeyCode::Up | KeyCode::Char('k') => selection.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => (*selection + 1).min(last),
        KeyCode::PageUp => selection.saturating_sub(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => (*selection + PAGE_SCROLL_SIZE).min(last),
        KeyCode::Home => 0,
        KeyCode::End => last,
        _ => return false,
    };
    true
}

/// Step a focus index forward or backward with wrap-around
fn cycle_focus(focus: &mut usize, len: usize, forward: bool) {
    if len == 0 {
        *focus = 0;
    } else if forward {
        *focus = (*focus + 1) % len;
    } else {
        *focus = (*focus + len - 1) % len;
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

// ============================================================================
// Overlays
// ============================================================================

fn handle_login_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_login(),
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.submit_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email if can_add_email_char(app.login_email.len(), c) => app.login_email.push(c),
            LoginFocus::Password if can_add_password_char(app.login_password.len(), c) => app.login_password.push(c),
            _ => {}
        },
        _ => {}
    }
}

fn handle_signup_input(app: &mut App, key: KeyEvent) {
    if is_ctrl(&key, 't') {
        app.toggle_signup_user_type();
        return;
    }
    let field_count = app.visible_signup_fields().len();
    match key.code {
        KeyCode::Esc => app.state = AppState::Normal,
        KeyCode::Down | KeyCode::Tab => cycle_focus(&mut app.signup_focus, field_count, true),
        KeyCode::Up | KeyCode::BackTab => cycle_focus(&mut app.signup_focus, field_count, false),
        KeyCode::Left => app.cycle_signup_choice(false),
        KeyCode::Right => app.cycle_signup_choice(true),
        KeyCode::Enter => app.submit_signup(),
        KeyCode::Backspace => {
            if let Some(text) = app.focused_signup_field().and_then(|f| app.signup.text_mut(f)) {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            let Some(field) = app.focused_signup_field() else {
                return;
            };
            let Some(text) = app.signup.text_mut(field) else {
                return;
            };
            let allowed = match field {
                SignupField::Email => can_add_email_char(text.len(), c),
                SignupField::Password | SignupField::ConfirmPassword => can_add_password_char(text.len(), c),
                _ => can_add_field_char(text.len(), c),
            };
            if allowed {
                text.push(c);
                app.signup_errors.remove(&field);
            }
        }
        _ => {}
    }
}

fn handle_registration_input(app: &mut App, key: KeyEvent) {
    if is_ctrl(&key, 'a') {
        app.add_reg_member();
        return;
    }
    if is_ctrl(&key, 'd') {
        app.remove_reg_member();
        return;
    }
    let field_count = app.registration_fields().len();
    match key.code {
        KeyCode::Esc => app.close_registration(),
        KeyCode::Down | KeyCode::Tab => cycle_focus(&mut app.reg_focus, field_count, true),
        KeyCode::Up | KeyCode::BackTab => cycle_focus(&mut app.reg_focus, field_count, false),
        KeyCode::Enter => app.submit_registration(),
        KeyCode::Backspace => {
            if let Some(text) = app.focused_reg_field().and_then(|f| app.reg_text_mut(f)) {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            let Some(field) = app.focused_reg_field() else {
                return;
            };
            if let Some(text) = app.reg_text_mut(field) {
                let allowed = match field {
                    RegField::Member(_) => can_add_email_char(text.len(), c),
                    _ => can_add_field_char(text.len(), c),
                };
                if allowed {
                    text.push(c);
                }
            }
        }
        _ => {}
    }
}

fn handle_admin_prompt_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.admin_prompt = None;
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.submit_admin_prompt(),
        _ => {
            let Some(prompt) = app.admin_prompt.as_mut() else {
                return;
            };
            if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
                prompt.cycle_role();
                return;
            }
            let target = if prompt.editing_size {
                &mut prompt.team_size
            } else {
                &mut prompt.input
            };
            match key.code {
                KeyCode::Backspace => {
                    target.pop();
                }
                KeyCode::Char(c) if can_add_field_char(target.len(), c) => target.push(c),
                _ => {}
            }
        }
    }
}

fn handle_marks_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.save_marks();
        return;
    }
    if key.code == KeyCode::Esc {
        app.marks_entry = None;
        app.state = AppState::Normal;
        return;
    }
    let Some(entry) = app.marks_entry.as_mut() else {
        return;
    };
    let columns = MarksEntry::COLUMNS.len();

    if is_ctrl(&key, 'a') {
        entry.rows.push(Default::default());
        entry.row = entry.rows.len() - 1;
        entry.col = 0;
        return;
    }
    if is_ctrl(&key, 'd') {
        if entry.rows.len() > 1 {
            entry.rows.remove(entry.row);
            entry.row = entry.row.min(entry.rows.len() - 1);
        }
        return;
    }

    match key.code {
        KeyCode::Tab => {
            let cell = entry.row * columns + entry.col + 1;
            let cells = entry.rows.len() * columns;
            entry.row = (cell % cells) / columns;
            entry.col = cell % columns;
        }
        KeyCode::BackTab => {
            let cells = entry.rows.len() * columns;
            let cell = (entry.row * columns + entry.col + cells - 1) % cells;
            entry.row = cell / columns;
            entry.col = cell % columns;
        }
        KeyCode::Up => entry.row = entry.row.saturating_sub(1),
        KeyCode::Down => entry.row = (entry.row + 1).min(entry.rows.len() - 1),
        KeyCode::Backspace => {
            if let Some(text) = entry.current_mut() {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(text) = entry.current_mut() {
                if can_add_field_char(text.len(), c) {
                    text.push(c);
                }
            }
            entry.error = None;
        }
        _ => {}
    }
}

fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.evaluation.set_team_filter("");
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.state = AppState::Normal,
        KeyCode::Backspace => {
            app.evaluation.team_filter_mut().pop();
        }
        KeyCode::Char(c) => {
            let filter = app.evaluation.team_filter_mut();
            if can_add_field_char(filter.len(), c) {
                filter.push(c);
            }
        }
        _ => return,
    }
    app.eval_selection = 0;
}

fn handle_legacy_edit_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.state = AppState::Normal,
        KeyCode::Tab | KeyCode::Down => {
            let count = app.legacy_fields().len();
            cycle_focus(&mut app.legacy_focus, count, true);
            if !app.focused_legacy_field().is_some_and(|f| f.is_text()) {
                app.state = AppState::Normal;
            }
        }
        KeyCode::Backspace => {
            if let Some(text) = app.focused_legacy_field().and_then(|f| app.legacy_text_mut(f)) {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(text) = app.focused_legacy_field().and_then(|f| app.legacy_text_mut(f)) {
                if can_add_field_char(text.len(), c) {
                    text.push(c);
                }
            }
        }
        _ => {}
    }
}

// ============================================================================
// Tabs
// ============================================================================

fn handle_events_input(app: &mut App, key: KeyEvent) {
    let len = app.catalog.visible_rows().len();
    if navigate(&mut app.events_selection, len, key.code) {
        return;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.activate_event_row();
            let len = app.catalog.visible_rows().len();
            app.events_selection = app.events_selection.min(len.saturating_sub(1));
        }
        KeyCode::Char('r') => app.refresh_selected_event(),
        KeyCode::Char('u') => app.refresh_events(),
        _ => {}
    }
}

fn handle_admin_input(app: &mut App, key: KeyEvent) {
    let len = app.admin.visible_rows().len();
    if navigate(&mut app.admin_selection, len, key.code) {
        return;
    }
    let selected = app.selected_admin_id();
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(id) = selected {
                app.admin.toggle_expand(id);
            }
        }
        KeyCode::Char('o') => app.toggle_selected_open(),
        KeyCode::Char('d') => app.delete_selected_event(),
        KeyCode::Char('n') => app.start_new_event(false),
        KeyCode::Char('N') => app.start_new_event(true),
        KeyCode::Char('r') => {
            if let Some(id) = selected {
                app.open_admin_prompt(AdminPromptKind::AddRole {
                    id,
                    kind: RoleKind::Coordinator,
                });
            }
        }
        KeyCode::Char('x') => {
            if let Some(id) = selected {
                app.open_admin_prompt(AdminPromptKind::RemoveRole {
                    id,
                    kind: RoleKind::Coordinator,
                });
            }
        }
        _ => {}
    }
}

fn handle_evaluation_input(app: &mut App, key: KeyEvent) {
    let len = app.eval_row_count();
    if navigate(&mut app.eval_selection, len, key.code) {
        return;
    }
    let at_teams = app.evaluation.state() == DrillState::AtTeamList;
    match key.code {
        KeyCode::Enter => app.eval_enter(),
        KeyCode::Char('e') if at_teams => app.eval_enter(),
        KeyCode::Char('/') if at_teams => app.state = AppState::FilteringTeams,
        KeyCode::Esc | KeyCode::Backspace => app.eval_back(),
        _ => {}
    }
}

fn handle_legacy_input(app: &mut App, key: KeyEvent) {
    if !app.can_use_legacy() {
        return;
    }
    let count = app.legacy_fields().len();
    match key.code {
        KeyCode::Up | KeyCode::BackTab => cycle_focus(&mut app.legacy_focus, count, false),
        KeyCode::Down | KeyCode::Tab => cycle_focus(&mut app.legacy_focus, count, true),
        KeyCode::Left | KeyCode::Right => {
            if let Some(LegacyField::Select(level)) = app.focused_legacy_field() {
                app.cycle_legacy_select(level, key.code == KeyCode::Right);
            }
        }
        KeyCode::Enter => app.activate_legacy_field(),
        KeyCode::Char('a') => app.add_legacy_row(),
        KeyCode::Char('x') => app.remove_legacy_row(),
        _ => {}
    }
}

fn handle_profile_input(app: &mut App, key: KeyEvent) {
    let len = app.profile.as_ref().map_or(0, |p| p.registrations.len());
    if navigate(&mut app.profile_selection, len, key.code) {
        return;
    }
    if key.code == KeyCode::Char('u') {
        app.refresh_profile();
    }
}
