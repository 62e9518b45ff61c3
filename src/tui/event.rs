//! Event handling for the TUI

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;

use super::app::{App, InputMode};
use crate::models::{ItemType, Scope};

const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Handle all input events
pub fn handle_events(app: &mut App) -> Result<()> {
    if event::poll(POLL_TIMEOUT)? {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(app, key),
            Event::Mouse(mouse) => handle_mouse_event(app, mouse),
            _ => {} // Resize redraws on the next frame
        }
    }
    Ok(())
}

pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Delete confirmation first
    if app.pending_delete.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        }
        return;
    }

    if app.show_help {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
        ) {
            app.show_help = false;
        }
        return;
    }

    // Clear status message on any key press
    app.clear_status();

    match app.input_mode {
        InputMode::Command => handle_command_mode(app, key),
        InputMode::Form => handle_form_mode(app, key),
        InputMode::Normal if app.session.focus.show_popup() => handle_detail_popup(app, key),
        InputMode::Normal => handle_normal_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Item types
        KeyCode::Char('1') => app.switch_type(ItemType::Student),
        KeyCode::Char('2') => app.switch_type(ItemType::Book),
        KeyCode::Char('3') => app.switch_type(ItemType::Code),
        KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => app.next_type(),
        KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => app.prev_type(),

        // Navigation - vim style
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),

        // Items
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('n') | KeyCode::Char('a') => app.open_create(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),

        // Data
        KeyCode::Char('r') => app.refresh_current(),
        KeyCode::Char('R') => app.refresh_all(),

        // UI
        KeyCode::Char(':') => app.enter_command(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('t') => app.cycle_theme(),

        _ => {}
    }
}

/// Update scope without an edit form: a read-only view of the focused item
fn handle_detail_popup(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_popup(),
        KeyCode::Char('e') | KeyCode::Enter => app.edit_focused(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char(':') => app.enter_command(),
        _ => {}
    }
}

fn handle_form_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            // An edit form falls back to the item's detail view
            let editing = app.form.as_ref().is_some_and(|f| f.scope == Scope::Update);
            if editing && app.session.focus.scope() == Scope::Update {
                app.form = None;
                app.input_mode = InputMode::Normal;
            } else {
                app.close_popup();
            }
        }
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab | KeyCode::Down => {
            if let Some(form) = app.form.as_mut() {
                form.next_field();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(form) = app.form.as_mut() {
                form.prev_field();
            }
        }
        code => app.form_key(code),
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.execute_command(),
        KeyCode::Tab => app.palette.autocomplete(),
        KeyCode::Up => app.palette.older(),
        KeyCode::Down => app.palette.newer(),
        KeyCode::Backspace => {
            if app.palette.input.is_empty() {
                app.exit_command();
            } else {
                app.palette.pop();
            }
        }
        KeyCode::Char(c) => app.palette.push(c),
        _ => {}
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    // Only the plain table view reacts to the mouse
    if app.show_help
        || app.pending_delete.is_some()
        || app.input_mode != InputMode::Normal
        || app.session.focus.show_popup()
    {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),
        MouseEventKind::Down(MouseButton::Left) => {
            let Some(area) = app.last_table_area else {
                return; // Table hasn't been rendered yet
            };
            let mut clicked = None;
            app.table()
                .click(area, app.selection().offset(), mouse.column, mouse.row, |index| {
                    clicked = Some(index)
                });
            if let Some(index) = clicked {
                app.open_index(index);
            }
        }
        _ => {}
    }
}
