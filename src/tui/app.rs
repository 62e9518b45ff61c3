//! Application state for the TUI

mod form;
mod palette;
mod selection;

#[cfg(test)]
mod tests;

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use ratatui::layout::Rect;
use tracing::{debug, info};

pub use form::FormState;
pub use palette::{COMMANDS, CommandPalette};
pub use selection::RowSelection;

use super::theme::{Theme, ThemeVariant};
use super::ui::form::edit_field;
use super::ui::helpers::item_cells;
use super::ui::table::DataTable;
use crate::config::AppConfig;
use crate::dispatch::{DataAction, FocusAction, Message, RawAction, ViewChange};
use crate::gateway::Gateway;
use crate::models::{Item, ItemType, Scope};
use crate::session::Session;
use crate::store::SubscriptionId;
use crate::store::focus::item_title;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Command, // Vim-style command palette with ':'
    Form,    // Typing into the popup form
}

/// Status message to display temporarily
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Delete waiting for y/n
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub item_type: ItemType,
    pub id: String,
    pub title: String,
}

pub struct App {
    pub running: bool,
    pub input_mode: InputMode,
    pub session: Session,

    // One highlighted row per item type, indexed by `ItemType::index`
    pub selections: [RowSelection; 3],
    pub form: Option<FormState>,
    pub palette: CommandPalette,

    // UI state
    pub show_help: bool,
    pub theme_variant: ThemeVariant,
    pub status_message: Option<StatusMessage>,
    pub pending_delete: Option<PendingDelete>,

    // Mouse interaction state
    pub last_table_area: Option<Rect>,

    // Set by store subscriptions, consumed by `tick`
    data_changed: Rc<Cell<bool>>,
    focus_changed: Rc<Cell<bool>>,
    subscriptions: (SubscriptionId, SubscriptionId),
}

impl App {
    /// Build the stores and queue the initial read of every collection
    pub fn new(gateway: Arc<dyn Gateway>, config: &AppConfig) -> Self {
        let mut session = Session::new(gateway, config.server_url(), config.history_capacity);

        let data_changed = Rc::new(Cell::new(false));
        let focus_changed = Rc::new(Cell::new(false));
        let data_flag = Rc::clone(&data_changed);
        let focus_flag = Rc::clone(&focus_changed);
        let subscriptions = (
            session.cache.subscribe(move || data_flag.set(true)),
            session.focus.subscribe(move || focus_flag.set(true)),
        );

        info!(server = config.server_url(), "starting TUI");
        for item_type in ItemType::all() {
            session.dispatch(DataAction::ReadItems {
                item_type: *item_type,
            });
        }

        Self {
            running: true,
            input_mode: InputMode::Normal,
            session,
            selections: Default::default(),
            form: None,
            palette: CommandPalette::default(),
            show_help: false,
            theme_variant: ThemeVariant::from(config.tui.theme),
            status_message: None,
            pending_delete: None,
            last_table_area: None,
            data_changed,
            focus_changed,
            subscriptions,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn cycle_theme(&mut self) {
        self.theme_variant = self.theme_variant.next();
        self.set_status(format!("Theme: {}", self.theme_variant), false);
    }

    pub fn theme(&self) -> Theme {
        self.theme_variant.theme()
    }

    pub fn dispatch(&self, message: impl Into<Message>) {
        self.session.dispatch(message);
    }

    /// One event-loop step: deliver messages, apply finished requests and
    /// react to whatever the stores reported
    pub fn tick(&mut self) {
        self.session.pump();

        if self.data_changed.replace(false) {
            self.clamp_selections();
        }
        if self.focus_changed.replace(false) {
            self.sync_with_focus();
        }
    }

    // ==================== Table ====================

    pub fn item_type(&self) -> ItemType {
        self.session.focus.item_type()
    }

    pub fn items(&self) -> &[Item] {
        self.session.cache.items(self.item_type())
    }

    pub fn selection(&self) -> &RowSelection {
        &self.selections[self.item_type().index()]
    }

    pub fn selection_mut(&mut self) -> &mut RowSelection {
        &mut self.selections[self.item_type().index()]
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.selection()
            .selected()
            .and_then(|i| self.items().get(i))
    }

    /// Table of the current item type with cells resolved from the cache
    pub fn table(&self) -> DataTable {
        let item_type = self.item_type();
        let rows = self
            .items()
            .iter()
            .map(|item| item_cells(item, &self.session.cache))
            .collect();
        let title = format!(
            "{} ({})",
            self.session.focus.general_display_title(item_type),
            self.items().len()
        );
        DataTable::new(title, item_type.labels(), rows)
    }

    pub fn select_next(&mut self) {
        let len = self.items().len();
        self.selection_mut().select_next(len);
    }

    pub fn select_prev(&mut self) {
        let len = self.items().len();
        self.selection_mut().select_prev(len);
    }

    pub fn select_first(&mut self) {
        let len = self.items().len();
        self.selection_mut().select_first(len);
    }

    pub fn select_last(&mut self) {
        let len = self.items().len();
        self.selection_mut().select_last(len);
    }

    fn clamp_selections(&mut self) {
        for item_type in ItemType::all() {
            let len = self.session.cache.items(*item_type).len();
            self.selections[item_type.index()].clamp(len);
        }
    }

    // ==================== Focus ====================

    /// Show another item type's list
    pub fn switch_type(&mut self, item_type: ItemType) {
        self.dispatch(FocusAction::ViewChanged(ViewChange {
            new_scope: Some(Scope::General),
            new_item_type: Some(item_type),
            ..ViewChange::default()
        }));
    }

    pub fn next_type(&mut self) {
        let next = ItemType::from_index((self.item_type().index() + 1) % 3)
            .unwrap_or(ItemType::Student);
        self.switch_type(next);
    }

    pub fn prev_type(&mut self) {
        let prev = ItemType::from_index((self.item_type().index() + 2) % 3)
            .unwrap_or(ItemType::Student);
        self.switch_type(prev);
    }

    /// Open the row at `index` in the update view
    pub fn open_index(&mut self, index: usize) {
        let len = self.items().len();
        self.selection_mut().select(index, len);
        self.dispatch(FocusAction::ViewChanged(ViewChange {
            new_scope: Some(Scope::Update),
            new_item_type: Some(self.item_type()),
            item_id: None,
            item_index: Some(index),
        }));
    }

    pub fn open_selected(&mut self) {
        if let Some(index) = self.selection().selected() {
            self.open_index(index);
        }
    }

    pub fn open_create(&mut self) {
        self.dispatch(FocusAction::PopupOpened {
            action: Some(Scope::Create),
        });
    }

    pub fn close_popup(&mut self) {
        self.dispatch(FocusAction::PopupClosed);
    }

    /// Bring the form and the table highlight in line with the focus state
    fn sync_with_focus(&mut self) {
        let focus = &self.session.focus;

        if !focus.show_popup() {
            self.form = None;
            if self.input_mode == InputMode::Form {
                self.input_mode = InputMode::Normal;
            }
            return;
        }

        match focus.scope() {
            Scope::Create => {
                let item_type = focus.item_type();
                let stale = self
                    .form
                    .as_ref()
                    .is_none_or(|f| f.scope != Scope::Create || f.item_type != item_type);
                if stale {
                    debug!(%item_type, "opening create form");
                    self.form = Some(FormState::create(item_type));
                }
                self.input_mode = InputMode::Form;
            }
            Scope::Update => {
                let focused_id = focus.focus_item().map(|item| item.id().to_string());
                // Keep an edit form only while it still targets the focused item
                if let Some(form) = &self.form
                    && (form.scope != Scope::Update || form.editing_id != focused_id)
                {
                    self.form = None;
                    self.input_mode = InputMode::Normal;
                }
                if let Some(id) = focused_id
                    && let Some(index) = self.items().iter().position(|i| i.id() == id)
                {
                    let len = self.items().len();
                    self.selection_mut().select(index, len);
                }
            }
            Scope::General => {}
        }
    }

    // ==================== Form ====================

    /// Start editing the focused item in place of its detail view
    pub fn edit_focused(&mut self) {
        let Some(item) = self.session.focus.focus_item() else {
            self.set_status("Nothing to edit", true);
            return;
        };
        let form = FormState::edit(item);
        if form.fields().is_empty() {
            self.set_status(format!("{} forms are not implemented", item.item_type()), true);
            return;
        }
        self.form = Some(form);
        self.input_mode = InputMode::Form;
    }

    /// Route a keystroke to the focused field
    pub fn form_key(&mut self, key: crossterm::event::KeyCode) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let Some(field) = form.focused_field() else {
            return;
        };
        let current = form.value(field.key).to_string();
        edit_field(field, &current, key, |change| form.apply(change));
    }

    /// Validate the form, dispatch the matching data action and close the popup
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.submit() {
            Ok(action) => {
                let verb = match action {
                    DataAction::UpdateItem { .. } => "Updated",
                    _ => "Created",
                };
                let item_type = form.item_type;
                self.dispatch(action);
                self.dispatch(FocusAction::PopupClosed);
                self.set_status(format!("{verb} {item_type}"), false);
            }
            Err(e) => self.set_status(e.to_string(), true),
        }
    }

    // ==================== Delete ====================

    /// Ask for confirmation before deleting the focused item, or the selected
    /// row when no popup is open
    pub fn request_delete(&mut self) {
        let item = if self.session.focus.show_popup() {
            self.session.focus.focus_item()
        } else {
            self.selected_item()
        };
        let Some(item) = item else {
            self.set_status("Nothing to delete", true);
            return;
        };
        let pending = PendingDelete {
            item_type: item.item_type(),
            id: item.id().to_string(),
            title: item_title(item),
        };
        self.pending_delete = Some(pending);
    }

    pub fn confirm_delete(&mut self) {
        let Some(pending) = self.pending_delete.take() else {
            return;
        };
        self.dispatch(DataAction::DeleteItem {
            item_type: pending.item_type,
            id: pending.id,
        });
        if self.session.focus.show_popup() {
            self.dispatch(FocusAction::PopupClosed);
        }
        self.set_status(format!("Deleted {}", pending.title), false);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    // ==================== Data ====================

    pub fn refresh_current(&mut self) {
        let item_type = self.item_type();
        self.dispatch(DataAction::ReadItems { item_type });
        self.set_status(format!("Refreshing {}", item_type.domain()), false);
    }

    pub fn refresh_all(&mut self) {
        for item_type in ItemType::all() {
            self.dispatch(DataAction::ReadItems {
                item_type: *item_type,
            });
        }
        self.set_status("Refreshing everything", false);
    }

    // ==================== Command palette ====================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.palette.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.palette.clear();
    }

    /// Execute the palette input. Only the command word is case-insensitive;
    /// ids and JSON are passed through untouched.
    pub fn execute_command(&mut self) {
        let input = self.palette.input.trim().to_string();
        self.palette.remember(&input);
        self.exit_command();

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input.as_str(), ""));
        let args: Vec<&str> = rest.split_whitespace().collect();

        match word.to_lowercase().as_str() {
            "" => {}
            "q" | "quit" | "exit" => self.quit(),
            "h" | "help" => self.show_help = true,
            "r" | "refresh" => self.refresh_all(),
            "students" | "1" => self.switch_type(ItemType::Student),
            "books" | "2" => self.switch_type(ItemType::Book),
            "codes" | "3" => self.switch_type(ItemType::Code),
            "new" | "add" => self.open_create(),
            "close" => self.close_popup(),
            "theme" | "t" => self.cycle_theme(),
            "open" => self.dispatch(FocusAction::PopupOpened {
                action: args.first().and_then(|a| a.parse().ok()),
            }),
            "view" => {
                let (item_id, item_index) = match args.get(2) {
                    Some(arg) => match arg.strip_prefix('#') {
                        Some(index) => (None, index.parse().ok()),
                        None => (Some(*arg), None),
                    },
                    None => (None, None),
                };
                self.dispatch(FocusAction::ViewChanged(ViewChange::from_raw(
                    args.first().copied(),
                    args.get(1).copied(),
                    item_id,
                    item_index,
                )));
            }
            "dispatch" => match serde_json::from_str::<RawAction>(rest) {
                Ok(raw) => match raw.into_message() {
                    Some(message) => self.dispatch(message),
                    None => self.set_status("Action ignored: unknown type or missing fields", true),
                },
                Err(e) => self.set_status(format!("Invalid action JSON: {e}"), true),
            },
            other => self.set_status(format!("Unknown command: {other}"), true),
        }
    }

    // ==================== Status ====================

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error,
        });
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let (data, focus) = self.subscriptions;
        self.session.cache.unsubscribe(data);
        self.session.focus.unsubscribe(focus);
    }
}
