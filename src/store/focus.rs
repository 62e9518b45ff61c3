//! Focus state: what the UI is currently looking at
//!
//! Tracks the active scope (list, create form, or a single item), the item
//! type, the focused item, and a bounded history of previously focused items.
//! The display title is derived from those after every transition.
//!
//! State only changes through dispatched focus messages. Item ids and positions
//! are resolved against the data cache through [`ItemLookup`]; this store never
//! writes to the cache.

use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, warn};

use super::{ChangeEmitter, ItemLookup, SubscriptionId};
use crate::dispatch::{FocusAction, Message, ViewChange};
use crate::models::{Item, ItemType, Scope};

pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("no title rule exists for the {0} scope")]
    NotImplemented(Scope),
    #[error("update scope has neither a focus item nor a previous one")]
    NoSubject,
}

/// Title of one item as shown in the update view
pub fn item_title(item: &Item) -> String {
    match item {
        Item::Student(s) => format!("{}, {}", s.last_name, s.first_name),
        Item::Book(b) => format!("{} by {}", b.title, b.author),
        Item::Code(c) => format!("Code: {}", c.code),
    }
}

/// Derive the display title from the focus state
pub fn derive_title(
    scope: Scope,
    item_type: ItemType,
    focus_item: Option<&Item>,
    last_focused: Option<&Item>,
) -> Result<String, TitleError> {
    match scope {
        Scope::General => Ok(item_type.general_title().to_string()),
        Scope::Update => focus_item
            .or(last_focused)
            .map(item_title)
            .ok_or(TitleError::NoSubject),
        Scope::Create => Err(TitleError::NotImplemented(Scope::Create)),
    }
}

#[derive(Debug)]
pub struct FocusState {
    scope: Scope,
    item_type: ItemType,
    focus_item: Option<Item>,
    show_popup: bool,
    /// Most recent first
    past_focus: VecDeque<Item>,
    history_capacity: usize,
    display_title: String,
    emitter: ChangeEmitter,
}

impl Default for FocusState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl FocusState {
    /// Start browsing students with nothing focused
    pub fn new(history_capacity: usize) -> Self {
        let item_type = ItemType::default();
        Self {
            scope: Scope::General,
            item_type,
            focus_item: None,
            show_popup: false,
            past_focus: VecDeque::new(),
            history_capacity: history_capacity.max(1),
            display_title: item_type.general_title().to_string(),
            emitter: ChangeEmitter::default(),
        }
    }

    // ==================== Getters ====================

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn focus_item(&self) -> Option<&Item> {
        self.focus_item.as_ref()
    }

    pub fn display_title(&self) -> &str {
        &self.display_title
    }

    pub fn general_display_title(&self, item_type: ItemType) -> &'static str {
        item_type.general_title()
    }

    /// Previously focused item, 0 being the most recent
    pub fn past_focus_item(&self, index: usize) -> Option<&Item> {
        self.past_focus.get(index)
    }

    pub fn history_len(&self) -> usize {
        self.past_focus.len()
    }

    pub fn show_popup(&self) -> bool {
        self.show_popup
    }

    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> SubscriptionId {
        self.emitter.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.emitter.unsubscribe(id)
    }

    pub fn changes_emitted(&self) -> u64 {
        self.emitter.emitted()
    }

    // ==================== Transitions ====================

    /// React to a dispatched message. Data messages are ignored.
    pub fn handle(&mut self, message: &Message, items: &impl ItemLookup) {
        let Message::Focus(action) = message else {
            return;
        };
        match action {
            FocusAction::ViewChanged(change) => self.change_view(change, items),
            FocusAction::PopupClosed => {
                self.change_view(&ViewChange::scope(Scope::General), items);
                self.show_popup = false;
            }
            FocusAction::PopupOpened { action } => match action {
                Some(scope) => self.change_view(&ViewChange::scope(*scope), items),
                None => debug!("ignoring popup for unknown action"),
            },
        }
        self.emitter.emit();
    }

    fn change_view(&mut self, change: &ViewChange, items: &impl ItemLookup) {
        if let Some(scope) = change.new_scope {
            self.scope = scope;
            self.show_popup = scope.is_popup();
        }

        if let Some(item_type) = change.new_item_type {
            self.item_type = item_type;
        }

        if let Some(id) = &change.item_id {
            self.focus_item = items.item_by_id(self.item_type, id).cloned();
        } else if let Some(index) = change.item_index {
            self.focus_item = items.item_by_index(self.item_type, index).cloned();
        } else if let Some(previous) = self.focus_item.take() {
            self.remember(previous);
        }

        self.update_display_title();
    }

    fn remember(&mut self, item: Item) {
        self.past_focus.push_front(item);
        self.past_focus.truncate(self.history_capacity);
    }

    fn update_display_title(&mut self) {
        match derive_title(
            self.scope,
            self.item_type,
            self.focus_item.as_ref(),
            self.past_focus.front(),
        ) {
            Ok(title) => self.display_title = title,
            Err(TitleError::NotImplemented(scope)) => {
                debug!(%scope, "keeping previous title");
            }
            Err(e) => warn!(error = %e, "keeping previous title"),
        }
    }
}
