//! Message bus between UI actions and the stores
//!
//! UI code holds a cloneable [`Dispatcher`] and sends typed [`Message`]s. The
//! owner of the stores drains the matching [`Inbox`] once per loop iteration and
//! hands each message to the data cache first, then to the focus state.

use std::sync::mpsc::{self, Receiver, Sender};

use serde::Deserialize;
use tracing::trace;

use crate::models::{ItemData, ItemType, Scope};

/// Requests for the data cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataAction {
    CreateItem { item_type: ItemType, data: ItemData },
    ReadItems { item_type: ItemType },
    UpdateItem { item_type: ItemType, id: String, data: ItemData },
    DeleteItem { item_type: ItemType, id: String },
}

/// Arguments of a view change. Absent values leave that part of the state alone
/// (or, for the id/index pair, clear the focus item).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewChange {
    pub new_scope: Option<Scope>,
    pub new_item_type: Option<ItemType>,
    pub item_id: Option<String>,
    pub item_index: Option<usize>,
}

impl ViewChange {
    pub fn scope(scope: Scope) -> Self {
        Self {
            new_scope: Some(scope),
            ..Self::default()
        }
    }

    /// Build from untyped input. Unrecognized scope or item type strings and
    /// empty ids are treated as absent.
    pub fn from_raw(
        new_scope: Option<&str>,
        new_item_type: Option<&str>,
        item_id: Option<&str>,
        item_index: Option<usize>,
    ) -> Self {
        Self {
            new_scope: new_scope.and_then(|s| s.parse().ok()),
            new_item_type: new_item_type.and_then(|t| t.parse().ok()),
            item_id: item_id.filter(|id| !id.is_empty()).map(String::from),
            item_index,
        }
    }
}

/// Requests for the focus state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusAction {
    ViewChanged(ViewChange),
    PopupClosed,
    /// `None` when the requested action was not a known scope
    PopupOpened { action: Option<Scope> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Data(DataAction),
    Focus(FocusAction),
}

impl From<DataAction> for Message {
    fn from(action: DataAction) -> Self {
        Message::Data(action)
    }
}

impl From<FocusAction> for Message {
    fn from(action: FocusAction) -> Self {
        Message::Focus(action)
    }
}

/// Sending half of the bus
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: Sender<Message>,
}

/// Receiving half of the bus, owned by whoever owns the stores
#[derive(Debug)]
pub struct Inbox {
    rx: Receiver<Message>,
}

impl Dispatcher {
    pub fn channel() -> (Dispatcher, Inbox) {
        let (tx, rx) = mpsc::channel();
        (Dispatcher { tx }, Inbox { rx })
    }

    pub fn dispatch(&self, message: impl Into<Message>) {
        let message = message.into();
        trace!(?message, "dispatch");
        if self.tx.send(message).is_err() {
            trace!("inbox closed, message dropped");
        }
    }
}

impl Inbox {
    /// All queued messages, in dispatch order
    pub fn drain(&self) -> Vec<Message> {
        self.rx.try_iter().collect()
    }
}

/// View change arguments in their wire shape
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawViewArgs {
    pub new_scope: Option<String>,
    pub new_item_type: Option<String>,
    pub item_id: Option<String>,
    pub item_index: Option<usize>,
}

/// Untyped action object, e.g.
/// `{"type": "CREATE_ITEM", "itemType": "book", "data": {"title": "..."}}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub item_type: Option<String>,
    pub data: Option<ItemData>,
    pub id: Option<String>,
    pub args: Option<RawViewArgs>,
    pub action: Option<String>,
}

impl RawAction {
    /// Validate into a typed message; `None` when the kind is unknown or a
    /// required field is missing.
    pub fn into_message(self) -> Option<Message> {
        let item_type = self.item_type.as_deref().and_then(|t| t.parse::<ItemType>().ok());

        let message = match self.kind.as_str() {
            "CREATE_ITEM" => DataAction::CreateItem {
                item_type: item_type?,
                data: self.data?,
            }
            .into(),
            "READ_ITEMS" => DataAction::ReadItems {
                item_type: item_type?,
            }
            .into(),
            "UPDATE_ITEM" => DataAction::UpdateItem {
                item_type: item_type?,
                id: self.id?,
                data: self.data?,
            }
            .into(),
            "DELETE_ITEM" => DataAction::DeleteItem {
                item_type: item_type?,
                id: self.id?,
            }
            .into(),
            "VIEW_CHANGED" => {
                let args = self.args?;
                FocusAction::ViewChanged(ViewChange::from_raw(
                    args.new_scope.as_deref(),
                    args.new_item_type.as_deref(),
                    args.item_id.as_deref(),
                    args.item_index,
                ))
                .into()
            }
            "POPUP_CLOSED" => FocusAction::PopupClosed.into(),
            "POPUP_OPENED" => FocusAction::PopupOpened {
                action: self.action.as_deref().and_then(|a| a.parse().ok()),
            }
            .into(),
            _ => return None,
        };
        Some(message)
    }
}
