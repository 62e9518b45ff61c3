//! Owner of the message bus and both stores
//!
//! The TUI and the headless commands both drive the same loop: drain the inbox,
//! hand every message to the data cache and then to the focus state, then let
//! the cache apply finished requests.

use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::{Dispatcher, Inbox, Message};
use crate::gateway::Gateway;
use crate::store::{DataCache, FocusState};

pub struct Session {
    dispatcher: Dispatcher,
    inbox: Inbox,
    pub cache: DataCache,
    pub focus: FocusState,
}

impl Session {
    /// Create the stores. Collections start empty; call
    /// [`DataCache::refresh_all`] for the initial fetch.
    pub fn new(gateway: Arc<dyn Gateway>, server_url: &str, history_capacity: usize) -> Self {
        let (dispatcher, inbox) = Dispatcher::channel();
        Self {
            dispatcher,
            inbox,
            cache: DataCache::new(gateway, server_url),
            focus: FocusState::new(history_capacity),
        }
    }

    /// Handle for UI code to send messages with
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn dispatch(&self, message: impl Into<Message>) {
        self.dispatcher.dispatch(message);
    }

    /// Deliver queued messages and apply finished requests
    pub fn pump(&mut self) {
        for message in self.inbox.drain() {
            self.cache.handle(&message);
            self.focus.handle(&message, &self.cache);
        }
        self.cache.poll();
    }

    /// Pump, then block until no request is in flight. Returns false on timeout.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        self.pump();
        self.cache.wait_idle(timeout)
    }
}
