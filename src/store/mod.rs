//! Client-side state containers
//!
//! - `data`: cached collections synchronized with the API
//! - `focus`: which item type, scope and item the UI is looking at
//! - `schedule`: the delayed catch-up reads armed after mutations
//!
//! Both stores notify subscribers through a [`ChangeEmitter`] without a payload;
//! listeners re-read whatever they need through the store getters.

pub mod data;
pub mod focus;
pub mod schedule;

use std::fmt;

use crate::models::{Item, ItemType};

pub use data::{DataCache, MutationOutcome};
pub use focus::FocusState;
pub use schedule::RefreshSchedule;

/// Read access to cached items, used by the focus state to resolve ids and
/// positions without owning the cache.
pub trait ItemLookup {
    fn item_by_id(&self, item_type: ItemType, id: &str) -> Option<&Item>;
    fn item_by_index(&self, item_type: ItemType, index: usize) -> Option<&Item>;
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut()>;

/// Change listeners of one store
#[derive(Default)]
pub struct ChangeEmitter {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    emitted: u64,
}

impl fmt::Debug for ChangeEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeEmitter")
            .field("listeners", &self.listeners.len())
            .field("emitted", &self.emitted)
            .finish()
    }
}

impl ChangeEmitter {
    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Call every listener synchronously, in subscription order
    pub fn emit(&mut self) {
        self.emitted += 1;
        for (_, listener) in &mut self.listeners {
            listener();
        }
    }

    /// Number of change events emitted so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_listeners_until_unsubscribed() {
        let mut emitter = ChangeEmitter::default();
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        let id = emitter.subscribe(move || counter.set(counter.get() + 1));

        emitter.emit();
        emitter.emit();
        assert_eq!(hits.get(), 2);

        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.emit();
        assert_eq!(hits.get(), 2);
        assert_eq!(emitter.emitted(), 3);
    }
}
