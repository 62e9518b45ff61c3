//! Cached collections synchronized with the book manager API
//!
//! Every data action issues exactly one gateway request on a worker thread. The
//! result comes back over a channel and is applied by [`DataCache::poll`] on the
//! thread that owns the cache, so the collections never need a lock.
//!
//! Reads replace a collection wholesale after sorting it. Mutations never patch
//! the cache from the response: they trigger an immediate read of the same type
//! plus the catch-up reads in [`RefreshSchedule`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::schedule::RefreshSchedule;
use super::{ChangeEmitter, ItemLookup, SubscriptionId};
use crate::dispatch::{DataAction, Message};
use crate::gateway::{Gateway, GatewayError};
use crate::models::{Item, ItemData, ItemType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Create,
    Update,
    Delete,
}

impl Mutation {
    fn verb(&self) -> &'static str {
        match self {
            Mutation::Create => "create",
            Mutation::Update => "update",
            Mutation::Delete => "delete",
        }
    }
}

#[derive(Debug)]
enum Completion {
    Read {
        item_type: ItemType,
        seq: u64,
        result: Result<Vec<Item>, GatewayError>,
    },
    Mutation {
        item_type: ItemType,
        kind: Mutation,
        result: Result<u16, GatewayError>,
    },
}

/// Sort in place by the item type's sort key. Codes sort by the title of the
/// book they reference, looked up in `books`; unresolved books sort first.
pub fn sort_items(item_type: ItemType, items: &mut [Item], books: &[Item]) {
    match item_type {
        ItemType::Student => items.sort_by_cached_key(|item| match item {
            Item::Student(s) => Some(s.last_name.clone()),
            _ => None,
        }),
        ItemType::Book => items.sort_by_cached_key(|item| match item {
            Item::Book(b) => Some(b.title.clone()),
            _ => None,
        }),
        ItemType::Code => items.sort_by_cached_key(|item| match item {
            Item::Code(c) => books.iter().find_map(|b| match b {
                Item::Book(book) if book.id == c.book_ref => Some(book.title.clone()),
                _ => None,
            }),
            _ => None,
        }),
    }
}

/// How the server answered the most recent create, update or delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub item_type: ItemType,
    pub action: &'static str,
    /// HTTP status, `None` when the request got no answer
    pub status: Option<u16>,
}

impl MutationOutcome {
    pub fn accepted(&self) -> bool {
        self.status.is_some_and(|s| (200..300).contains(&s))
    }
}

pub struct DataCache {
    gateway: Arc<dyn Gateway>,
    server_url: String,
    collections: HashMap<ItemType, Vec<Item>>,
    last_refreshed: HashMap<ItemType, DateTime<Utc>>,
    /// Sequence number handed to the next read
    next_seq: u64,
    /// Sequence number of the newest read applied per type
    applied_seq: HashMap<ItemType, u64>,
    in_flight: usize,
    last_mutation: Option<MutationOutcome>,
    schedule: RefreshSchedule,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    emitter: ChangeEmitter,
}

impl DataCache {
    /// Create an empty cache. Nothing is fetched until [`refresh_all`](Self::refresh_all)
    /// or a read action.
    pub fn new(gateway: Arc<dyn Gateway>, server_url: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            gateway,
            server_url: server_url.into(),
            collections: ItemType::all().iter().map(|t| (*t, Vec::new())).collect(),
            last_refreshed: HashMap::new(),
            next_seq: 1,
            applied_seq: HashMap::new(),
            in_flight: 0,
            last_mutation: None,
            schedule: RefreshSchedule::default(),
            tx,
            rx,
            emitter: ChangeEmitter::default(),
        }
    }

    // ==================== Getters ====================

    /// Cached collection, sorted by the type's sort key. May be stale.
    pub fn items(&self, item_type: ItemType) -> &[Item] {
        self.collections
            .get(&item_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn item_by_id(&self, item_type: ItemType, id: &str) -> Option<&Item> {
        self.items(item_type).iter().find(|item| item.id() == id)
    }

    /// Positional lookup; positions shift whenever a read reorders the collection
    pub fn item_by_index(&self, item_type: ItemType, index: usize) -> Option<&Item> {
        self.items(item_type).get(index)
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// When a read of this type was last applied
    pub fn last_refreshed(&self, item_type: ItemType) -> Option<DateTime<Utc>> {
        self.last_refreshed.get(&item_type).copied()
    }

    /// Requests issued but not yet applied
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_mutation(&self) -> Option<&MutationOutcome> {
        self.last_mutation.as_ref()
    }

    pub fn schedule(&self) -> &RefreshSchedule {
        &self.schedule
    }

    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> SubscriptionId {
        self.emitter.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.emitter.unsubscribe(id)
    }

    /// Number of change events emitted so far
    pub fn changes_emitted(&self) -> u64 {
        self.emitter.emitted()
    }

    // ==================== Actions ====================

    /// React to a dispatched message. Focus messages are ignored.
    pub fn handle(&mut self, message: &Message) {
        let Message::Data(action) = message else {
            return;
        };
        match action {
            DataAction::CreateItem { item_type, data } => self.create_item(*item_type, data.clone()),
            DataAction::ReadItems { item_type } => self.read_items(*item_type),
            DataAction::UpdateItem {
                item_type,
                id,
                data,
            } => self.update_item(*item_type, id.clone(), data.clone()),
            DataAction::DeleteItem { item_type, id } => self.delete_item(*item_type, id.clone()),
        }
    }

    /// Read every item type
    pub fn refresh_all(&mut self) {
        for item_type in ItemType::all() {
            self.read_items(*item_type);
        }
    }

    fn read_items(&mut self, item_type: ItemType) {
        let seq = self.next_seq;
        self.next_seq += 1;
        debug!(%item_type, seq, "issuing read");

        self.spawn(move |gateway| Completion::Read {
            item_type,
            seq,
            result: gateway.list(item_type),
        });
    }

    fn create_item(&mut self, item_type: ItemType, data: ItemData) {
        self.spawn(move |gateway| Completion::Mutation {
            item_type,
            kind: Mutation::Create,
            result: gateway.create(item_type, &data),
        });
    }

    fn update_item(&mut self, item_type: ItemType, id: String, data: ItemData) {
        self.spawn(move |gateway| Completion::Mutation {
            item_type,
            kind: Mutation::Update,
            result: gateway.update(item_type, &id, &data),
        });
    }

    fn delete_item(&mut self, item_type: ItemType, id: String) {
        self.spawn(move |gateway| Completion::Mutation {
            item_type,
            kind: Mutation::Delete,
            result: gateway.delete(item_type, &id),
        });
    }

    fn spawn<F>(&mut self, request: F)
    where
        F: FnOnce(&dyn Gateway) -> Completion + Send + 'static,
    {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        self.in_flight += 1;
        thread::spawn(move || {
            // The receiver lives as long as the cache; a send error only means
            // the cache is gone and nobody cares about the answer.
            let _ = tx.send(request(gateway.as_ref()));
        });
    }

    // ==================== Event loop ====================

    /// Apply finished requests and fire due catch-up reads
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    pub fn poll_at(&mut self, now: Instant) {
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion, now);
        }
        self.tick(now);
    }

    /// Fire catch-up reads whose deadline has passed
    pub fn tick(&mut self, now: Instant) {
        let due = self.schedule.take_due(now);
        for _ in 0..due {
            debug!("catch-up refresh");
            self.refresh_all();
        }
    }

    /// Block until every in-flight request has been applied, including reads
    /// triggered along the way. Returns false on timeout.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.rx.recv_timeout(remaining) {
                Ok(completion) => self.apply(completion, Instant::now()),
                Err(_) => return false,
            }
        }
        true
    }

    fn apply(&mut self, completion: Completion, now: Instant) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Read {
                item_type,
                seq,
                result,
            } => self.apply_read(item_type, seq, result),
            Completion::Mutation {
                item_type,
                kind,
                result,
            } => self.apply_mutation(item_type, kind, result, now),
        }
    }

    fn apply_read(&mut self, item_type: ItemType, seq: u64, result: Result<Vec<Item>, GatewayError>) {
        let mut items = match result {
            Ok(items) => items,
            Err(e) => {
                warn!(%item_type, error = %e, "read failed");
                return;
            }
        };

        let newest = self.applied_seq.get(&item_type).copied().unwrap_or(0);
        if seq <= newest {
            debug!(%item_type, seq, newest, "discarding stale read");
            return;
        }

        sort_items(item_type, &mut items, self.items(ItemType::Book));
        debug!(%item_type, count = items.len(), "collection replaced");

        self.collections.insert(item_type, items);

        // Code order depends on book titles, which may arrive after the codes
        if item_type == ItemType::Book
            && let Some(mut codes) = self.collections.remove(&ItemType::Code)
        {
            sort_items(ItemType::Code, &mut codes, self.items(ItemType::Book));
            self.collections.insert(ItemType::Code, codes);
        }

        self.applied_seq.insert(item_type, seq);
        self.last_refreshed.insert(item_type, Utc::now());
        self.emitter.emit();
    }

    fn apply_mutation(
        &mut self,
        item_type: ItemType,
        kind: Mutation,
        result: Result<u16, GatewayError>,
        now: Instant,
    ) {
        self.last_mutation = Some(MutationOutcome {
            item_type,
            action: kind.verb(),
            status: result.as_ref().ok().copied(),
        });

        match result {
            Ok(status) => {
                if (200..300).contains(&status) {
                    info!(%item_type, action = kind.verb(), status, "mutation accepted");
                } else {
                    warn!(%item_type, action = kind.verb(), status, "mutation rejected by server");
                }
                self.emitter.emit();
                self.read_items(item_type);
            }
            Err(e) => {
                warn!(%item_type, action = kind.verb(), error = %e, "mutation failed");
            }
        }

        let superseded = self.schedule.arm(item_type, now);
        if superseded > 0 {
            debug!(%item_type, superseded, "catch-up reads superseded");
        }
    }
}

impl ItemLookup for DataCache {
    fn item_by_id(&self, item_type: ItemType, id: &str) -> Option<&Item> {
        DataCache::item_by_id(self, item_type, id)
    }

    fn item_by_index(&self, item_type: ItemType, index: usize) -> Option<&Item> {
        DataCache::item_by_index(self, item_type, index)
    }
}

#[cfg(test)]
mod tests;
