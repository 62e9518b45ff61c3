//! Tests for the data cache

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use super::*;
use crate::dispatch::FocusAction;
use crate::models::{Book, Code, Student};

const WAIT: Duration = Duration::from_secs(5);

/// In-memory gateway recording every call
struct FakeGateway {
    lists: Mutex<HashMap<ItemType, Vec<Item>>>,
    list_calls: Mutex<Vec<ItemType>>,
    mutations: Mutex<Vec<(&'static str, ItemType, Option<String>)>>,
    fail_lists: AtomicBool,
    fail_mutations: AtomicBool,
    mutation_status: AtomicU16,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            lists: Mutex::new(HashMap::new()),
            list_calls: Mutex::new(Vec::new()),
            mutations: Mutex::new(Vec::new()),
            fail_lists: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
            mutation_status: AtomicU16::new(200),
        }
    }
}

impl FakeGateway {
    fn set_list(&self, item_type: ItemType, items: Vec<Item>) {
        self.lists.lock().unwrap().insert(item_type, items);
    }

    fn list_calls(&self, item_type: ItemType) -> usize {
        self.list_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|t| **t == item_type)
            .count()
    }

    fn mutation_result(&self, url: &str) -> Result<u16, GatewayError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport {
                url: url.to_string(),
                message: "connection refused".into(),
            });
        }
        Ok(self.mutation_status.load(Ordering::SeqCst))
    }
}

impl Gateway for FakeGateway {
    fn list(&self, item_type: ItemType) -> Result<Vec<Item>, GatewayError> {
        self.list_calls.lock().unwrap().push(item_type);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(GatewayError::Status {
                url: format!("/{}", item_type.domain()),
                status: 502,
            });
        }
        Ok(self
            .lists
            .lock()
            .unwrap()
            .get(&item_type)
            .cloned()
            .unwrap_or_default())
    }

    fn create(&self, item_type: ItemType, _data: &ItemData) -> Result<u16, GatewayError> {
        self.mutations
            .lock()
            .unwrap()
            .push(("create", item_type, None));
        self.mutation_result("/create")
    }

    fn update(&self, item_type: ItemType, id: &str, _data: &ItemData) -> Result<u16, GatewayError> {
        self.mutations
            .lock()
            .unwrap()
            .push(("update", item_type, Some(id.to_string())));
        self.mutation_result("/update")
    }

    fn delete(&self, item_type: ItemType, id: &str) -> Result<u16, GatewayError> {
        self.mutations
            .lock()
            .unwrap()
            .push(("delete", item_type, Some(id.to_string())));
        self.mutation_result("/delete")
    }
}

fn student(id: &str, first: &str, last: &str) -> Item {
    Item::Student(Student {
        id: id.into(),
        first_name: first.into(),
        last_name: last.into(),
        email: format!("{id}@miskatonic.edu"),
    })
}

fn book(id: &str, title: &str) -> Item {
    Item::Book(Book {
        id: id.into(),
        title: title.into(),
        author: "H.P. Lovecraft".into(),
    })
}

fn code(id: &str, book_ref: &str, value: &str) -> Item {
    Item::Code(Code {
        id: id.into(),
        book_ref: book_ref.into(),
        student_ref: "s1".into(),
        code: value.into(),
    })
}

fn setup() -> (Arc<FakeGateway>, DataCache) {
    let gateway = Arc::new(FakeGateway::default());
    let cache = DataCache::new(gateway.clone(), "http://test");
    (gateway, cache)
}

fn change_counter(cache: &mut DataCache) -> Rc<Cell<usize>> {
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    cache.subscribe(move || counter.set(counter.get() + 1));
    hits
}

fn read(cache: &mut DataCache, item_type: ItemType) {
    cache.handle(&Message::Data(DataAction::ReadItems { item_type }));
    assert!(cache.wait_idle(WAIT));
}

fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(Item::id).collect()
}

// ==================== Reads ====================

#[test]
fn test_starts_empty_and_getters_never_fetch() {
    let (gateway, cache) = setup();
    for item_type in ItemType::all() {
        assert!(cache.items(*item_type).is_empty());
    }
    assert!(cache.item_by_id(ItemType::Book, "b1").is_none());
    assert!(cache.item_by_index(ItemType::Book, 0).is_none());
    assert_eq!(gateway.list_calls.lock().unwrap().len(), 0);
}

#[test]
fn test_read_sorts_students_by_last_name() {
    let (gateway, mut cache) = setup();
    gateway.set_list(
        ItemType::Student,
        vec![
            student("s1", "Herbert", "West"),
            student("s2", "Henry", "Armitage"),
            student("s3", "Wilbur", "Whateley"),
        ],
    );
    let changes = change_counter(&mut cache);

    read(&mut cache, ItemType::Student);

    assert_eq!(ids(cache.items(ItemType::Student)), ["s2", "s1", "s3"]);
    assert_eq!(changes.get(), 1);
    assert!(cache.last_refreshed(ItemType::Student).is_some());
    assert!(cache.last_refreshed(ItemType::Book).is_none());
}

#[test]
fn test_read_sort_is_stable_for_equal_keys() {
    let (gateway, mut cache) = setup();
    gateway.set_list(
        ItemType::Book,
        vec![book("b2", "Dagon"), book("b1", "Azathoth"), book("b3", "Dagon")],
    );

    read(&mut cache, ItemType::Book);

    assert_eq!(ids(cache.items(ItemType::Book)), ["b1", "b2", "b3"]);
}

#[test]
fn test_codes_sort_by_linked_book_title() {
    let (gateway, mut cache) = setup();
    gateway.set_list(
        ItemType::Book,
        vec![book("b1", "The Shunned House"), book("b2", "Celephais")],
    );
    gateway.set_list(
        ItemType::Code,
        vec![
            code("c1", "b1", "AAA"),
            code("c2", "b2", "BBB"),
            code("c3", "missing", "CCC"),
        ],
    );

    read(&mut cache, ItemType::Book);
    read(&mut cache, ItemType::Code);

    // Unresolved book first, then Celephais, then The Shunned House
    assert_eq!(ids(cache.items(ItemType::Code)), ["c3", "c2", "c1"]);
}

#[test]
fn test_codes_resort_when_books_arrive_later() {
    let (gateway, mut cache) = setup();
    gateway.set_list(
        ItemType::Book,
        vec![book("b1", "The Shunned House"), book("b2", "Celephais")],
    );
    gateway.set_list(
        ItemType::Code,
        vec![code("c1", "b1", "AAA"), code("c2", "b2", "BBB")],
    );
    let changes = change_counter(&mut cache);

    read(&mut cache, ItemType::Code);
    assert_eq!(ids(cache.items(ItemType::Code)), ["c1", "c2"]);

    read(&mut cache, ItemType::Book);

    assert_eq!(ids(cache.items(ItemType::Code)), ["c2", "c1"]);
    // One notification per applied read
    assert_eq!(changes.get(), 2);
}

#[test]
fn test_read_replaces_collection_wholesale() {
    let (gateway, mut cache) = setup();
    gateway.set_list(ItemType::Book, vec![book("b1", "Dagon"), book("b2", "Hypnos")]);
    read(&mut cache, ItemType::Book);

    gateway.set_list(ItemType::Book, vec![book("b3", "Nyarlathotep")]);
    read(&mut cache, ItemType::Book);

    assert_eq!(ids(cache.items(ItemType::Book)), ["b3"]);
    assert!(cache.item_by_id(ItemType::Book, "b1").is_none());
}

#[test]
fn test_read_failure_keeps_state_and_stays_silent() {
    let (gateway, mut cache) = setup();
    gateway.set_list(ItemType::Book, vec![book("b1", "Dagon")]);
    read(&mut cache, ItemType::Book);

    let changes = change_counter(&mut cache);
    gateway.fail_lists.store(true, Ordering::SeqCst);
    gateway.set_list(ItemType::Book, vec![]);
    read(&mut cache, ItemType::Book);

    assert_eq!(ids(cache.items(ItemType::Book)), ["b1"]);
    assert_eq!(changes.get(), 0);
    assert_eq!(cache.in_flight(), 0);
}

#[test]
fn test_lookups_are_idempotent() {
    let (gateway, mut cache) = setup();
    gateway.set_list(ItemType::Book, vec![book("b2", "Hypnos"), book("b1", "Dagon")]);
    read(&mut cache, ItemType::Book);

    let first = cache.item_by_index(ItemType::Book, 0).cloned();
    let again = cache.item_by_index(ItemType::Book, 0).cloned();
    assert_eq!(first, again);
    assert_eq!(first.as_ref().map(Item::id), Some("b1"));

    assert_eq!(
        cache.item_by_id(ItemType::Book, "b2"),
        cache.item_by_id(ItemType::Book, "b2")
    );
    assert_eq!(cache.items(ItemType::Book), cache.items(ItemType::Book));
    assert!(cache.item_by_index(ItemType::Book, 2).is_none());
}

#[test]
fn test_stale_read_is_discarded() {
    let (_gateway, mut cache) = setup();

    // Newer read lands first, an older one straggles in afterwards
    cache
        .tx
        .send(Completion::Read {
            item_type: ItemType::Book,
            seq: 7,
            result: Ok(vec![book("fresh", "Dagon")]),
        })
        .unwrap();
    cache
        .tx
        .send(Completion::Read {
            item_type: ItemType::Book,
            seq: 3,
            result: Ok(vec![book("stale", "Hypnos")]),
        })
        .unwrap();
    cache.in_flight = 2;
    let changes = change_counter(&mut cache);

    cache.poll();

    assert_eq!(ids(cache.items(ItemType::Book)), ["fresh"]);
    assert_eq!(changes.get(), 1);
    assert_eq!(cache.in_flight(), 0);
}

#[test]
fn test_focus_messages_are_ignored() {
    let (gateway, mut cache) = setup();
    cache.handle(&Message::Focus(FocusAction::PopupClosed));
    assert!(cache.wait_idle(WAIT));
    assert_eq!(gateway.list_calls.lock().unwrap().len(), 0);
}

#[test]
fn test_refresh_all_reads_every_type() {
    let (gateway, mut cache) = setup();
    cache.refresh_all();
    assert!(cache.wait_idle(WAIT));
    for item_type in ItemType::all() {
        assert_eq!(gateway.list_calls(*item_type), 1);
    }
}

// ==================== Mutations ====================

#[test]
fn test_create_book_end_to_end() {
    let (gateway, mut cache) = setup();
    let changes = change_counter(&mut cache);

    let mut data = ItemData::new();
    data.insert("title".into(), "At the Mountains of Madness".into());
    data.insert("author".into(), "H.P. Lovecraft".into());

    // Server state after the create
    gateway.set_list(
        ItemType::Book,
        vec![Item::Book(Book {
            id: "b1".into(),
            title: "At the Mountains of Madness".into(),
            author: "H.P. Lovecraft".into(),
        })],
    );

    cache.handle(&Message::Data(DataAction::CreateItem {
        item_type: ItemType::Book,
        data,
    }));
    assert!(cache.wait_idle(WAIT));

    let books = cache.items(ItemType::Book);
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id(), "b1");
    assert!(changes.get() >= 2);
    assert_eq!(gateway.list_calls(ItemType::Book), 1);
    assert_eq!(
        gateway.mutations.lock().unwrap().as_slice(),
        [("create", ItemType::Book, None)]
    );
}

#[test]
fn test_mutation_issues_catch_up_reads_of_all_types() {
    let (gateway, mut cache) = setup();

    cache.handle(&Message::Data(DataAction::DeleteItem {
        item_type: ItemType::Book,
        id: "b1".into(),
    }));
    assert!(cache.wait_idle(WAIT));
    assert_eq!(gateway.list_calls(ItemType::Book), 1);
    assert_eq!(cache.schedule().len(), 3);

    let start = Instant::now();
    for offset in [1_500, 4_000, 11_000] {
        cache.tick(start + Duration::from_millis(offset));
        assert!(cache.wait_idle(WAIT));
    }

    assert!(gateway.list_calls(ItemType::Book) >= 4);
    assert_eq!(gateway.list_calls(ItemType::Student), 3);
    assert_eq!(gateway.list_calls(ItemType::Code), 3);
    assert!(cache.schedule().is_empty());
}

#[test]
fn test_catch_up_reads_wait_for_their_deadline() {
    let (gateway, mut cache) = setup();
    cache.handle(&Message::Data(DataAction::UpdateItem {
        item_type: ItemType::Student,
        id: "s1".into(),
        data: ItemData::new(),
    }));
    assert!(cache.wait_idle(WAIT));

    cache.tick(Instant::now());
    assert!(cache.wait_idle(WAIT));
    assert_eq!(gateway.list_calls(ItemType::Code), 0);
    assert_eq!(cache.schedule().len(), 3);
}

#[test]
fn test_rejected_mutation_still_refreshes() {
    let (gateway, mut cache) = setup();
    gateway.mutation_status.store(500, Ordering::SeqCst);
    let changes = change_counter(&mut cache);

    cache.handle(&Message::Data(DataAction::DeleteItem {
        item_type: ItemType::Code,
        id: "c1".into(),
    }));
    assert!(cache.wait_idle(WAIT));

    assert_eq!(gateway.list_calls(ItemType::Code), 1);
    assert_eq!(changes.get(), 2);
    assert_eq!(cache.schedule().len(), 3);
}

#[test]
fn test_transport_failure_only_arms_catch_up() {
    let (gateway, mut cache) = setup();
    gateway.fail_mutations.store(true, Ordering::SeqCst);
    let changes = change_counter(&mut cache);

    cache.handle(&Message::Data(DataAction::CreateItem {
        item_type: ItemType::Student,
        data: ItemData::new(),
    }));
    assert!(cache.wait_idle(WAIT));

    assert_eq!(gateway.list_calls.lock().unwrap().len(), 0);
    assert_eq!(changes.get(), 0);
    assert_eq!(cache.schedule().len(), 3);
}

#[test]
fn test_new_mutation_supersedes_pending_catch_up() {
    let (gateway, mut cache) = setup();
    for id in ["b1", "b2"] {
        cache.handle(&Message::Data(DataAction::DeleteItem {
            item_type: ItemType::Book,
            id: id.into(),
        }));
        assert!(cache.wait_idle(WAIT));
    }

    assert_eq!(gateway.mutations.lock().unwrap().len(), 2);
    assert_eq!(cache.schedule().len(), 3);
}

#[test]
fn test_catch_up_reads_survive_read_failures() {
    let (gateway, mut cache) = setup();
    cache.handle(&Message::Data(DataAction::CreateItem {
        item_type: ItemType::Book,
        data: ItemData::new(),
    }));
    gateway.fail_lists.store(true, Ordering::SeqCst);
    assert!(cache.wait_idle(WAIT));
    assert_eq!(cache.schedule().len(), 3);

    cache.tick(Instant::now() + Duration::from_secs(11));
    assert!(cache.wait_idle(WAIT));
    assert_eq!(gateway.list_calls(ItemType::Student), 3);
}

#[test]
fn test_unsubscribed_listener_not_called() {
    let (gateway, mut cache) = setup();
    gateway.set_list(ItemType::Book, vec![book("b1", "Dagon")]);
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let id = cache.subscribe(move || counter.set(counter.get() + 1));
    assert!(cache.unsubscribe(id));

    read(&mut cache, ItemType::Book);
    assert_eq!(hits.get(), 0);
    assert_eq!(cache.changes_emitted(), 1);
}

#[test]
fn test_last_mutation_records_outcome() {
    let (gateway, mut cache) = setup();
    assert!(cache.last_mutation().is_none());

    gateway.mutation_status.store(422, Ordering::SeqCst);
    cache.handle(&Message::Data(DataAction::UpdateItem {
        item_type: ItemType::Student,
        id: "s1".into(),
        data: ItemData::new(),
    }));
    assert!(cache.wait_idle(WAIT));
    let outcome = cache.last_mutation().unwrap();
    assert_eq!(outcome.action, "update");
    assert_eq!(outcome.status, Some(422));
    assert!(!outcome.accepted());

    gateway.fail_mutations.store(true, Ordering::SeqCst);
    cache.handle(&Message::Data(DataAction::DeleteItem {
        item_type: ItemType::Student,
        id: "s1".into(),
    }));
    assert!(cache.wait_idle(WAIT));
    assert_eq!(cache.last_mutation().unwrap().status, None);
}
