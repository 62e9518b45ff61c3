//! Tests for the TUI application module

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crossterm::event::KeyCode;

use super::*;
use crate::gateway::GatewayError;
use crate::models::{Book, Code, ItemData, Student};

const WAIT: Duration = Duration::from_secs(5);

/// Fixed collections; mutations are recorded, never applied
#[derive(Default)]
struct Archive {
    calls: Mutex<Vec<(&'static str, ItemType, Option<String>, ItemData)>>,
    lists: AtomicUsize,
}

impl Archive {
    fn calls(&self) -> Vec<(&'static str, ItemType, Option<String>, ItemData)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, verb: &'static str, item_type: ItemType, id: Option<&str>, data: &ItemData) {
        self.calls.lock().unwrap().push((
            verb,
            item_type,
            id.map(String::from),
            data.clone(),
        ));
    }
}

impl Gateway for Archive {
    fn list(&self, item_type: ItemType) -> Result<Vec<Item>, GatewayError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        Ok(match item_type {
            ItemType::Student => vec![
                Item::Student(Student {
                    id: "s1".into(),
                    first_name: "Herbert".into(),
                    last_name: "West".into(),
                    email: "west@miskatonic.edu".into(),
                }),
                Item::Student(Student {
                    id: "s2".into(),
                    first_name: "Randolph".into(),
                    last_name: "Carter".into(),
                    email: "carter@miskatonic.edu".into(),
                }),
            ],
            ItemType::Book => vec![
                Item::Book(Book {
                    id: "b1".into(),
                    title: "The Silver Key".into(),
                    author: "H.P. Lovecraft".into(),
                }),
                Item::Book(Book {
                    id: "b2".into(),
                    title: "Pickman's Model".into(),
                    author: "H.P. Lovecraft".into(),
                }),
            ],
            ItemType::Code => vec![Item::Code(Code {
                id: "c1".into(),
                book_ref: "b1".into(),
                student_ref: "s2".into(),
                code: "K-1".into(),
            })],
        })
    }

    fn create(&self, item_type: ItemType, data: &ItemData) -> Result<u16, GatewayError> {
        self.record("create", item_type, None, data);
        Ok(201)
    }

    fn update(&self, item_type: ItemType, id: &str, data: &ItemData) -> Result<u16, GatewayError> {
        self.record("update", item_type, Some(id), data);
        Ok(200)
    }

    fn delete(&self, item_type: ItemType, id: &str) -> Result<u16, GatewayError> {
        self.record("delete", item_type, Some(id), &ItemData::new());
        Ok(200)
    }
}

fn loaded_app() -> (App, Arc<Archive>) {
    let archive = Arc::new(Archive::default());
    let mut app = App::new(archive.clone(), &AppConfig::default());
    settle(&mut app);
    (app, archive)
}

fn settle(app: &mut App) {
    assert!(app.session.settle(WAIT));
    app.tick();
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.form_key(KeyCode::Char(c));
    }
}

fn run(app: &mut App, command: &str) {
    app.enter_command();
    app.palette.input = command.to_string();
    app.execute_command();
    app.tick();
}

#[test]
fn test_startup_reads_every_collection() {
    let (app, _) = loaded_app();

    for item_type in ItemType::all() {
        assert!(!app.session.cache.items(*item_type).is_empty());
    }
    assert_eq!(app.selection().selected(), Some(0));
    assert_eq!(app.session.focus.display_title(), "STUDENTS");
}

#[test]
fn test_table_rows_are_sorted_and_resolved() {
    let (mut app, _) = loaded_app();
    assert_eq!(app.table().rows()[0][0], "Carter");

    app.switch_type(ItemType::Code);
    app.tick();
    let table = app.table();
    assert_eq!(table.labels(), ["Code", "Book", "Student"]);
    assert_eq!(table.rows()[0], ["K-1", "The Silver Key", "Carter, Randolph"]);
}

#[test]
fn test_open_selected_moves_focus_to_update() {
    let (mut app, _) = loaded_app();
    app.select_next();
    app.open_selected();
    app.tick();

    assert_eq!(app.session.focus.scope(), Scope::Update);
    assert!(app.session.focus.show_popup());
    assert_eq!(app.session.focus.display_title(), "West, Herbert");
    assert!(app.form.is_none());
    assert_eq!(app.input_mode, InputMode::Normal);
}

#[test]
fn test_open_index_zero_is_a_real_position() {
    let (mut app, _) = loaded_app();
    app.open_index(0);
    app.tick();

    assert_eq!(
        app.session.focus.focus_item().map(|i| i.id()),
        Some("s2")
    );
}

#[test]
fn test_create_form_submits_and_closes() {
    let (mut app, archive) = loaded_app();
    app.switch_type(ItemType::Book);
    app.open_create();
    app.tick();
    assert_eq!(app.input_mode, InputMode::Form);
    assert_eq!(app.form.as_ref().map(|f| f.scope), Some(Scope::Create));

    type_text(&mut app, "The Festival");
    app.form.as_mut().unwrap().next_field();
    type_text(&mut app, "H.P. Lovecraft");
    app.submit_form();
    settle(&mut app);

    let calls = archive.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "create");
    assert_eq!(calls[0].1, ItemType::Book);
    assert_eq!(
        calls[0].3.get("title").map(String::as_str),
        Some("The Festival")
    );
    assert!(app.form.is_none());
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.session.focus.scope(), Scope::General);
}

#[test]
fn test_invalid_form_stays_open() {
    let (mut app, archive) = loaded_app();
    app.open_create();
    app.tick();

    type_text(&mut app, "Keziah");
    app.submit_form();
    settle(&mut app);

    assert!(archive.calls().is_empty());
    assert!(app.form.is_some());
    assert!(app.status_message.as_ref().is_some_and(|s| s.is_error));
}

#[test]
fn test_edit_focused_submits_update() {
    let (mut app, archive) = loaded_app();
    app.open_index(1);
    app.tick();
    app.edit_focused();
    assert_eq!(app.input_mode, InputMode::Form);

    app.form_key(KeyCode::Backspace);
    app.form_key(KeyCode::Char('y'));
    app.submit_form();
    settle(&mut app);

    let calls = archive.calls();
    assert_eq!(calls[0].0, "update");
    assert_eq!(calls[0].2.as_deref(), Some("s1"));
    assert_eq!(
        calls[0].3.get("firstName").map(String::as_str),
        Some("Herbery")
    );
}

#[test]
fn test_code_edit_is_not_implemented() {
    let (mut app, _) = loaded_app();
    app.switch_type(ItemType::Code);
    app.tick();
    app.open_index(0);
    app.tick();
    app.edit_focused();

    assert!(app.form.is_none());
    let status = app.status_message.as_ref().unwrap();
    assert!(status.is_error);
    assert!(status.text.contains("not implemented"));
}

#[test]
fn test_delete_requires_confirmation() {
    let (mut app, archive) = loaded_app();
    app.request_delete();
    assert_eq!(
        app.pending_delete.as_ref().map(|p| p.title.as_str()),
        Some("Carter, Randolph")
    );

    app.cancel_delete();
    settle(&mut app);
    assert!(archive.calls().is_empty());

    app.request_delete();
    app.confirm_delete();
    settle(&mut app);
    let calls = archive.calls();
    assert_eq!(calls[0].0, "delete");
    assert_eq!(calls[0].2.as_deref(), Some("s2"));
}

#[test]
fn test_type_switch_commands() {
    let (mut app, _) = loaded_app();
    run(&mut app, "books");
    assert_eq!(app.item_type(), ItemType::Book);
    assert_eq!(app.session.focus.display_title(), "BOOKS");

    run(&mut app, "CODES");
    assert_eq!(app.item_type(), ItemType::Code);
}

#[test]
fn test_view_command_with_index_and_id() {
    let (mut app, _) = loaded_app();
    run(&mut app, "view update book #0");
    assert_eq!(
        app.session.focus.display_title(),
        "Pickman's Model by H.P. Lovecraft"
    );

    run(&mut app, "view update student s1");
    assert_eq!(app.session.focus.display_title(), "West, Herbert");
}

#[test]
fn test_dispatch_command_accepts_raw_actions() {
    let (mut app, _) = loaded_app();
    run(&mut app, r#"dispatch {"type": "POPUP_OPENED", "action": "create"}"#);
    assert_eq!(app.input_mode, InputMode::Form);

    run(&mut app, "close");
    assert!(app.form.is_none());
    assert!(!app.session.focus.show_popup());
}

#[test]
fn test_dispatch_command_rejects_unknown_actions() {
    let (mut app, _) = loaded_app();
    run(&mut app, r#"dispatch {"type": "SUMMON"}"#);
    assert!(app.status_message.as_ref().is_some_and(|s| s.is_error));

    run(&mut app, "dispatch not json");
    assert!(
        app.status_message
            .as_ref()
            .is_some_and(|s| s.text.starts_with("Invalid action JSON"))
    );
}

#[test]
fn test_unknown_command_sets_error() {
    let (mut app, _) = loaded_app();
    run(&mut app, "frobnicate");
    assert_eq!(
        app.status_message.as_ref().map(|s| s.text.as_str()),
        Some("Unknown command: frobnicate")
    );
}

#[test]
fn test_refresh_command_goes_through_the_inbox() {
    let (mut app, archive) = loaded_app();
    let before = archive.lists.load(Ordering::SeqCst);

    app.enter_command();
    app.palette.input = "refresh".to_string();
    app.execute_command();

    // Queued only; nothing reaches the cache until the session pumps
    assert_eq!(app.session.cache.in_flight(), 0);

    settle(&mut app);
    assert_eq!(archive.lists.load(Ordering::SeqCst), before + ItemType::all().len());
}

#[test]
fn test_quit_command() {
    let (mut app, _) = loaded_app();
    run(&mut app, "q");
    assert!(!app.running);
}
