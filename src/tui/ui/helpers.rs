//! Helper functions for UI rendering
//!
//! - Popup geometry
//! - Relative time formatting
//! - Table cells for each item type

use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::models::{Item, ItemType};
use crate::store::ItemLookup;

/// Helper function to create a centered rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Format a timestamp as relative time (e.g., "12s", "5m", "2h")
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(*dt);

    if duration.num_seconds() < 5 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else {
        format!("{}d ago", duration.num_days())
    }
}

/// Cells of one table row, in the order of [`ItemType::labels`].
/// Codes show the linked book title and student name when those are cached,
/// and the raw reference otherwise.
pub fn item_cells(item: &Item, lookup: &impl ItemLookup) -> Vec<String> {
    match item {
        Item::Student(s) => vec![s.last_name.clone(), s.first_name.clone(), s.email.clone()],
        Item::Book(b) => vec![b.title.clone(), b.author.clone()],
        Item::Code(c) => {
            let book = match lookup.item_by_id(ItemType::Book, &c.book_ref) {
                Some(Item::Book(b)) => b.title.clone(),
                _ => c.book_ref.clone(),
            };
            let student = match lookup.item_by_id(ItemType::Student, &c.student_ref) {
                Some(Item::Student(s)) => format!("{}, {}", s.last_name, s.first_name),
                _ => c.student_ref.clone(),
            };
            vec![c.code.clone(), book, student]
        }
    }
}
