//! Popup form for creating and editing items
//!
//! Rendering is driven entirely by the field list of an item type. The form
//! owns no state: values come from the caller, and every keystroke that
//! changes a field is turned into a [`FieldChange`] handed to one
//! caller-supplied handler.

use std::sync::LazyLock;

use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use regex::Regex;
use thiserror::Error;

use super::super::theme::Theme;
use crate::models::{ItemData, ItemType, Scope};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
}

/// One input of a form. `key` is the wire name sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const STUDENT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "firstName",
        label: "First Name",
        kind: FieldKind::Text,
    },
    FieldSpec {
        key: "lastName",
        label: "Last Name",
        kind: FieldKind::Text,
    },
    FieldSpec {
        key: "email",
        label: "Email",
        kind: FieldKind::Email,
    },
];

const BOOK_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "title",
        label: "Title",
        kind: FieldKind::Text,
    },
    FieldSpec {
        key: "author",
        label: "Author",
        kind: FieldKind::Text,
    },
];

/// Fields of the form for an item type, `None` where no form exists yet
pub fn form_fields(item_type: ItemType) -> Option<&'static [FieldSpec]> {
    match item_type {
        ItemType::Student => Some(STUDENT_FIELDS),
        ItemType::Book => Some(BOOK_FIELDS),
        ItemType::Code => None,
    }
}

pub fn form_heading(item_type: ItemType, scope: Scope) -> String {
    let noun = match item_type {
        ItemType::Student => "Student",
        ItemType::Book => "Book",
        ItemType::Code => "Code",
    };
    match scope {
        Scope::Update => format!("Edit {noun}"),
        _ => format!("Add {noun}"),
    }
}

/// A single field edit: the caller decides what `key` means
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("{0} forms are not implemented")]
    NotImplemented(ItemType),
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Check every field of the item type's form and return the values to send,
/// trimmed and limited to the form's keys
pub fn validate(item_type: ItemType, values: &ItemData) -> Result<ItemData, FormError> {
    let fields = form_fields(item_type).ok_or(FormError::NotImplemented(item_type))?;

    let mut data = ItemData::new();
    for field in fields {
        let value = values
            .get(field.key)
            .map(|v| v.trim())
            .unwrap_or_default();
        if value.is_empty() {
            return Err(FormError::Missing(field.label));
        }
        if field.kind == FieldKind::Email && !is_valid_email(value) {
            return Err(FormError::InvalidEmail(value.to_string()));
        }
        data.insert(field.key.to_string(), value.to_string());
    }
    Ok(data)
}

/// Apply a keystroke to the value of `field`. Returns false when the key does
/// not edit text, in which case `on_change` is not called.
pub fn edit_field(
    field: &FieldSpec,
    current: &str,
    key: KeyCode,
    on_change: impl FnOnce(FieldChange),
) -> bool {
    let value = match key {
        KeyCode::Char(c) => {
            let mut value = current.to_string();
            value.push(c);
            value
        }
        KeyCode::Backspace => {
            let mut value = current.to_string();
            if value.pop().is_none() {
                return false;
            }
            value
        }
        _ => return false,
    };
    on_change(FieldChange {
        key: field.key.to_string(),
        value,
    });
    true
}

/// Renderer for the create/edit popup
pub struct PopupForm<'a> {
    pub item_type: ItemType,
    pub scope: Scope,
    pub values: &'a ItemData,
    pub focused: usize,
    pub error: Option<&'a str>,
}

impl PopupForm<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let heading = form_heading(self.item_type, self.scope);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.blue))
            .title(Span::styled(
                format!(" {heading} "),
                Style::default().fg(theme.mauve).add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(theme.base));

        let Some(fields) = form_fields(self.item_type) else {
            let placeholder = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("{heading}: not implemented"),
                    Style::default().fg(theme.yellow),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Esc to close",
                    Style::default().fg(theme.subtext0),
                )),
            ])
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(Clear, area);
            frame.render_widget(placeholder, area);
            return;
        };

        let mut lines = vec![Line::from("")];
        for (i, field) in fields.iter().enumerate() {
            let focused = i == self.focused;
            let value = self.values.get(field.key).map(String::as_str).unwrap_or("");
            let label_style = if focused {
                Style::default().fg(theme.blue).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.subtext0)
            };

            let mut spans = vec![
                Span::styled(format!(" {:<12}", field.label), label_style),
                Span::styled(value.to_string(), Style::default().fg(theme.text)),
            ];
            if focused {
                spans.push(Span::styled("│", Style::default().fg(theme.blue)));
            }
            lines.push(Line::from(spans));
        }

        lines.push(Line::from(""));
        if let Some(error) = self.error {
            lines.push(Line::from(Span::styled(
                format!(" {error}"),
                Style::default().fg(theme.red),
            )));
        }
        lines.push(Line::from(vec![
            Span::styled(" Tab", Style::default().fg(theme.yellow)),
            Span::styled(" next field ", Style::default().fg(theme.subtext0)),
            Span::styled(" Enter", Style::default().fg(theme.yellow)),
            Span::styled(" save ", Style::default().fg(theme.subtext0)),
            Span::styled(" Esc", Style::default().fg(theme.yellow)),
            Span::styled(" cancel", Style::default().fg(theme.subtext0)),
        ]));

        let form = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(Clear, area);
        frame.render_widget(form, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> ItemData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_student_form_fields() {
        let keys: Vec<_> = form_fields(ItemType::Student)
            .unwrap()
            .iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(keys, ["firstName", "lastName", "email"]);
        assert_eq!(form_fields(ItemType::Student).unwrap()[2].kind, FieldKind::Email);
    }

    #[test]
    fn test_code_form_not_implemented() {
        assert!(form_fields(ItemType::Code).is_none());
        assert_eq!(
            validate(ItemType::Code, &ItemData::new()),
            Err(FormError::NotImplemented(ItemType::Code))
        );
    }

    #[test]
    fn test_headings() {
        assert_eq!(form_heading(ItemType::Book, Scope::Create), "Add Book");
        assert_eq!(form_heading(ItemType::Student, Scope::Update), "Edit Student");
    }

    #[test]
    fn test_validate_requires_every_field() {
        let values = data(&[("title", "The Shadow over Innsmouth"), ("author", "  ")]);
        assert_eq!(
            validate(ItemType::Book, &values),
            Err(FormError::Missing("Author"))
        );
    }

    #[test]
    fn test_validate_checks_email() {
        let values = data(&[
            ("firstName", "Wilbur"),
            ("lastName", "Whateley"),
            ("email", "wilbur-at-dunwich"),
        ]);
        assert!(matches!(
            validate(ItemType::Student, &values),
            Err(FormError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_validate_trims_and_drops_unknown_keys() {
        let values = data(&[
            ("firstName", " Wilbur "),
            ("lastName", "Whateley"),
            ("email", "wilbur@dunwich.org"),
            ("_id", "s1"),
        ]);
        let sent = validate(ItemType::Student, &values).unwrap();
        assert_eq!(sent.get("firstName").map(String::as_str), Some("Wilbur"));
        assert!(!sent.contains_key("_id"));
    }

    #[test]
    fn test_edit_field_routes_change_to_handler() {
        let field = BOOK_FIELDS[0];
        let mut seen = None;

        assert!(edit_field(&field, "Dago", KeyCode::Char('n'), |c| seen = Some(c)));
        assert_eq!(
            seen,
            Some(FieldChange {
                key: "title".into(),
                value: "Dagon".into()
            })
        );
    }

    #[test]
    fn test_edit_field_ignores_non_text_keys() {
        let field = BOOK_FIELDS[1];
        let mut called = false;

        assert!(!edit_field(&field, "", KeyCode::Backspace, |_| called = true));
        assert!(!edit_field(&field, "x", KeyCode::Up, |_| called = true));
        assert!(!called);
    }
}
