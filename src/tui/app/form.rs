//! State behind the create/edit popup

use crate::dispatch::DataAction;
use crate::models::{Item, ItemData, ItemType, Scope};
use crate::tui::ui::form::{FieldChange, FieldSpec, FormError, form_fields, validate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub item_type: ItemType,
    pub scope: Scope,
    /// Server id of the item being edited, `None` when creating
    pub editing_id: Option<String>,
    pub values: ItemData,
    pub focused: usize,
    pub error: Option<String>,
}

impl FormState {
    pub fn create(item_type: ItemType) -> Self {
        Self {
            item_type,
            scope: Scope::Create,
            editing_id: None,
            values: ItemData::new(),
            focused: 0,
            error: None,
        }
    }

    /// Form pre-filled from an existing item
    pub fn edit(item: &Item) -> Self {
        let keys: Vec<&str> = form_fields(item.item_type())
            .unwrap_or_default()
            .iter()
            .map(|f| f.key)
            .collect();
        let values = item
            .to_data()
            .into_iter()
            .filter(|(k, _)| keys.contains(&k.as_str()))
            .collect();

        Self {
            item_type: item.item_type(),
            scope: Scope::Update,
            editing_id: Some(item.id().to_string()),
            values,
            focused: 0,
            error: None,
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        form_fields(self.item_type).unwrap_or_default()
    }

    pub fn focused_field(&self) -> Option<&'static FieldSpec> {
        self.fields().get(self.focused)
    }

    pub fn value(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn next_field(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.focused = (self.focused + 1) % count;
        }
    }

    pub fn prev_field(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.focused = (self.focused + count - 1) % count;
        }
    }

    /// Field edit handler: stores the value under the changed key
    pub fn apply(&mut self, change: FieldChange) {
        self.error = None;
        self.values.insert(change.key, change.value);
    }

    /// Validate and build the data action to dispatch. On failure the error
    /// is kept for display.
    pub fn submit(&mut self) -> Result<DataAction, FormError> {
        let data = validate(self.item_type, &self.values).inspect_err(|e| {
            self.error = Some(e.to_string());
        })?;

        Ok(match &self.editing_id {
            Some(id) => DataAction::UpdateItem {
                item_type: self.item_type,
                id: id.clone(),
                data,
            },
            None => DataAction::CreateItem {
                item_type: self.item_type,
                data,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;

    #[test]
    fn test_create_submit_builds_create_action() {
        let mut form = FormState::create(ItemType::Book);
        form.apply(FieldChange {
            key: "title".into(),
            value: "The Call of Cthulhu".into(),
        });
        form.next_field();
        form.apply(FieldChange {
            key: "author".into(),
            value: "H.P. Lovecraft".into(),
        });

        let action = form.submit().unwrap();
        assert!(matches!(
            action,
            DataAction::CreateItem { item_type: ItemType::Book, ref data } if data.len() == 2
        ));
    }

    #[test]
    fn test_edit_prefills_and_targets_id() {
        let item = Item::Book(Book {
            id: "b7".into(),
            title: "Herbert West".into(),
            author: "H.P. Lovecraft".into(),
        });
        let mut form = FormState::edit(&item);
        assert_eq!(form.value("title"), "Herbert West");

        match form.submit().unwrap() {
            DataAction::UpdateItem { id, data, .. } => {
                assert_eq!(id, "b7");
                assert_eq!(data.get("author").map(String::as_str), Some("H.P. Lovecraft"));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_failed_submit_keeps_error_until_next_edit() {
        let mut form = FormState::create(ItemType::Student);
        assert!(form.submit().is_err());
        assert_eq!(form.error.as_deref(), Some("First Name is required"));

        form.apply(FieldChange {
            key: "firstName".into(),
            value: "Asenath".into(),
        });
        assert!(form.error.is_none());
    }

    #[test]
    fn test_field_focus_wraps() {
        let mut form = FormState::create(ItemType::Book);
        form.prev_field();
        assert_eq!(form.focused, 1);
        form.next_field();
        assert_eq!(form.focused, 0);
    }

    #[test]
    fn test_code_form_has_no_fields() {
        let mut form = FormState::create(ItemType::Code);
        form.next_field();
        assert!(form.focused_field().is_none());
        assert!(matches!(form.submit(), Err(FormError::NotImplemented(_))));
    }
}
