//! Record types managed by the client
//!
//! Students, books, and borrow codes as the book manager API serves them,
//! plus the item type and scope enums the stores switch on.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Form fields sent to the API on create/update, keyed by wire name
pub type ItemData = BTreeMap<String, String>;

/// Failure to parse one of the enumerated string values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Category of record, each with its own schema and endpoint domain
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, clap::ValueEnum, Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Student,
    Book,
    Code,
}

impl ItemType {
    pub fn all() -> &'static [ItemType] {
        &[ItemType::Student, ItemType::Book, ItemType::Code]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Student => "student",
            ItemType::Book => "book",
            ItemType::Code => "code",
        }
    }

    /// Path segment of the collection endpoints
    pub fn domain(&self) -> &'static str {
        match self {
            ItemType::Student => "students",
            ItemType::Book => "books",
            ItemType::Code => "codes",
        }
    }

    /// Heading shown while browsing the list of this type
    pub fn general_title(&self) -> &'static str {
        match self {
            ItemType::Student => "STUDENTS",
            ItemType::Book => "BOOKS",
            ItemType::Code => "CODES",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ItemType::Student => 0,
            ItemType::Book => 1,
            ItemType::Code => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<ItemType> {
        ItemType::all().get(index).copied()
    }

    /// Column labels used by the table views
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            ItemType::Student => &["Last Name", "First Name", "Email"],
            ItemType::Book => &["Title", "Author"],
            ItemType::Code => &["Code", "Book", "Student"],
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(ItemType::Student),
            "book" => Ok(ItemType::Book),
            "code" => Ok(ItemType::Code),
            other => Err(ParseEnumError {
                kind: "item type",
                value: other.to_string(),
            }),
        }
    }
}

/// UI mode: browsing, creating, or looking at one existing item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    General,
    Create,
    Update,
}

impl Scope {
    pub fn all() -> &'static [Scope] {
        &[Scope::General, Scope::Create, Scope::Update]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::General => "general",
            Scope::Create => "create",
            Scope::Update => "update",
        }
    }

    /// Create and update both show the popup
    pub fn is_popup(&self) -> bool {
        matches!(self, Scope::Create | Scope::Update)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Scope::General),
            "create" => Ok(Scope::Create),
            "update" => Ok(Scope::Update),
            other => Err(ParseEnumError {
                kind: "scope",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
}

/// A borrow code linking a student to a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "book", default)]
    pub book_ref: String,
    #[serde(rename = "student", default)]
    pub student_ref: String,
    #[serde(default)]
    pub code: String,
}

/// Any record held by the data cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Item {
    Student(Student),
    Book(Book),
    Code(Code),
}

impl Item {
    pub fn id(&self) -> &str {
        match self {
            Item::Student(s) => &s.id,
            Item::Book(b) => &b.id,
            Item::Code(c) => &c.id,
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            Item::Student(_) => ItemType::Student,
            Item::Book(_) => ItemType::Book,
            Item::Code(_) => ItemType::Code,
        }
    }

    /// Wire-named field values, the shape an edit form starts from
    pub fn to_data(&self) -> ItemData {
        let pairs: Vec<(&str, &str)> = match self {
            Item::Student(s) => vec![
                ("firstName", &s.first_name),
                ("lastName", &s.last_name),
                ("email", &s.email),
            ],
            Item::Book(b) => vec![("title", &b.title), ("author", &b.author)],
            Item::Code(c) => vec![
                ("book", &c.book_ref),
                ("student", &c.student_ref),
                ("code", &c.code),
            ],
        };
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// Decode a JSON array returned by a list endpoint into items of one type
pub fn decode_collection(
    item_type: ItemType,
    value: serde_json::Value,
) -> serde_json::Result<Vec<Item>> {
    Ok(match item_type {
        ItemType::Student => serde_json::from_value::<Vec<Student>>(value)?
            .into_iter()
            .map(Item::Student)
            .collect(),
        ItemType::Book => serde_json::from_value::<Vec<Book>>(value)?
            .into_iter()
            .map(Item::Book)
            .collect(),
        ItemType::Code => serde_json::from_value::<Vec<Code>>(value)?
            .into_iter()
            .map(Item::Code)
            .collect(),
    })
}
