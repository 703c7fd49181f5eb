//! The attribute catalog and the normalised per-person attribute rows.
//!
//! `AttributeDefinition` is the fixed registry of named, typed facts that may
//! be recorded about a person. `AttributeValue` is one concrete assignment;
//! its definition is carried alongside so readers never issue a second
//! lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a stored attribute value is meant to be interpreted.
///
/// Advisory only: values are stored and returned as text, and no coercion is
/// applied on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
  Text,
  Boolean,
  Number,
  Date,
}

impl DataKind {
  /// The discriminant string stored in the `data_kind` column.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Text => "text",
      Self::Boolean => "boolean",
      Self::Number => "number",
      Self::Date => "date",
    }
  }
}

/// A catalog entry describing one optional fact that may be recorded about a
/// person. Seeded at startup; nothing in the service mutates the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
  pub definition_id: Uuid,
  pub name:          String,
  pub description:   Option<String>,
  pub data_kind:     DataKind,
  pub required:      bool,
  pub active:        bool,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::PersonStore::add_attribute_definition`].
/// The store assigns the id and `created_at`.
#[derive(Debug, Clone)]
pub struct NewAttributeDefinition {
  pub name:        String,
  pub description: Option<String>,
  pub data_kind:   DataKind,
  pub required:    bool,
  pub active:      bool,
}

/// One normalised attribute assignment for one person. Owned by the person
/// row and cascade-deleted with it. The definition is eager-loaded on every
/// read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValue {
  pub value_id:    Uuid,
  pub person_id:   Uuid,
  pub definition:  AttributeDefinition,
  /// Always text, regardless of the definition's data kind; interpretation
  /// is the consumer's responsibility.
  pub value:       String,
  pub created_at:  DateTime<Utc>,
  pub modified_at: Option<DateTime<Utc>>,
}
