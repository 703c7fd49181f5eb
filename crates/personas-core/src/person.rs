//! Person — the core managed record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::attribute::AttributeValue;

/// Status assigned when a draft omits one (or supplies an empty string).
pub const DEFAULT_STATUS: &str = "Active";

/// The core record.
///
/// `extra_attributes_json` and `attributes` are two independent channels for
/// "extra facts about this person": create and update rewrite the JSON
/// document and never touch the normalised rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub person_id:      Uuid,
  pub full_name:      String,
  /// Globally unique across all persons.
  pub identification: String,
  pub age:            u32,
  pub gender:         String,
  pub status:         String,
  /// A JSON object document. Readers must tolerate corrupt content by
  /// falling back to `{}`.
  pub extra_attributes_json: String,
  pub created_at:     DateTime<Utc>,
  /// `None` until the first update; store-assigned on every mutation after.
  pub modified_at:    Option<DateTime<Utc>>,
  pub attributes:     Vec<AttributeValue>,
}

/// Caller-supplied fields for create and update, straight off the wire.
/// Validated by [`crate::service::PersonService`] before touching the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDraft {
  pub full_name:      String,
  pub identification: String,
  pub age:            u32,
  pub gender:         String,
  #[serde(default)]
  pub status:         Option<String>,
  #[serde(default)]
  pub extra_attributes: Option<Map<String, Value>>,
}

/// A validated draft ready for insertion. The store assigns the id and
/// `created_at`; a fresh person carries no attribute values.
#[derive(Debug, Clone)]
pub struct NewPerson {
  pub full_name:      String,
  pub identification: String,
  pub age:            u32,
  pub gender:         String,
  pub status:         String,
  pub extra_attributes_json: String,
}

/// Conjunction of optional filters for [`crate::store::PersonStore::search`].
/// Absent fields are not applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
  /// Substring match on the full name.
  pub name:    Option<String>,
  /// Exact status match.
  pub status:  Option<String>,
  /// Inclusive lower age bound.
  pub min_age: Option<u32>,
  /// Inclusive upper age bound.
  pub max_age: Option<u32>,
  /// Accepted for wire compatibility; paging is not applied server-side.
  pub page_number: Option<u32>,
  /// Accepted for wire compatibility; paging is not applied server-side.
  pub page_size:   Option<u32>,
}
