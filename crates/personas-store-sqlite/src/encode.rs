//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Data kinds use their lowercase discriminant.

use chrono::{DateTime, Utc};
use personas_core::{
  attribute::{AttributeDefinition, AttributeValue, DataKind},
  person::Person,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── DataKind ─────────────────────────────────────────────────────────────────

pub fn encode_data_kind(k: DataKind) -> &'static str { k.discriminant() }

pub fn decode_data_kind(s: &str) -> Result<DataKind> {
  match s {
    "text" => Ok(DataKind::Text),
    "boolean" => Ok(DataKind::Boolean),
    "number" => Ok(DataKind::Number),
    "date" => Ok(DataKind::Date),
    other => Err(Error::UnknownDataKind(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:        String,
  pub full_name:        String,
  pub identification:   String,
  pub age:              u32,
  pub gender:           String,
  pub status:           String,
  pub extra_attributes: String,
  pub created_at:       String,
  pub modified_at:      Option<String>,
}

impl RawPerson {
  /// Build the domain person. The caller attaches the attribute values it
  /// decoded from the joined rows.
  pub fn into_person(self, attributes: Vec<AttributeValue>) -> Result<Person> {
    Ok(Person {
      person_id:      decode_uuid(&self.person_id)?,
      full_name:      self.full_name,
      identification: self.identification,
      age:            self.age,
      gender:         self.gender,
      status:         self.status,
      extra_attributes_json: self.extra_attributes,
      created_at:     decode_dt(&self.created_at)?,
      modified_at:    self.modified_at.as_deref().map(decode_dt).transpose()?,
      attributes,
    })
  }
}

/// Raw strings from an `attribute_values` row joined with its definition.
pub struct RawAttributeValue {
  // attribute_values columns
  pub value_id:    String,
  pub person_id:   String,
  pub value:       String,
  pub created_at:  String,
  pub modified_at: Option<String>,
  // attribute_definitions join
  pub definition_id:         String,
  pub name:                  String,
  pub description:           Option<String>,
  pub data_kind:             String,
  pub required:              bool,
  pub active:                bool,
  pub definition_created_at: String,
}

impl RawAttributeValue {
  pub fn into_value(self) -> Result<AttributeValue> {
    Ok(AttributeValue {
      value_id:   decode_uuid(&self.value_id)?,
      person_id:  decode_uuid(&self.person_id)?,
      definition: AttributeDefinition {
        definition_id: decode_uuid(&self.definition_id)?,
        name:          self.name,
        description:   self.description,
        data_kind:     decode_data_kind(&self.data_kind)?,
        required:      self.required,
        active:        self.active,
        created_at:    decode_dt(&self.definition_created_at)?,
      },
      value:       self.value,
      created_at:  decode_dt(&self.created_at)?,
      modified_at: self.modified_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from an `attribute_definitions` row.
pub struct RawDefinition {
  pub definition_id: String,
  pub name:          String,
  pub description:   Option<String>,
  pub data_kind:     String,
  pub required:      bool,
  pub active:        bool,
  pub created_at:    String,
}

impl RawDefinition {
  pub fn into_definition(self) -> Result<AttributeDefinition> {
    Ok(AttributeDefinition {
      definition_id: decode_uuid(&self.definition_id)?,
      name:          self.name,
      description:   self.description,
      data_kind:     decode_data_kind(&self.data_kind)?,
      required:      self.required,
      active:        self.active,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
