//! Read-model projection — from stored [`Person`] to the external view.
//!
//! The projection is pure and idempotent: the same stored record always
//! yields the same view, and nothing here touches the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
  attribute::{AttributeValue, DataKind},
  person::Person,
};

/// Flat external view of one person. `extra_attributes` is the decoded JSON
/// document; `attribute_details` mirrors the normalised rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonView {
  pub id:              Uuid,
  pub full_name:       String,
  pub identification:  String,
  pub age:             u32,
  pub gender:          String,
  pub status:          String,
  pub created_at:      DateTime<Utc>,
  pub modified_at:     Option<DateTime<Utc>>,
  pub extra_attributes: Map<String, Value>,
  pub attribute_details: Vec<AttributeDetail>,
}

/// One projected attribute value with its catalog metadata inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDetail {
  pub id:                      Uuid,
  pub attribute_definition_id: Uuid,
  pub attribute_name:          String,
  pub data_kind:               DataKind,
  pub value:                   String,
  pub required:                bool,
}

/// Project a stored person into its external view.
pub fn project(person: &Person) -> PersonView {
  PersonView {
    id:              person.person_id,
    full_name:       person.full_name.clone(),
    identification:  person.identification.clone(),
    age:             person.age,
    gender:          person.gender.clone(),
    status:          person.status.clone(),
    created_at:      person.created_at,
    modified_at:     person.modified_at,
    extra_attributes: decode_extra_attributes(&person.extra_attributes_json),
    attribute_details: person.attributes.iter().map(detail).collect(),
  }
}

/// Decode the extra-attributes document, substituting an empty object for
/// corrupt content rather than failing the read.
pub fn decode_extra_attributes(raw: &str) -> Map<String, Value> {
  serde_json::from_str(raw).unwrap_or_default()
}

fn detail(value: &AttributeValue) -> AttributeDetail {
  AttributeDetail {
    id:                      value.value_id,
    attribute_definition_id: value.definition.definition_id,
    attribute_name:          value.definition.name.clone(),
    data_kind:               value.definition.data_kind,
    value:                   value.value.clone(),
    required:                value.definition.required,
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use serde_json::json;
  use uuid::Uuid;

  use super::*;
  use crate::attribute::AttributeDefinition;

  fn person_with_json(raw: &str) -> Person {
    Person {
      person_id:      Uuid::new_v4(),
      full_name:      "Juan Pérez García".into(),
      identification: "12345678".into(),
      age:            35,
      gender:         "Masculino".into(),
      status:         "Active".into(),
      extra_attributes_json: raw.into(),
      created_at:     Utc::now(),
      modified_at:    None,
      attributes:     Vec::new(),
    }
  }

  #[test]
  fn scalars_copied_and_json_decoded() {
    let person =
      person_with_json(r#"{"Drives": true, "Blood Type": "O+"}"#);
    let view = project(&person);

    assert_eq!(view.id, person.person_id);
    assert_eq!(view.full_name, "Juan Pérez García");
    assert_eq!(view.age, 35);
    assert_eq!(view.extra_attributes.get("Drives"), Some(&json!(true)));
    assert_eq!(
      view.extra_attributes.get("Blood Type"),
      Some(&json!("O+"))
    );
    assert!(view.attribute_details.is_empty());
  }

  #[test]
  fn corrupt_json_projects_as_empty_object() {
    let view = project(&person_with_json("definitely-not-json"));
    assert!(view.extra_attributes.is_empty());

    // A JSON array is not an object either.
    let view = project(&person_with_json("[1, 2, 3]"));
    assert!(view.extra_attributes.is_empty());
  }

  #[test]
  fn projection_is_idempotent() {
    let mut person = person_with_json(r#"{"Diabetic": false}"#);
    person.attributes.push(AttributeValue {
      value_id:    Uuid::new_v4(),
      person_id:   person.person_id,
      definition:  AttributeDefinition {
        definition_id: Uuid::new_v4(),
        name:          "Blood Type".into(),
        description:   None,
        data_kind:     DataKind::Text,
        required:      false,
        active:        true,
        created_at:    Utc::now(),
      },
      value:       "O+".into(),
      created_at:  Utc::now(),
      modified_at: None,
    });

    assert_eq!(project(&person), project(&person));
  }

  #[test]
  fn detail_follows_the_definition_reference() {
    let mut person = person_with_json("{}");
    let definition_id = Uuid::new_v4();
    person.attributes.push(AttributeValue {
      value_id:    Uuid::new_v4(),
      person_id:   person.person_id,
      definition:  AttributeDefinition {
        definition_id,
        name:       "Drives".into(),
        description: Some("Whether the person drives vehicles".into()),
        data_kind:  DataKind::Boolean,
        required:   false,
        active:     true,
        created_at: Utc::now(),
      },
      value:       "true".into(),
      created_at:  Utc::now(),
      modified_at: None,
    });

    let view = project(&person);
    assert_eq!(view.attribute_details.len(), 1);
    let d = &view.attribute_details[0];
    assert_eq!(d.attribute_definition_id, definition_id);
    assert_eq!(d.attribute_name, "Drives");
    assert_eq!(d.data_kind, DataKind::Boolean);
    assert_eq!(d.value, "true");
    assert!(!d.required);
  }
}
