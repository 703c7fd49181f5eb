//! Demo seed data: the attribute catalog plus two example persons.
//!
//! Runs at startup. A non-empty catalog means the database was already
//! seeded and the call is a no-op.

use personas_core::{
  attribute::{DataKind, NewAttributeDefinition},
  person::NewPerson,
  store::PersonStore as _,
};
use serde_json::json;

use crate::{Result, SqliteStore};

/// Returns `true` if data was inserted, `false` if already present.
pub async fn seed_demo_data(store: &SqliteStore) -> Result<bool> {
  if !store.list_attribute_definitions().await?.is_empty() {
    return Ok(false);
  }

  let catalog = [
    ("Drives", "Whether the person drives vehicles", DataKind::Boolean),
    (
      "Wears Glasses",
      "Whether the person wears corrective lenses",
      DataKind::Boolean,
    ),
    ("Diabetic", "Whether the person has diabetes", DataKind::Boolean),
    ("Blood Type", "The person's blood type", DataKind::Text),
  ];

  let mut definitions = Vec::new();
  for (name, description, data_kind) in catalog {
    definitions.push(
      store
        .add_attribute_definition(NewAttributeDefinition {
          name:        name.to_owned(),
          description: Some(description.to_owned()),
          data_kind,
          required:    false,
          active:      true,
        })
        .await?,
    );
  }
  let blood_type = &definitions[3];

  let juan = store
    .insert(NewPerson {
      full_name:      "Juan Pérez García".to_owned(),
      identification: "12345678".to_owned(),
      age:            35,
      gender:         "Masculino".to_owned(),
      status:         "Active".to_owned(),
      extra_attributes_json: json!({
        "Drives": true,
        "Wears Glasses": false,
        "Diabetic": false,
        "Blood Type": "O+",
      })
      .to_string(),
    })
    .await?;

  let maria = store
    .insert(NewPerson {
      full_name:      "María López Rodríguez".to_owned(),
      identification: "87654321".to_owned(),
      age:            28,
      gender:         "Femenino".to_owned(),
      status:         "Active".to_owned(),
      extra_attributes_json: json!({
        "Drives": true,
        "Wears Glasses": true,
        "Diabetic": true,
        "Blood Type": "A+",
      })
      .to_string(),
    })
    .await?;

  // Mirror the blood-type entries on the normalised side so the eager join
  // path carries data out of the box.
  store
    .add_attribute_value(juan.person_id, blood_type.definition_id, "O+")
    .await?;
  store
    .add_attribute_value(maria.person_id, blood_type.definition_id, "A+")
    .await?;

  Ok(true)
}
