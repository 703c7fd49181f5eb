//! `PersonService` — validation, uniqueness enforcement, and projection.
//!
//! Every operation is one logical unit of work against the backing store.
//! There is no caching and no cross-request state; the only cross-request
//! invariant is the global uniqueness of `identification`, pre-checked here
//! and backstopped by the store's UNIQUE index.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  error::{Error, FieldError, Result},
  person::{DEFAULT_STATUS, NewPerson, PersonDraft, SearchFilter},
  store::PersonStore,
  view::{self, PersonView},
};

const MAX_FULL_NAME: usize = 200;
const MAX_IDENTIFICATION: usize = 20;
const MAX_GENDER: usize = 10;
const MAX_STATUS: usize = 20;
const MIN_AGE: u32 = 1;
const MAX_AGE: u32 = 150;

/// The core service. Cheap to clone; the store is shared behind an [`Arc`].
pub struct PersonService<S> {
  store: Arc<S>,
}

impl<S> Clone for PersonService<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

/// Convert a backend error into the core taxonomy.
fn lift<E: Into<Error>>(err: E) -> Error { err.into() }

impl<S: PersonStore> PersonService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// All persons, most-recent-first.
  pub async fn list_all(&self) -> Result<Vec<PersonView>> {
    let persons = self.store.get_all().await.map_err(lift)?;
    Ok(persons.iter().map(view::project).collect())
  }

  /// One person, or `None` — "not found" is an absent result here, never an
  /// error.
  pub async fn get_by_id(&self, id: Uuid) -> Result<Option<PersonView>> {
    let person = self.store.get_by_id(id).await.map_err(lift)?;
    Ok(person.as_ref().map(view::project))
  }

  /// Validate, check uniqueness, persist. A freshly created person never
  /// carries attribute values.
  pub async fn create(&self, draft: PersonDraft) -> Result<PersonView> {
    let input = validate(draft)?;
    let taken = self
      .store
      .exists_by_identification(&input.identification, None)
      .await
      .map_err(lift)?;
    if taken {
      return Err(Error::Conflict { identification: input.identification });
    }

    let person = self.store.insert(input).await.map_err(lift)?;
    Ok(view::project(&person))
  }

  /// Overwrite the five mutable fields and the extra-attributes document.
  /// The normalised attribute rows are left untouched.
  pub async fn update(&self, id: Uuid, draft: PersonDraft) -> Result<PersonView> {
    let input = validate(draft)?;

    let mut person = self
      .store
      .get_by_id(id)
      .await
      .map_err(lift)?
      .ok_or(Error::NotFound(id))?;

    let taken = self
      .store
      .exists_by_identification(&input.identification, Some(id))
      .await
      .map_err(lift)?;
    if taken {
      return Err(Error::Conflict { identification: input.identification });
    }

    person.full_name = input.full_name;
    person.identification = input.identification;
    person.age = input.age;
    person.gender = input.gender;
    person.status = input.status;
    person.extra_attributes_json = input.extra_attributes_json;

    let person = self.store.replace(person).await.map_err(lift)?;
    Ok(view::project(&person))
  }

  /// Remove a person; attribute values cascade with it.
  pub async fn delete(&self, id: Uuid) -> Result<()> {
    if self.store.get_by_id(id).await.map_err(lift)?.is_none() {
      return Err(Error::NotFound(id));
    }
    self.store.delete(id).await.map_err(lift)
  }

  pub async fn search(&self, filter: &SearchFilter) -> Result<Vec<PersonView>> {
    let persons = self.store.search(filter).await.map_err(lift)?;
    Ok(persons.iter().map(view::project).collect())
  }

  /// True iff no person other than `exclude_id` holds `identification`.
  /// Pure read, no side effect.
  pub async fn is_identification_available(
    &self,
    identification: &str,
    exclude_id: Option<Uuid>,
  ) -> Result<bool> {
    let taken = self
      .store
      .exists_by_identification(identification, exclude_id)
      .await
      .map_err(lift)?;
    Ok(!taken)
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Check a draft against the declared field bounds, default the status, and
/// serialise the extra-attributes document.
fn validate(draft: PersonDraft) -> Result<NewPerson> {
  let mut errors = Vec::new();

  check_text(&mut errors, "fullName", &draft.full_name, MAX_FULL_NAME);
  check_text(
    &mut errors,
    "identification",
    &draft.identification,
    MAX_IDENTIFICATION,
  );
  check_text(&mut errors, "gender", &draft.gender, MAX_GENDER);

  if draft.age < MIN_AGE || draft.age > MAX_AGE {
    errors.push(FieldError {
      field:   "age",
      message: format!("must be between {MIN_AGE} and {MAX_AGE}"),
    });
  }

  let status = draft
    .status
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| DEFAULT_STATUS.to_owned());
  if status.chars().count() > MAX_STATUS {
    errors.push(FieldError {
      field:   "status",
      message: format!("must not exceed {MAX_STATUS} characters"),
    });
  }

  if !errors.is_empty() {
    return Err(Error::Validation(errors));
  }

  let extra = draft.extra_attributes.unwrap_or_default();
  Ok(NewPerson {
    full_name:      draft.full_name,
    identification: draft.identification,
    age:            draft.age,
    gender:         draft.gender,
    status,
    extra_attributes_json: serde_json::to_string(&extra)?,
  })
}

fn check_text(
  errors: &mut Vec<FieldError>,
  field: &'static str,
  value: &str,
  max: usize,
) {
  if value.is_empty() {
    errors.push(FieldError { field, message: "is required".to_owned() });
  } else if value.chars().count() > max {
    errors.push(FieldError {
      field,
      message: format!("must not exceed {max} characters"),
    });
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn draft() -> PersonDraft {
    PersonDraft {
      full_name:      "Ana Ruiz".into(),
      identification: "99900011".into(),
      age:            40,
      gender:         "Femenino".into(),
      status:         None,
      extra_attributes: None,
    }
  }

  #[test]
  fn valid_draft_defaults_status_and_extra_json() {
    let input = validate(draft()).unwrap();
    assert_eq!(input.status, DEFAULT_STATUS);
    assert_eq!(input.extra_attributes_json, "{}");
  }

  #[test]
  fn empty_status_also_defaults() {
    let mut d = draft();
    d.status = Some(String::new());
    assert_eq!(validate(d).unwrap().status, DEFAULT_STATUS);
  }

  #[test]
  fn extra_attributes_serialised_verbatim() {
    let mut d = draft();
    let mut map = serde_json::Map::new();
    map.insert("Blood Type".into(), json!("O+"));
    d.extra_attributes = Some(map);

    let input = validate(d).unwrap();
    let decoded: serde_json::Value =
      serde_json::from_str(&input.extra_attributes_json).unwrap();
    assert_eq!(decoded, json!({ "Blood Type": "O+" }));
  }

  #[test]
  fn age_out_of_range_is_rejected() {
    for age in [0u32, 151] {
      let mut d = draft();
      d.age = age;
      let err = validate(d).unwrap_err();
      let Error::Validation(fields) = err else {
        panic!("expected validation error")
      };
      assert!(fields.iter().any(|f| f.field == "age"));
    }
  }

  #[test]
  fn missing_and_oversized_fields_are_reported_per_field() {
    let mut d = draft();
    d.full_name = String::new();
    d.identification = "x".repeat(21);
    d.gender = "x".repeat(11);

    let Error::Validation(fields) = validate(d).unwrap_err() else {
      panic!("expected validation error")
    };
    let named: Vec<&str> = fields.iter().map(|f| f.field).collect();
    assert!(named.contains(&"fullName"));
    assert!(named.contains(&"identification"));
    assert!(named.contains(&"gender"));
  }

  #[test]
  fn oversized_status_is_rejected() {
    let mut d = draft();
    d.status = Some("x".repeat(21));
    assert!(matches!(validate(d), Err(Error::Validation(_))));
  }
}
