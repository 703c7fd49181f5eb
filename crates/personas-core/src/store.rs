//! The `PersonStore` trait and the persistence contract it expresses.
//!
//! The trait is implemented by storage backends (e.g.
//! `personas-store-sqlite`). The service layer depends on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  attribute::{AttributeDefinition, AttributeValue, NewAttributeDefinition},
  person::{NewPerson, Person, SearchFilter},
};

/// Abstraction over a Personas storage backend.
///
/// Pure data access: field validation and the uniqueness pre-check live in
/// the service. The backend's UNIQUE index on `identification` is the final
/// backstop under concurrent writes; a violation must convert into
/// [`crate::Error::Conflict`] through the `Into` bound on `Error` below.
///
/// Every read that returns a [`Person`] eagerly includes its attribute
/// values and each value's definition. This is a hard contract, not an
/// optimisation choice: the DTO projection reads those nested fields
/// unconditionally.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Persons ───────────────────────────────────────────────────────────

  /// All persons, most-recent-first.
  fn get_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Retrieve one person by id. Returns `None` if not found.
  fn get_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Retrieve one person by identification. Returns `None` if not found.
  fn get_by_identification<'a>(
    &'a self,
    identification: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Filtered search; absent filter fields are not applied.
  fn search<'a>(
    &'a self,
    filter: &'a SearchFilter,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// Persist a new person. The store assigns the id and `created_at`.
  fn insert(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Overwrite the mutable fields of an existing person. The store sets
  /// `modified_at` and returns the updated record.
  fn replace(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Remove a person; its attribute values go with it (cascade).
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// True iff some person other than `exclude_id` holds `identification`.
  fn exists_by_identification<'a>(
    &'a self,
    identification: &'a str,
    exclude_id: Option<Uuid>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Attribute catalog ─────────────────────────────────────────────────

  fn list_attribute_definitions(
    &self,
  ) -> impl Future<Output = Result<Vec<AttributeDefinition>, Self::Error>> + Send + '_;

  /// Register a catalog entry. Used by seeding; no HTTP operation mutates
  /// the catalog.
  fn add_attribute_definition(
    &self,
    input: NewAttributeDefinition,
  ) -> impl Future<Output = Result<AttributeDefinition, Self::Error>> + Send + '_;

  /// Attach a normalised attribute value to a person. Used by seeding and
  /// tests; create/update never write the normalised side.
  fn add_attribute_value<'a>(
    &'a self,
    person_id: Uuid,
    definition_id: Uuid,
    value: &'a str,
  ) -> impl Future<Output = Result<AttributeValue, Self::Error>> + Send + 'a;
}
