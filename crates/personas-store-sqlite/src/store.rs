//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use personas_core::{
  attribute::{AttributeDefinition, AttributeValue, NewAttributeDefinition},
  person::{NewPerson, Person, SearchFilter},
  store::PersonStore,
};

use crate::{
  Error, Result,
  encode::{
    RawAttributeValue, RawDefinition, RawPerson, encode_data_kind, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
};

const PERSON_COLS: &str = "person_id, full_name, identification, age, \
                           gender, status, extra_attributes, created_at, \
                           modified_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Personas store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch persons matching `where_clause` (with `binds` already in `?`
  /// order) together with their attribute-value graph, in one round trip to
  /// the connection thread.
  async fn query_persons(
    &self,
    where_clause: String,
    binds: Vec<Box<dyn rusqlite::ToSql + Send>>,
  ) -> Result<Vec<Person>> {
    let (raw_persons, raw_values) = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PERSON_COLS} FROM persons {where_clause} \
           ORDER BY created_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let persons = stmt
          .query_map(
            rusqlite::params_from_iter(binds.iter().map(|b| b.as_ref())),
            person_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let values = query_attribute_rows(conn, None)?;
        Ok((persons, values))
      })
      .await?;

    attach_values(raw_persons, raw_values)
  }
}

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn person_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
  Ok(RawPerson {
    person_id:        row.get(0)?,
    full_name:        row.get(1)?,
    identification:   row.get(2)?,
    age:              row.get(3)?,
    gender:           row.get(4)?,
    status:           row.get(5)?,
    extra_attributes: row.get(6)?,
    created_at:       row.get(7)?,
    modified_at:      row.get(8)?,
  })
}

fn attribute_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawAttributeValue> {
  Ok(RawAttributeValue {
    value_id:              row.get(0)?,
    person_id:             row.get(1)?,
    value:                 row.get(2)?,
    created_at:            row.get(3)?,
    modified_at:           row.get(4)?,
    definition_id:         row.get(5)?,
    name:                  row.get(6)?,
    description:           row.get(7)?,
    data_kind:             row.get(8)?,
    required:              row.get(9)?,
    active:                row.get(10)?,
    definition_created_at: row.get(11)?,
  })
}

fn definition_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawDefinition> {
  Ok(RawDefinition {
    definition_id: row.get(0)?,
    name:          row.get(1)?,
    description:   row.get(2)?,
    data_kind:     row.get(3)?,
    required:      row.get(4)?,
    active:        row.get(5)?,
    created_at:    row.get(6)?,
  })
}

/// Attribute values joined with their definitions, optionally restricted to
/// one person. Runs on the connection thread.
fn query_attribute_rows(
  conn: &rusqlite::Connection,
  person_id: Option<&str>,
) -> rusqlite::Result<Vec<RawAttributeValue>> {
  const COLS: &str = "av.value_id, av.person_id, av.value, av.created_at, \
                      av.modified_at, ad.definition_id, ad.name, \
                      ad.description, ad.data_kind, ad.required, ad.active, \
                      ad.created_at";
  const JOIN: &str = "FROM attribute_values av \
                      JOIN attribute_definitions ad \
                        ON ad.definition_id = av.definition_id";

  if let Some(id) = person_id {
    let mut stmt = conn.prepare(&format!(
      "SELECT {COLS} {JOIN} WHERE av.person_id = ?1"
    ))?;
    stmt
      .query_map(rusqlite::params![id], attribute_from_row)?
      .collect()
  } else {
    let mut stmt = conn.prepare(&format!("SELECT {COLS} {JOIN}"))?;
    stmt.query_map([], attribute_from_row)?.collect()
  }
}

/// Decode the joined rows and hang each person's values off its record.
fn attach_values(
  raw_persons: Vec<RawPerson>,
  raw_values: Vec<RawAttributeValue>,
) -> Result<Vec<Person>> {
  let mut by_person: HashMap<Uuid, Vec<AttributeValue>> = HashMap::new();
  for raw in raw_values {
    let value = raw.into_value()?;
    by_person.entry(value.person_id).or_default().push(value);
  }

  raw_persons
    .into_iter()
    .map(|raw| {
      let id = crate::encode::decode_uuid(&raw.person_id)?;
      raw.into_person(by_person.remove(&id).unwrap_or_default())
    })
    .collect()
}

/// Convert a UNIQUE-index violation on `persons.identification` into the
/// dedicated Conflict signal; every other error passes through.
fn map_conflict(err: tokio_rusqlite::Error, identification: &str) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    code,
    Some(msg),
  )) = &err
    && code.code == rusqlite::ErrorCode::ConstraintViolation
    && msg.contains("persons.identification")
  {
    return Error::IdentificationTaken(identification.to_owned());
  }
  Error::Database(err)
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = Error;

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn get_all(&self) -> Result<Vec<Person>> {
    self.query_persons(String::new(), Vec::new()).await
  }

  async fn get_by_id(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);
    let persons = self
      .query_persons(
        "WHERE person_id = ?".to_owned(),
        vec![Box::new(id_str)],
      )
      .await?;
    Ok(persons.into_iter().next())
  }

  async fn get_by_identification(
    &self,
    identification: &str,
  ) -> Result<Option<Person>> {
    let persons = self
      .query_persons(
        "WHERE identification = ?".to_owned(),
        vec![Box::new(identification.to_owned())],
      )
      .await?;
    Ok(persons.into_iter().next())
  }

  async fn search(&self, filter: &SearchFilter) -> Result<Vec<Person>> {
    let mut conds: Vec<&'static str> = Vec::new();
    let mut binds: Vec<Box<dyn rusqlite::ToSql + Send>> = Vec::new();

    if let Some(name) = filter.name.as_deref() {
      conds.push("full_name LIKE ?");
      binds.push(Box::new(format!("%{name}%")));
    }
    if let Some(status) = filter.status.as_deref() {
      conds.push("status = ?");
      binds.push(Box::new(status.to_owned()));
    }
    if let Some(min) = filter.min_age {
      conds.push("age >= ?");
      binds.push(Box::new(min));
    }
    if let Some(max) = filter.max_age {
      conds.push("age <= ?");
      binds.push(Box::new(max));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    self.query_persons(where_clause, binds).await
  }

  async fn insert(&self, input: NewPerson) -> Result<Person> {
    let person = Person {
      person_id:      Uuid::new_v4(),
      full_name:      input.full_name,
      identification: input.identification,
      age:            input.age,
      gender:         input.gender,
      status:         input.status,
      extra_attributes_json: input.extra_attributes_json,
      created_at:     Utc::now(),
      modified_at:    None,
      attributes:     Vec::new(),
    };

    let id_str         = encode_uuid(person.person_id);
    let full_name      = person.full_name.clone();
    let identification = person.identification.clone();
    let age            = person.age;
    let gender         = person.gender.clone();
    let status         = person.status.clone();
    let extra          = person.extra_attributes_json.clone();
    let created_at_str = encode_dt(person.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             person_id, full_name, identification, age, gender,
             status, extra_attributes, created_at, modified_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)",
          rusqlite::params![
            id_str,
            full_name,
            identification,
            age,
            gender,
            status,
            extra,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| map_conflict(e, &person.identification))?;

    Ok(person)
  }

  async fn replace(&self, mut person: Person) -> Result<Person> {
    person.modified_at = Some(Utc::now());

    let id_str         = encode_uuid(person.person_id);
    let full_name      = person.full_name.clone();
    let identification = person.identification.clone();
    let age            = person.age;
    let gender         = person.gender.clone();
    let status         = person.status.clone();
    let extra          = person.extra_attributes_json.clone();
    let modified_str   = person.modified_at.map(encode_dt);

    let affected = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE persons SET
             full_name = ?2, identification = ?3, age = ?4, gender = ?5,
             status = ?6, extra_attributes = ?7, modified_at = ?8
           WHERE person_id = ?1",
          rusqlite::params![
            id_str,
            full_name,
            identification,
            age,
            gender,
            status,
            extra,
            modified_str,
          ],
        )?;
        Ok(n)
      })
      .await
      .map_err(|e| map_conflict(e, &person.identification))?;

    if affected == 0 {
      return Err(Error::PersonNotFound(person.person_id));
    }
    Ok(person)
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let affected = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM persons WHERE person_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::PersonNotFound(id));
    }
    Ok(())
  }

  async fn exists_by_identification(
    &self,
    identification: &str,
    exclude_id: Option<Uuid>,
  ) -> Result<bool> {
    let ident   = identification.to_owned();
    let exclude = exclude_id.map(encode_uuid);

    let exists = self
      .conn
      .call(move |conn| {
        let found: Option<bool> = conn
          .query_row(
            "SELECT 1 FROM persons
             WHERE identification = ?1
               AND (?2 IS NULL OR person_id != ?2)",
            rusqlite::params![ident, exclude],
            |_| Ok(true),
          )
          .optional()?;
        Ok(found.unwrap_or(false))
      })
      .await?;

    Ok(exists)
  }

  // ── Attribute catalog ─────────────────────────────────────────────────────

  async fn list_attribute_definitions(&self) -> Result<Vec<AttributeDefinition>> {
    let raws: Vec<RawDefinition> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT definition_id, name, description, data_kind, required,
                  active, created_at
           FROM attribute_definitions
           ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], definition_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDefinition::into_definition).collect()
  }

  async fn add_attribute_definition(
    &self,
    input: NewAttributeDefinition,
  ) -> Result<AttributeDefinition> {
    let definition = AttributeDefinition {
      definition_id: Uuid::new_v4(),
      name:          input.name,
      description:   input.description,
      data_kind:     input.data_kind,
      required:      input.required,
      active:        input.active,
      created_at:    Utc::now(),
    };

    let id_str      = encode_uuid(definition.definition_id);
    let name        = definition.name.clone();
    let description = definition.description.clone();
    let kind_str    = encode_data_kind(definition.data_kind).to_owned();
    let required    = definition.required;
    let active      = definition.active;
    let at_str      = encode_dt(definition.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO attribute_definitions (
             definition_id, name, description, data_kind, required,
             active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            name,
            description,
            kind_str,
            required,
            active,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(definition)
  }

  async fn add_attribute_value(
    &self,
    person_id: Uuid,
    definition_id: Uuid,
    value: &str,
  ) -> Result<AttributeValue> {
    let value_id   = Uuid::new_v4();
    let created_at = Utc::now();

    let value_id_str   = encode_uuid(value_id);
    let person_id_str  = encode_uuid(person_id);
    let def_id_str     = encode_uuid(definition_id);
    let value_owned    = value.to_owned();
    let created_at_str = encode_dt(created_at);

    // Insert, then read the row back joined with its definition so the
    // eager-load contract holds for the returned value too.
    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO attribute_values (
             value_id, person_id, definition_id, value,
             created_at, modified_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
          rusqlite::params![
            value_id_str,
            person_id_str,
            def_id_str,
            value_owned,
            created_at_str,
          ],
        )?;

        let mut rows = query_attribute_rows(conn, Some(&person_id_str))?;
        rows.retain(|r| r.value_id == value_id_str);
        Ok(rows)
      })
      .await?;

    let raw = raw
      .into_iter()
      .next()
      .ok_or_else(|| Error::PersonNotFound(person_id))?;
    raw.into_value()
  }
}
