//! SQL schema for the Personas SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS persons (
    person_id        TEXT PRIMARY KEY,
    full_name        TEXT NOT NULL,
    identification   TEXT NOT NULL,
    age              INTEGER NOT NULL,
    gender           TEXT NOT NULL,
    status           TEXT NOT NULL DEFAULT 'Active',
    extra_attributes TEXT NOT NULL DEFAULT '{}',  -- JSON object document
    created_at       TEXT NOT NULL,               -- ISO 8601 UTC
    modified_at      TEXT                         -- NULL until first update
);

-- The service pre-checks identification uniqueness for a friendlier
-- message; this index is the authoritative backstop under races.
CREATE UNIQUE INDEX IF NOT EXISTS persons_identification_idx
    ON persons(identification);

CREATE TABLE IF NOT EXISTS attribute_definitions (
    definition_id TEXT PRIMARY KEY,
    name          TEXT NOT NULL UNIQUE,
    description   TEXT,
    data_kind     TEXT NOT NULL DEFAULT 'text',  -- text|boolean|number|date
    required      INTEGER NOT NULL DEFAULT 0,
    active        INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attribute_values (
    value_id      TEXT PRIMARY KEY,
    person_id     TEXT NOT NULL REFERENCES persons(person_id)
                      ON DELETE CASCADE,
    definition_id TEXT NOT NULL REFERENCES attribute_definitions(definition_id)
                      ON DELETE CASCADE,
    value         TEXT NOT NULL,                 -- always text
    created_at    TEXT NOT NULL,
    modified_at   TEXT
);

CREATE INDEX IF NOT EXISTS attribute_values_person_idx
    ON attribute_values(person_id);

PRAGMA user_version = 1;
";
