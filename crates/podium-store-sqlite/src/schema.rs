//! SQL schema for the Podium SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One table per kind category; identical shape.
CREATE TABLE IF NOT EXISTS event_kinds (
    kind_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS competition_kinds (
    kind_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS participation_kinds (
    kind_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS outcome_kinds (
    kind_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS tags (
    kind_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT ''
);

-- Permitted sets. Links never block deletion of either endpoint.
CREATE TABLE IF NOT EXISTS event_kind_participation_kinds (
    parent_id TEXT NOT NULL REFERENCES event_kinds(kind_id) ON DELETE CASCADE,
    child_id  TEXT NOT NULL REFERENCES participation_kinds(kind_id) ON DELETE CASCADE,
    PRIMARY KEY (parent_id, child_id)
);
CREATE TABLE IF NOT EXISTS competition_kind_outcome_kinds (
    parent_id TEXT NOT NULL REFERENCES competition_kinds(kind_id) ON DELETE CASCADE,
    child_id  TEXT NOT NULL REFERENCES outcome_kinds(kind_id) ON DELETE CASCADE,
    PRIMARY KEY (parent_id, child_id)
);

CREATE TABLE IF NOT EXISTS persons (
    person_id  TEXT PRIMARY KEY,
    account    TEXT UNIQUE,          -- external account reference
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    event_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    kind_id     TEXT REFERENCES event_kinds(kind_id) ON DELETE RESTRICT,
    description TEXT NOT NULL DEFAULT '',
    start_date  TEXT,                -- ISO 8601 date
    end_date    TEXT
);

CREATE TABLE IF NOT EXISTS competitions (
    competition_id        TEXT PRIMARY KEY,
    name                  TEXT NOT NULL,
    kind_id               TEXT REFERENCES competition_kinds(kind_id) ON DELETE RESTRICT,
    parent_competition_id TEXT REFERENCES competitions(competition_id) ON DELETE SET NULL,
    description           TEXT NOT NULL DEFAULT '',
    date_label            TEXT NOT NULL DEFAULT '',
    event_id              TEXT REFERENCES events(event_id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS participations (
    participation_id TEXT PRIMARY KEY,
    person_id        TEXT REFERENCES persons(person_id) ON DELETE CASCADE,
    literal_name     TEXT,
    event_id         TEXT NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
    kind_id          TEXT NOT NULL REFERENCES participation_kinds(kind_id) ON DELETE RESTRICT,
    advanced         INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL,
    UNIQUE (person_id, event_id),
    CHECK  (person_id IS NULL OR literal_name IS NULL)
);

CREATE TABLE IF NOT EXISTS outcomes (
    outcome_id     TEXT PRIMARY KEY,
    person_id      TEXT REFERENCES persons(person_id) ON DELETE CASCADE,
    literal_name   TEXT,
    competition_id TEXT NOT NULL REFERENCES competitions(competition_id) ON DELETE CASCADE,
    kind_id        TEXT NOT NULL REFERENCES outcome_kinds(kind_id) ON DELETE RESTRICT,
    created_at     TEXT NOT NULL,
    UNIQUE (person_id, competition_id),
    CHECK  (person_id IS NULL OR literal_name IS NULL)
);

CREATE INDEX IF NOT EXISTS competitions_parent_idx  ON competitions(parent_competition_id);
CREATE INDEX IF NOT EXISTS competitions_event_idx   ON competitions(event_id);
CREATE INDEX IF NOT EXISTS participations_event_idx ON participations(event_id);
CREATE INDEX IF NOT EXISTS outcomes_competition_idx ON outcomes(competition_id);

PRAGMA user_version = 1;
";
