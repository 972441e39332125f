//! Lookups that back the domain rules, run inside write transactions.
//!
//! Participations and outcomes share one pipeline, parameterised by an
//! [`EntryTable`] describing where the records and their parents live.

use podium_core::{
  Error,
  activity,
  entry::{Identity, Participant},
  kind::{KindCategory, KindRelation},
  person::{AccountDirectory, Person},
  validate,
};
use rusqlite::{Connection, OptionalExtension as _};
use uuid::Uuid;

use crate::{
  encode::{PERSON_COLUMNS, encode_uuid, kind_table, opt_uuid_at, person_from_row, qualified,
           relation_table, uuid_at},
  txn::TxResult,
};

// ─── Entry tables ────────────────────────────────────────────────────────────

/// Where a family of participant records and their parents are stored.
pub(crate) struct EntryTable {
  pub table:         &'static str,
  pub entity:        &'static str,
  pub id_col:        &'static str,
  /// Same column name in the parent table and in `table`.
  pub parent_col:    &'static str,
  pub parent_table:  &'static str,
  pub parent_entity: &'static str,
  pub relation:      KindRelation,
}

pub(crate) const PARTICIPATIONS: EntryTable = EntryTable {
  table:         "participations",
  entity:        "participation",
  id_col:        "participation_id",
  parent_col:    "event_id",
  parent_table:  "events",
  parent_entity: "event",
  relation:      KindRelation::EventParticipation,
};

pub(crate) const OUTCOMES: EntryTable = EntryTable {
  table:         "outcomes",
  entity:        "outcome",
  id_col:        "outcome_id",
  parent_col:    "competition_id",
  parent_table:  "competitions",
  parent_entity: "competition",
  relation:      KindRelation::CompetitionOutcome,
};

/// Kind permission and duplicate-participant checks for a record about to be
/// written under `parent_id`. `exclude` is the record being updated, if any.
///
/// The caller has already run [`Participant::validate`].
pub(crate) fn check_entry(
  conn: &Connection,
  table: &EntryTable,
  participant: &Participant,
  parent_id: Uuid,
  kind_id: Uuid,
  exclude: Option<Uuid>,
  directory: &dyn AccountDirectory,
) -> TxResult<()> {
  let parent_kind: Option<Uuid> = conn
    .query_row(
      &format!(
        "SELECT kind_id FROM {} WHERE {} = ?1",
        table.parent_table, table.parent_col
      ),
      rusqlite::params![encode_uuid(parent_id)],
      |r| opt_uuid_at(r, 0),
    )
    .optional()?
    .ok_or_else(|| Error::not_found(table.parent_entity, parent_id))?;

  let permitted = match parent_kind {
    Some(k) => Some(permitted_ids(conn, table.relation, k)?),
    None => None,
  };
  validate::kind_permitted(kind_id, parent_id, permitted.as_deref())?;

  let person = match participant.person_id {
    Some(id) => Some(load_person(conn, id)?.ok_or_else(|| Error::not_found("person", id))?),
    None => None,
  };
  let candidate = Identity::from_parts(person, participant.literal_name.clone())?;
  let siblings = sibling_identities(conn, table, parent_id, exclude)?;
  validate::unique_participant(&candidate, &siblings, parent_id, directory)?;
  Ok(())
}

/// Identities of every record under `parent_id` except `exclude`.
fn sibling_identities(
  conn: &Connection,
  table: &EntryTable,
  parent_id: Uuid,
  exclude: Option<Uuid>,
) -> rusqlite::Result<Vec<Identity>> {
  let sql = format!(
    "SELECT {person_cols}, e.literal_name
     FROM {table} e
     LEFT JOIN persons p ON p.person_id = e.person_id
     WHERE e.{parent} = ?1
       AND (?2 IS NULL OR e.{id} != ?2)",
    person_cols = qualified("p", PERSON_COLUMNS),
    table = table.table,
    parent = table.parent_col,
    id = table.id_col,
  );
  let mut stmt = conn.prepare(&sql)?;
  stmt
    .query_map(
      rusqlite::params![encode_uuid(parent_id), exclude.map(encode_uuid)],
      |row| {
        let person = match opt_uuid_at(row, 0)? {
          Some(_) => Some(person_from_row(row)?),
          None => None,
        };
        let literal: Option<String> = row.get(3)?;
        // The CHECK constraint rules out rows with both parts.
        Ok(Identity::from_parts(person, literal).unwrap_or(Identity::Unset))
      },
    )?
    .collect()
}

/// `(entry id, parent id)` of every record linked to `person_id`.
pub(crate) fn entries_of_person(
  conn: &Connection,
  table: &EntryTable,
  person_id: Uuid,
) -> rusqlite::Result<Vec<(Uuid, Uuid)>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {}, {} FROM {} WHERE person_id = ?1",
    table.id_col, table.parent_col, table.table
  ))?;
  stmt
    .query_map(rusqlite::params![encode_uuid(person_id)], |r| {
      Ok((uuid_at(r, 0)?, uuid_at(r, 1)?))
    })?
    .collect()
}

/// Whether `name` may become the literal name of record `id` under
/// `parent_id`: within the field limit and unused by its siblings.
pub(crate) fn literal_fits(
  conn: &Connection,
  table: &EntryTable,
  id: Uuid,
  parent_id: Uuid,
  name: &str,
  directory: &dyn AccountDirectory,
) -> rusqlite::Result<bool> {
  let participant = Participant::literal(name).normalized();
  let Some(literal) = participant.literal_name.clone() else {
    return Ok(false);
  };
  if participant.validate().is_err() {
    return Ok(false);
  }
  let siblings = sibling_identities(conn, table, parent_id, Some(id))?;
  Ok(
    validate::unique_participant(&Identity::Literal(literal), &siblings, parent_id, directory)
      .is_ok(),
  )
}

/// The identity of a stored record, for name resolution.
pub(crate) fn entry_identity(
  conn: &Connection,
  table: &EntryTable,
  id: Uuid,
) -> rusqlite::Result<Option<Identity>> {
  let sql = format!(
    "SELECT {person_cols}, e.literal_name
     FROM {table} e
     LEFT JOIN persons p ON p.person_id = e.person_id
     WHERE e.{id_col} = ?1",
    person_cols = qualified("p", PERSON_COLUMNS),
    table = table.table,
    id_col = table.id_col,
  );
  conn
    .query_row(&sql, rusqlite::params![encode_uuid(id)], |row| {
      let person = match opt_uuid_at(row, 0)? {
        Some(_) => Some(person_from_row(row)?),
        None => None,
      };
      let literal: Option<String> = row.get(3)?;
      Ok(Identity::from_parts(person, literal).unwrap_or(Identity::Unset))
    })
    .optional()
}

// ─── Kinds ───────────────────────────────────────────────────────────────────

pub(crate) fn permitted_ids(
  conn: &Connection,
  relation: KindRelation,
  parent: Uuid,
) -> rusqlite::Result<Vec<Uuid>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT child_id FROM {} WHERE parent_id = ?1",
    relation_table(relation)
  ))?;
  stmt
    .query_map(rusqlite::params![encode_uuid(parent)], |r| uuid_at(r, 0))?
    .collect()
}

fn kind_exists(conn: &Connection, category: KindCategory, id: Uuid) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        &format!("SELECT 1 FROM {} WHERE kind_id = ?1", kind_table(category)),
        rusqlite::params![encode_uuid(id)],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// Fail unless `id` is a kind of `expected`. A kind of another category is
/// reported as a mismatch rather than as missing.
pub(crate) fn require_kind(conn: &Connection, expected: KindCategory, id: Uuid) -> TxResult<()> {
  if kind_exists(conn, expected, id)? {
    return Ok(());
  }
  for found in KindCategory::ALL {
    if found != expected && kind_exists(conn, found, id)? {
      return Err(Error::KindCategoryMismatch { expected, found }.into());
    }
  }
  Err(Error::not_found(expected.as_str(), id).into())
}

/// Number of rows whose kind column points at `id`. Tags are never referenced.
pub(crate) fn kind_references(
  conn: &Connection,
  category: KindCategory,
  id: Uuid,
) -> rusqlite::Result<i64> {
  let tables: &[&str] = match category {
    KindCategory::Event => &["events"],
    KindCategory::Competition => &["competitions"],
    KindCategory::Participation => &["participations"],
    KindCategory::Outcome => &["outcomes"],
    KindCategory::Tag => &[],
  };
  let mut total = 0;
  for t in tables {
    let n: i64 = conn.query_row(
      &format!("SELECT COUNT(*) FROM {t} WHERE kind_id = ?1"),
      rusqlite::params![encode_uuid(id)],
      |r| r.get(0),
    )?;
    total += n;
  }
  Ok(total)
}

// ─── Persons, events, competitions ───────────────────────────────────────────

pub(crate) fn load_person(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<Person>> {
  conn
    .query_row(
      &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE person_id = ?1"),
      rusqlite::params![encode_uuid(id)],
      person_from_row,
    )
    .optional()
}

pub(crate) fn row_exists(conn: &Connection, table: &str, id_col: &str, id: Uuid) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        &format!("SELECT 1 FROM {table} WHERE {id_col} = ?1"),
        rusqlite::params![encode_uuid(id)],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

pub(crate) fn require_event(conn: &Connection, id: Uuid) -> TxResult<()> {
  if !row_exists(conn, "events", "event_id", id)? {
    return Err(Error::not_found("event", id).into());
  }
  Ok(())
}

pub(crate) fn require_competition(conn: &Connection, id: Uuid) -> TxResult<()> {
  if !row_exists(conn, "competitions", "competition_id", id)? {
    return Err(Error::not_found("competition", id).into());
  }
  Ok(())
}

/// The parent link of a competition; `None` for roots and unknown ids.
pub(crate) fn parent_of(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<Uuid>> {
  Ok(
    conn
      .query_row(
        "SELECT parent_competition_id FROM competitions WHERE competition_id = ?1",
        rusqlite::params![encode_uuid(id)],
        |r| opt_uuid_at(r, 0),
      )
      .optional()?
      .flatten(),
  )
}

/// Reference checks for a competition about to be written as `id`.
pub(crate) fn check_competition_links(
  conn: &Connection,
  id: Uuid,
  kind_id: Option<Uuid>,
  parent_id: Option<Uuid>,
  event_id: Option<Uuid>,
) -> TxResult<()> {
  if let Some(k) = kind_id {
    require_kind(conn, KindCategory::Competition, k)?;
  }
  if let Some(e) = event_id {
    require_event(conn, e)?;
  }
  if let Some(parent) = parent_id {
    if parent != id {
      require_competition(conn, parent)?;
    }
    if activity::would_cycle(id, parent, |c| parent_of(conn, c))? {
      return Err(Error::CompetitionCycle { competition_id: id, parent_id: parent }.into());
    }
  }
  Ok(())
}
