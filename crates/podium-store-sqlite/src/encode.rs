//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as ISO 8601
//! `YYYY-MM-DD`, UUIDs as hyphenated lowercase strings. Decoding failures
//! surface as [`rusqlite::Error::FromSqlConversionFailure`] so row mappers
//! can use `?` throughout.

use chrono::{DateTime, NaiveDate, Utc};
use podium_core::{
  activity::{Competition, Event},
  entry::{Outcome, Participant, Participation},
  kind::{Kind, KindCategory, KindRelation},
  person::{AccountRef, Person},
};
use rusqlite::{Row, types::Type};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn conversion_failure(
  idx: usize,
  e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
  rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
  let s: String = row.get(idx)?;
  Uuid::parse_str(&s).map_err(|e| conversion_failure(idx, e))
}

pub fn opt_uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
  let s: Option<String> = row.get(idx)?;
  s.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_failure(idx, e)))
    .transpose()
}

// ─── DateTime<Utc> / NaiveDate ───────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn dt_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
  let s: String = row.get(idx)?;
  DateTime::parse_from_rfc3339(&s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| conversion_failure(idx, e))
}

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn opt_date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
  let s: Option<String> = row.get(idx)?;
  s.map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_failure(idx, e)))
    .transpose()
}

// ─── Table names ─────────────────────────────────────────────────────────────

pub fn kind_table(category: KindCategory) -> &'static str {
  match category {
    KindCategory::Event => "event_kinds",
    KindCategory::Competition => "competition_kinds",
    KindCategory::Participation => "participation_kinds",
    KindCategory::Outcome => "outcome_kinds",
    KindCategory::Tag => "tags",
  }
}

pub fn relation_table(relation: KindRelation) -> &'static str {
  match relation {
    KindRelation::EventParticipation => "event_kind_participation_kinds",
    KindRelation::CompetitionOutcome => "competition_kind_outcome_kinds",
  }
}

// ─── Row mappers ─────────────────────────────────────────────────────────────
//
// Each mapper expects the columns in the order of the matching `*_COLUMNS`
// constant.

pub const KIND_COLUMNS: &str = "kind_id, name, description";

pub fn kind_from_row(category: KindCategory, row: &Row<'_>) -> rusqlite::Result<Kind> {
  Ok(Kind {
    kind_id: uuid_at(row, 0)?,
    category,
    name: row.get(1)?,
    description: row.get(2)?,
  })
}

pub const PERSON_COLUMNS: &str = "person_id, account, created_at";

pub fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
  Ok(Person {
    person_id:  uuid_at(row, 0)?,
    account:    row.get::<_, Option<String>>(1)?.map(AccountRef),
    created_at: dt_at(row, 2)?,
  })
}

pub const EVENT_COLUMNS: &str = "event_id, name, kind_id, description, start_date, end_date";

pub fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
  Ok(Event {
    event_id:    uuid_at(row, 0)?,
    name:        row.get(1)?,
    kind_id:     opt_uuid_at(row, 2)?,
    description: row.get(3)?,
    start_date:  opt_date_at(row, 4)?,
    end_date:    opt_date_at(row, 5)?,
  })
}

pub const COMPETITION_COLUMNS: &str = "competition_id, name, kind_id, parent_competition_id, \
                                       description, date_label, event_id";

pub fn competition_from_row(row: &Row<'_>) -> rusqlite::Result<Competition> {
  Ok(Competition {
    competition_id:        uuid_at(row, 0)?,
    name:                  row.get(1)?,
    kind_id:               opt_uuid_at(row, 2)?,
    parent_competition_id: opt_uuid_at(row, 3)?,
    description:           row.get(4)?,
    date_label:            row.get(5)?,
    event_id:              opt_uuid_at(row, 6)?,
  })
}

pub const PARTICIPATION_COLUMNS: &str =
  "participation_id, person_id, literal_name, event_id, kind_id, advanced, created_at";

pub fn participation_from_row(row: &Row<'_>) -> rusqlite::Result<Participation> {
  Ok(Participation {
    participation_id: uuid_at(row, 0)?,
    participant:      Participant {
      person_id:    opt_uuid_at(row, 1)?,
      literal_name: row.get(2)?,
    },
    event_id:         uuid_at(row, 3)?,
    kind_id:          uuid_at(row, 4)?,
    advanced:         row.get(5)?,
    created_at:       dt_at(row, 6)?,
  })
}

pub const OUTCOME_COLUMNS: &str =
  "outcome_id, person_id, literal_name, competition_id, kind_id, created_at";

pub fn outcome_from_row(row: &Row<'_>) -> rusqlite::Result<Outcome> {
  Ok(Outcome {
    outcome_id:     uuid_at(row, 0)?,
    participant:    Participant {
      person_id:    opt_uuid_at(row, 1)?,
      literal_name: row.get(2)?,
    },
    competition_id: uuid_at(row, 3)?,
    kind_id:        uuid_at(row, 4)?,
    created_at:     dt_at(row, 5)?,
  })
}

/// Prefix every column of a `*_COLUMNS` list with a table alias.
pub fn qualified(alias: &str, columns: &str) -> String {
  columns
    .split(',')
    .map(|c| format!("{alias}.{}", c.trim()))
    .collect::<Vec<_>>()
    .join(", ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn qualified_prefixes_each_column() {
    assert_eq!(
      qualified("p", PERSON_COLUMNS),
      "p.person_id, p.account, p.created_at"
    );
  }

  #[test]
  fn dates_are_iso() {
    let d = NaiveDate::from_ymd_opt(2017, 3, 9).unwrap();
    assert_eq!(encode_date(d), "2017-03-09");
  }
}
