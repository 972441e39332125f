//! [`SqliteStore`], the SQLite implementation of [`PodiumStore`].

use std::{path::Path, sync::Arc, time::Duration};

use chrono::Utc;
use podium_core::{
  activity::{self, Competition, Event, NewCompetition, NewEvent},
  entry::{NewOutcome, NewParticipation, Outcome, Participation},
  kind::{Kind, KindCategory, KindRelation, NewKind},
  person::{AccountDirectory, AccountRef, Person, PersonDeletion, PersonRemoval},
  store::PodiumStore,
};
use rusqlite::{Connection, OptionalExtension as _, Row, Transaction};
use uuid::Uuid;

use crate::{
  Error, Result,
  config::StoreConfig,
  encode::{
    COMPETITION_COLUMNS, EVENT_COLUMNS, KIND_COLUMNS, OUTCOME_COLUMNS, PARTICIPATION_COLUMNS,
    PERSON_COLUMNS, competition_from_row, encode_date, encode_dt, encode_uuid, event_from_row,
    kind_from_row, kind_table, outcome_from_row, participation_from_row, person_from_row,
    qualified, relation_table,
  },
  rules::{self, EntryTable, OUTCOMES, PARTICIPATIONS},
  schema::SCHEMA,
  txn::{self, TxResult},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Podium store backed by a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn:            tokio_rusqlite::Connection,
  directory:       Arc<dyn AccountDirectory>,
  person_deletion: PersonDeletion,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with default settings.
  pub async fn open(
    path: impl AsRef<Path>,
    directory: Arc<dyn AccountDirectory>,
  ) -> Result<Self> {
    let config = StoreConfig { path: path.as_ref().to_path_buf(), ..StoreConfig::default() };
    Self::open_with(&config, directory).await
  }

  /// Open (or create) the store described by `config`.
  pub async fn open_with(
    config: &StoreConfig,
    directory: Arc<dyn AccountDirectory>,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(&config.path).await?;
    let store = Self { conn, directory, person_deletion: config.person_deletion };
    store.init_schema(config.busy_timeout()).await?;
    tracing::info!(path = %config.path.display(), "opened podium store");
    Ok(store)
  }

  /// Open an empty in-memory store.
  pub async fn open_in_memory(directory: Arc<dyn AccountDirectory>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, directory, person_deletion: PersonDeletion::default() };
    store.init_schema(StoreConfig::default().busy_timeout()).await?;
    Ok(store)
  }

  /// Override the policy applied by [`PodiumStore::delete_person`].
  pub fn with_person_deletion(mut self, policy: PersonDeletion) -> Self {
    self.person_deletion = policy;
    self
  }

  async fn init_schema(&self, busy_timeout: Duration) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `body` against the connection outside any explicit transaction.
  async fn read<T, F>(&self, body: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
  {
    Ok(self.conn.call(move |conn| Ok(body(conn)?)).await?)
  }

  /// Run `body` in an immediate write transaction. `op` labels log lines.
  async fn write<T, F>(&self, op: &'static str, body: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> TxResult<T> + Send + 'static,
  {
    let result = self
      .conn
      .call(move |conn| txn::immediate(conn, body))
      .await
      .map_err(Error::from_write);

    match result {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(rule)) => {
        tracing::warn!(op, error = %rule, "write rejected");
        Err(rule.into())
      }
      Err(e) => {
        if e.is_retryable() {
          tracing::warn!(op, error = %e, "write lost a race");
        }
        Err(e)
      }
    }
  }

  async fn fetch_one<T, F>(&self, sql: String, id: Uuid, map: F) -> Result<Option<T>>
  where
    T: Send + 'static,
    F: Fn(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    let id = encode_uuid(id);
    self
      .read(move |conn| conn.query_row(&sql, rusqlite::params![id], |r| map(r)).optional())
      .await
  }

  async fn fetch_all<T, F>(&self, sql: String, arg: Option<Uuid>, map: F) -> Result<Vec<T>>
  where
    T: Send + 'static,
    F: Fn(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    let arg = arg.map(encode_uuid);
    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows: rusqlite::Result<Vec<T>> = match arg {
          Some(a) => stmt.query_map(rusqlite::params![a], |r| map(r))?.collect(),
          None => stmt.query_map([], |r| map(r))?.collect(),
        };
        rows
      })
      .await
  }

  /// `NotFound` unless a row with `id` exists in `table`.
  async fn ensure_exists(
    &self,
    entity: &'static str,
    table: &'static str,
    id_col: &'static str,
    id: Uuid,
  ) -> Result<()> {
    if self.read(move |conn| rules::row_exists(conn, table, id_col, id)).await? {
      Ok(())
    } else {
      Err(podium_core::Error::not_found(entity, id).into())
    }
  }

  /// Effective name of a participation or outcome.
  async fn entry_name(&self, table: &'static EntryTable, id: Uuid) -> Result<Option<String>> {
    let identity = self
      .read(move |conn| rules::entry_identity(conn, table, id))
      .await?
      .ok_or_else(|| podium_core::Error::not_found(table.entity, id))?;
    Ok(identity.effective_name(self.directory.as_ref())?)
  }

  async fn delete_row(
    &self,
    op: &'static str,
    entity: &'static str,
    table: &'static str,
    id_col: &'static str,
    id: Uuid,
  ) -> Result<()> {
    self
      .write(op, move |tx| {
        let n = tx.execute(
          &format!("DELETE FROM {table} WHERE {id_col} = ?1"),
          rusqlite::params![encode_uuid(id)],
        )?;
        if n == 0 {
          return Err(podium_core::Error::not_found(entity, id).into());
        }
        Ok(())
      })
      .await?;
    tracing::info!(%id, entity, "deleted");
    Ok(())
  }
}

// ─── Row writers ─────────────────────────────────────────────────────────────

fn insert_event(tx: &Transaction<'_>, e: &Event) -> rusqlite::Result<()> {
  tx.execute(
    "INSERT INTO events (event_id, name, kind_id, description, start_date, end_date)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      encode_uuid(e.event_id),
      e.name,
      e.kind_id.map(encode_uuid),
      e.description,
      e.start_date.map(encode_date),
      e.end_date.map(encode_date),
    ],
  )?;
  Ok(())
}

fn insert_competition(tx: &Transaction<'_>, c: &Competition) -> rusqlite::Result<()> {
  tx.execute(
    "INSERT INTO competitions (
       competition_id, name, kind_id, parent_competition_id,
       description, date_label, event_id
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      encode_uuid(c.competition_id),
      c.name,
      c.kind_id.map(encode_uuid),
      c.parent_competition_id.map(encode_uuid),
      c.description,
      c.date_label,
      c.event_id.map(encode_uuid),
    ],
  )?;
  Ok(())
}

// ─── PodiumStore impl ────────────────────────────────────────────────────────

impl PodiumStore for SqliteStore {
  type Error = Error;

  // ── Kinds ─────────────────────────────────────────────────────────────────

  async fn add_kind(&self, category: KindCategory, input: NewKind) -> Result<Kind> {
    input.validate()?;
    let kind = Kind {
      kind_id: Uuid::new_v4(),
      category,
      name: input.name,
      description: input.description,
    };

    let row = kind.clone();
    self
      .write("add_kind", move |tx| {
        ensure_kind_name_free(tx, category, &row.name, None)?;
        tx.execute(
          &format!(
            "INSERT INTO {} (kind_id, name, description) VALUES (?1, ?2, ?3)",
            kind_table(category)
          ),
          rusqlite::params![encode_uuid(row.kind_id), row.name, row.description],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(kind_id = %kind.kind_id, %category, name = %kind.name, "added kind");
    Ok(kind)
  }

  async fn get_kind(&self, category: KindCategory, id: Uuid) -> Result<Option<Kind>> {
    let sql = format!("SELECT {KIND_COLUMNS} FROM {} WHERE kind_id = ?1", kind_table(category));
    self.fetch_one(sql, id, move |r| kind_from_row(category, r)).await
  }

  async fn list_kinds(&self, category: KindCategory) -> Result<Vec<Kind>> {
    let sql = format!("SELECT {KIND_COLUMNS} FROM {} ORDER BY name", kind_table(category));
    self.fetch_all(sql, None, move |r| kind_from_row(category, r)).await
  }

  async fn update_kind(&self, category: KindCategory, id: Uuid, input: NewKind) -> Result<Kind> {
    input.validate()?;
    let kind = Kind { kind_id: id, category, name: input.name, description: input.description };

    let row = kind.clone();
    self
      .write("update_kind", move |tx| {
        ensure_kind_name_free(tx, category, &row.name, Some(id))?;
        let n = tx.execute(
          &format!(
            "UPDATE {} SET name = ?2, description = ?3 WHERE kind_id = ?1",
            kind_table(category)
          ),
          rusqlite::params![encode_uuid(id), row.name, row.description],
        )?;
        if n == 0 {
          return Err(podium_core::Error::not_found(category.as_str(), id).into());
        }
        Ok(())
      })
      .await?;

    tracing::debug!(kind_id = %id, %category, "updated kind");
    Ok(kind)
  }

  async fn delete_kind(&self, category: KindCategory, id: Uuid) -> Result<()> {
    self
      .write("delete_kind", move |tx| {
        if rules::kind_references(tx, category, id)? > 0 {
          return Err(podium_core::Error::KindInUse { category, kind_id: id }.into());
        }
        let n = tx.execute(
          &format!("DELETE FROM {} WHERE kind_id = ?1", kind_table(category)),
          rusqlite::params![encode_uuid(id)],
        )?;
        if n == 0 {
          return Err(podium_core::Error::not_found(category.as_str(), id).into());
        }
        Ok(())
      })
      .await?;

    tracing::info!(kind_id = %id, %category, "deleted kind");
    Ok(())
  }

  async fn permit(&self, relation: KindRelation, parent: Uuid, child: Uuid) -> Result<()> {
    self
      .write("permit", move |tx| {
        rules::require_kind(tx, relation.parent(), parent)?;
        rules::require_kind(tx, relation.child(), child)?;
        tx.execute(
          &format!(
            "INSERT OR IGNORE INTO {} (parent_id, child_id) VALUES (?1, ?2)",
            relation_table(relation)
          ),
          rusqlite::params![encode_uuid(parent), encode_uuid(child)],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(%parent, %child, ?relation, "permitted kind");
    Ok(())
  }

  async fn revoke(&self, relation: KindRelation, parent: Uuid, child: Uuid) -> Result<bool> {
    let removed = self
      .write("revoke", move |tx| {
        let n = tx.execute(
          &format!(
            "DELETE FROM {} WHERE parent_id = ?1 AND child_id = ?2",
            relation_table(relation)
          ),
          rusqlite::params![encode_uuid(parent), encode_uuid(child)],
        )?;
        Ok(n > 0)
      })
      .await?;

    tracing::debug!(%parent, %child, ?relation, removed, "revoked kind");
    Ok(removed)
  }

  async fn permitted(&self, relation: KindRelation, parent: Uuid) -> Result<Vec<Kind>> {
    let child = relation.child();
    let sql = format!(
      "SELECT {cols}
       FROM {kinds} k
       JOIN {links} l ON l.child_id = k.kind_id
       WHERE l.parent_id = ?1
       ORDER BY k.name",
      cols = qualified("k", KIND_COLUMNS),
      kinds = kind_table(child),
      links = relation_table(relation),
    );
    self.fetch_all(sql, Some(parent), move |r| kind_from_row(child, r)).await
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn add_person(&self, account: Option<AccountRef>) -> Result<Person> {
    let person = Person { person_id: Uuid::new_v4(), account, created_at: Utc::now() };

    let row = person.clone();
    self
      .write("add_person", move |tx| {
        if let Some(account) = &row.account {
          let taken = tx
            .query_row(
              "SELECT 1 FROM persons WHERE account = ?1",
              rusqlite::params![account.as_str()],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if taken {
            return Err(podium_core::Error::DuplicateAccount(account.clone()).into());
          }
        }
        tx.execute(
          "INSERT INTO persons (person_id, account, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![
            encode_uuid(row.person_id),
            row.account.as_ref().map(AccountRef::as_str),
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(person_id = %person.person_id, "added person");
    Ok(person)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    self.read(move |conn| rules::load_person(conn, id)).await
  }

  async fn list_persons(&self) -> Result<Vec<Person>> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM persons ORDER BY created_at, rowid");
    self.fetch_all(sql, None, person_from_row).await
  }

  async fn person_name(&self, id: Uuid) -> Result<String> {
    let person = self
      .get_person(id)
      .await?
      .ok_or_else(|| podium_core::Error::not_found("person", id))?;
    Ok(person.resolve_name(self.directory.as_ref())?)
  }

  async fn delete_person(&self, id: Uuid) -> Result<PersonRemoval> {
    let policy = self.person_deletion;
    let directory = self.directory.clone();

    let removal = self
      .write("delete_person", move |tx| {
        let person = rules::load_person(tx, id)?
          .ok_or_else(|| podium_core::Error::not_found("person", id))?;
        let person_id = encode_uuid(id);
        let mut removal = PersonRemoval::default();

        match policy {
          PersonDeletion::ConvertToLiteral => {
            // A name that cannot stand as a literal leaves the record
            // without identity.
            let name = person.resolve_name(directory.as_ref()).ok();
            for table in [&PARTICIPATIONS, &OUTCOMES] {
              for (entry, parent) in rules::entries_of_person(tx, table, id)? {
                let literal = match &name {
                  Some(n)
                    if rules::literal_fits(tx, table, entry, parent, n, directory.as_ref())? =>
                  {
                    Some(n.clone())
                  }
                  _ => None,
                };
                if literal.is_some() {
                  removal.converted += 1;
                } else {
                  removal.cleared += 1;
                }
                tx.execute(
                  &format!(
                    "UPDATE {} SET person_id = NULL, literal_name = ?2 WHERE {} = ?1",
                    table.table, table.id_col
                  ),
                  rusqlite::params![encode_uuid(entry), literal],
                )?;
              }
            }
          }
          PersonDeletion::Cascade => {
            for table in [&PARTICIPATIONS, &OUTCOMES] {
              let n: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE person_id = ?1", table.table),
                rusqlite::params![person_id],
                |r| r.get(0),
              )?;
              removal.deleted += n as usize;
            }
          }
        }

        tx.execute("DELETE FROM persons WHERE person_id = ?1", rusqlite::params![person_id])?;
        Ok(removal)
      })
      .await?;

    tracing::info!(
      person_id = %id,
      ?policy,
      converted = removal.converted,
      cleared = removal.cleared,
      deleted = removal.deleted,
      "deleted person"
    );
    Ok(removal)
  }

  async fn events_of_person(&self, id: Uuid) -> Result<Vec<Event>> {
    let sql = format!(
      "SELECT DISTINCT {cols}
       FROM events e
       JOIN participations p ON p.event_id = e.event_id
       WHERE p.person_id = ?1
       ORDER BY e.start_date, e.name",
      cols = qualified("e", EVENT_COLUMNS),
    );
    self.fetch_all(sql, Some(id), event_from_row).await
  }

  async fn competitions_of_person(&self, id: Uuid) -> Result<Vec<Competition>> {
    let sql = format!(
      "SELECT DISTINCT {cols}
       FROM competitions c
       JOIN outcomes o ON o.competition_id = c.competition_id
       WHERE o.person_id = ?1
       ORDER BY c.name",
      cols = qualified("c", COMPETITION_COLUMNS),
    );
    self.fetch_all(sql, Some(id), competition_from_row).await
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn add_event(&self, input: NewEvent) -> Result<Event> {
    input.validate()?;
    let event = input.into_event(Uuid::new_v4());

    let row = event.clone();
    self
      .write("add_event", move |tx| {
        if let Some(k) = row.kind_id {
          rules::require_kind(tx, KindCategory::Event, k)?;
        }
        insert_event(tx, &row)?;
        Ok(())
      })
      .await?;

    tracing::debug!(event_id = %event.event_id, name = %event.name, "added event");
    Ok(event)
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1");
    self.fetch_one(sql, id, event_from_row).await
  }

  async fn list_events(&self) -> Result<Vec<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY start_date, name");
    self.fetch_all(sql, None, event_from_row).await
  }

  async fn update_event(&self, id: Uuid, input: NewEvent) -> Result<Event> {
    input.validate()?;
    let event = input.into_event(id);

    let row = event.clone();
    self
      .write("update_event", move |tx| {
        rules::require_event(tx, id)?;
        if let Some(k) = row.kind_id {
          rules::require_kind(tx, KindCategory::Event, k)?;
        }
        tx.execute(
          "UPDATE events
           SET name = ?2, kind_id = ?3, description = ?4, start_date = ?5, end_date = ?6
           WHERE event_id = ?1",
          rusqlite::params![
            encode_uuid(id),
            row.name,
            row.kind_id.map(encode_uuid),
            row.description,
            row.start_date.map(encode_date),
            row.end_date.map(encode_date),
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(event_id = %id, "updated event");
    Ok(event)
  }

  async fn delete_event(&self, id: Uuid) -> Result<()> {
    self.delete_row("delete_event", "event", "events", "event_id", id).await
  }

  // ── Competitions ──────────────────────────────────────────────────────────

  async fn add_competition(&self, input: NewCompetition) -> Result<Competition> {
    input.validate()?;
    let competition = input.into_competition(Uuid::new_v4());

    let row = competition.clone();
    self
      .write("add_competition", move |tx| {
        rules::check_competition_links(
          tx,
          row.competition_id,
          row.kind_id,
          row.parent_competition_id,
          row.event_id,
        )?;
        insert_competition(tx, &row)?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      competition_id = %competition.competition_id,
      name = %competition.name,
      "added competition"
    );
    Ok(competition)
  }

  async fn get_competition(&self, id: Uuid) -> Result<Option<Competition>> {
    let sql = format!("SELECT {COMPETITION_COLUMNS} FROM competitions WHERE competition_id = ?1");
    self.fetch_one(sql, id, competition_from_row).await
  }

  async fn list_competitions(&self) -> Result<Vec<Competition>> {
    let sql = format!("SELECT {COMPETITION_COLUMNS} FROM competitions ORDER BY name");
    self.fetch_all(sql, None, competition_from_row).await
  }

  async fn update_competition(&self, id: Uuid, input: NewCompetition) -> Result<Competition> {
    input.validate()?;
    let competition = input.into_competition(id);

    let row = competition.clone();
    self
      .write("update_competition", move |tx| {
        rules::require_competition(tx, id)?;
        rules::check_competition_links(
          tx,
          id,
          row.kind_id,
          row.parent_competition_id,
          row.event_id,
        )?;
        tx.execute(
          "UPDATE competitions
           SET name = ?2, kind_id = ?3, parent_competition_id = ?4,
               description = ?5, date_label = ?6, event_id = ?7
           WHERE competition_id = ?1",
          rusqlite::params![
            encode_uuid(id),
            row.name,
            row.kind_id.map(encode_uuid),
            row.parent_competition_id.map(encode_uuid),
            row.description,
            row.date_label,
            row.event_id.map(encode_uuid),
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(competition_id = %id, "updated competition");
    Ok(competition)
  }

  async fn delete_competition(&self, id: Uuid) -> Result<()> {
    self
      .delete_row("delete_competition", "competition", "competitions", "competition_id", id)
      .await
  }

  async fn ancestors(&self, id: Uuid) -> Result<Vec<Competition>> {
    let sql = format!("SELECT {COMPETITION_COLUMNS} FROM competitions WHERE competition_id = ?1");
    self
      .read(move |conn| {
        if !rules::row_exists(conn, "competitions", "competition_id", id)? {
          return Ok(None);
        }
        let first = rules::parent_of(conn, id)?;
        let chain = activity::ancestry(first, |c| rules::parent_of(conn, c))?;
        let mut stmt = conn.prepare(&sql)?;
        let mut out = Vec::with_capacity(chain.len());
        for c in chain {
          if let Some(comp) = stmt
            .query_row(rusqlite::params![encode_uuid(c)], competition_from_row)
            .optional()?
          {
            out.push(comp);
          }
        }
        Ok(Some(out))
      })
      .await?
      .ok_or_else(|| podium_core::Error::not_found("competition", id).into())
  }

  async fn children(&self, id: Uuid) -> Result<Vec<Competition>> {
    let sql = format!(
      "SELECT {COMPETITION_COLUMNS} FROM competitions
       WHERE parent_competition_id = ?1 ORDER BY name"
    );
    self.ensure_exists("competition", "competitions", "competition_id", id).await?;
    self.fetch_all(sql, Some(id), competition_from_row).await
  }

  async fn competitions_of_event(&self, event_id: Uuid) -> Result<Vec<Competition>> {
    let sql = format!(
      "SELECT {COMPETITION_COLUMNS} FROM competitions WHERE event_id = ?1 ORDER BY name"
    );
    self.ensure_exists("event", "events", "event_id", event_id).await?;
    self.fetch_all(sql, Some(event_id), competition_from_row).await
  }

  // ── Participations ────────────────────────────────────────────────────────

  async fn add_participation(&self, input: NewParticipation) -> Result<Participation> {
    let participant = input.participant.normalized();
    participant.validate()?;

    let record = Participation {
      participation_id: Uuid::new_v4(),
      participant,
      event_id: input.event_id,
      kind_id: input.kind_id,
      advanced: input.advanced,
      created_at: Utc::now(),
    };

    let row = record.clone();
    let directory = self.directory.clone();
    self
      .write("add_participation", move |tx| {
        rules::check_entry(
          tx,
          &PARTICIPATIONS,
          &row.participant,
          row.event_id,
          row.kind_id,
          None,
          directory.as_ref(),
        )?;
        tx.execute(
          "INSERT INTO participations (
             participation_id, person_id, literal_name, event_id,
             kind_id, advanced, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            encode_uuid(row.participation_id),
            row.participant.person_id.map(encode_uuid),
            row.participant.literal_name,
            encode_uuid(row.event_id),
            encode_uuid(row.kind_id),
            row.advanced,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      participation_id = %record.participation_id,
      event_id = %record.event_id,
      participant = %record.participant,
      "added participation"
    );
    Ok(record)
  }

  async fn update_participation(&self, id: Uuid, input: NewParticipation) -> Result<Participation> {
    let participant = input.participant.normalized();
    participant.validate()?;

    let directory = self.directory.clone();
    let record = self
      .write("update_participation", move |tx| {
        let existing = tx
          .query_row(
            &format!(
              "SELECT {PARTICIPATION_COLUMNS} FROM participations WHERE participation_id = ?1"
            ),
            rusqlite::params![encode_uuid(id)],
            participation_from_row,
          )
          .optional()?
          .ok_or_else(|| podium_core::Error::not_found("participation", id))?;

        let record = Participation {
          participation_id: id,
          participant,
          event_id: input.event_id,
          kind_id: input.kind_id,
          advanced: input.advanced,
          created_at: existing.created_at,
        };
        rules::check_entry(
          tx,
          &PARTICIPATIONS,
          &record.participant,
          record.event_id,
          record.kind_id,
          Some(id),
          directory.as_ref(),
        )?;
        tx.execute(
          "UPDATE participations
           SET person_id = ?2, literal_name = ?3, event_id = ?4, kind_id = ?5, advanced = ?6
           WHERE participation_id = ?1",
          rusqlite::params![
            encode_uuid(id),
            record.participant.person_id.map(encode_uuid),
            record.participant.literal_name,
            encode_uuid(record.event_id),
            encode_uuid(record.kind_id),
            record.advanced,
          ],
        )?;
        Ok(record)
      })
      .await?;

    tracing::debug!(participation_id = %id, "updated participation");
    Ok(record)
  }

  async fn get_participation(&self, id: Uuid) -> Result<Option<Participation>> {
    let sql =
      format!("SELECT {PARTICIPATION_COLUMNS} FROM participations WHERE participation_id = ?1");
    self.fetch_one(sql, id, participation_from_row).await
  }

  async fn list_participations(&self, event_id: Uuid) -> Result<Vec<Participation>> {
    let sql = format!(
      "SELECT {PARTICIPATION_COLUMNS} FROM participations
       WHERE event_id = ?1 ORDER BY created_at, rowid"
    );
    self.fetch_all(sql, Some(event_id), participation_from_row).await
  }

  async fn delete_participation(&self, id: Uuid) -> Result<()> {
    self
      .delete_row(
        "delete_participation",
        "participation",
        "participations",
        "participation_id",
        id,
      )
      .await
  }

  async fn participation_name(&self, id: Uuid) -> Result<Option<String>> {
    self.entry_name(&PARTICIPATIONS, id).await
  }

  // ── Outcomes ──────────────────────────────────────────────────────────────

  async fn add_outcome(&self, input: NewOutcome) -> Result<Outcome> {
    let participant = input.participant.normalized();
    participant.validate()?;

    let record = Outcome {
      outcome_id: Uuid::new_v4(),
      participant,
      competition_id: input.competition_id,
      kind_id: input.kind_id,
      created_at: Utc::now(),
    };

    let row = record.clone();
    let directory = self.directory.clone();
    self
      .write("add_outcome", move |tx| {
        rules::check_entry(
          tx,
          &OUTCOMES,
          &row.participant,
          row.competition_id,
          row.kind_id,
          None,
          directory.as_ref(),
        )?;
        tx.execute(
          "INSERT INTO outcomes (
             outcome_id, person_id, literal_name, competition_id, kind_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            encode_uuid(row.outcome_id),
            row.participant.person_id.map(encode_uuid),
            row.participant.literal_name,
            encode_uuid(row.competition_id),
            encode_uuid(row.kind_id),
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      outcome_id = %record.outcome_id,
      competition_id = %record.competition_id,
      participant = %record.participant,
      "added outcome"
    );
    Ok(record)
  }

  async fn update_outcome(&self, id: Uuid, input: NewOutcome) -> Result<Outcome> {
    let participant = input.participant.normalized();
    participant.validate()?;

    let directory = self.directory.clone();
    let record = self
      .write("update_outcome", move |tx| {
        let existing = tx
          .query_row(
            &format!("SELECT {OUTCOME_COLUMNS} FROM outcomes WHERE outcome_id = ?1"),
            rusqlite::params![encode_uuid(id)],
            outcome_from_row,
          )
          .optional()?
          .ok_or_else(|| podium_core::Error::not_found("outcome", id))?;

        let record = Outcome {
          outcome_id: id,
          participant,
          competition_id: input.competition_id,
          kind_id: input.kind_id,
          created_at: existing.created_at,
        };
        rules::check_entry(
          tx,
          &OUTCOMES,
          &record.participant,
          record.competition_id,
          record.kind_id,
          Some(id),
          directory.as_ref(),
        )?;
        tx.execute(
          "UPDATE outcomes
           SET person_id = ?2, literal_name = ?3, competition_id = ?4, kind_id = ?5
           WHERE outcome_id = ?1",
          rusqlite::params![
            encode_uuid(id),
            record.participant.person_id.map(encode_uuid),
            record.participant.literal_name,
            encode_uuid(record.competition_id),
            encode_uuid(record.kind_id),
          ],
        )?;
        Ok(record)
      })
      .await?;

    tracing::debug!(outcome_id = %id, "updated outcome");
    Ok(record)
  }

  async fn get_outcome(&self, id: Uuid) -> Result<Option<Outcome>> {
    let sql = format!("SELECT {OUTCOME_COLUMNS} FROM outcomes WHERE outcome_id = ?1");
    self.fetch_one(sql, id, outcome_from_row).await
  }

  async fn list_outcomes(&self, competition_id: Uuid) -> Result<Vec<Outcome>> {
    let sql = format!(
      "SELECT {OUTCOME_COLUMNS} FROM outcomes
       WHERE competition_id = ?1 ORDER BY created_at, rowid"
    );
    self.fetch_all(sql, Some(competition_id), outcome_from_row).await
  }

  async fn delete_outcome(&self, id: Uuid) -> Result<()> {
    self.delete_row("delete_outcome", "outcome", "outcomes", "outcome_id", id).await
  }

  async fn outcome_name(&self, id: Uuid) -> Result<Option<String>> {
    self.entry_name(&OUTCOMES, id).await
  }
}

/// Kind names are unique per category; `except` is the kind being renamed.
fn ensure_kind_name_free(
  tx: &Transaction<'_>,
  category: KindCategory,
  name: &str,
  except: Option<Uuid>,
) -> TxResult<()> {
  let holder: Option<String> = tx
    .query_row(
      &format!("SELECT kind_id FROM {} WHERE name = ?1", kind_table(category)),
      rusqlite::params![name],
      |r| r.get(0),
    )
    .optional()?;
  match holder {
    Some(h) if except.map(encode_uuid).as_deref() != Some(h.as_str()) => {
      Err(podium_core::Error::DuplicateKindName { category, name: name.to_owned() }.into())
    }
    _ => Ok(()),
  }
}
