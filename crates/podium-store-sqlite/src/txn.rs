//! Write transactions.
//!
//! Every write runs inside `BEGIN IMMEDIATE`, which takes the database write
//! lock before the first read. Validation reads and the final insert or
//! update therefore see one consistent snapshot no other writer can change.

use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Why a transaction body stopped early.
pub(crate) enum Abort {
  /// A domain rule rejected the write; the transaction is rolled back.
  Rule(podium_core::Error),
  Sql(rusqlite::Error),
}

impl From<podium_core::Error> for Abort {
  fn from(e: podium_core::Error) -> Self { Self::Rule(e) }
}

impl From<rusqlite::Error> for Abort {
  fn from(e: rusqlite::Error) -> Self { Self::Sql(e) }
}

pub(crate) type TxResult<T> = std::result::Result<T, Abort>;

/// Run `body` in an immediate transaction, committing only if it succeeds.
///
/// Rule violations come back in the inner `Result` so they are not mistaken
/// for database failures by [`crate::Error::from_write`].
pub(crate) fn immediate<T, F>(
  conn: &mut Connection,
  body: F,
) -> tokio_rusqlite::Result<Result<T, podium_core::Error>>
where
  F: FnOnce(&Transaction<'_>) -> TxResult<T>,
{
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  match body(&tx) {
    Ok(value) => {
      tx.commit()?;
      Ok(Ok(value))
    }
    // Dropping `tx` rolls back.
    Err(Abort::Rule(e)) => Ok(Err(e)),
    Err(Abort::Sql(e)) => Err(e.into()),
  }
}
