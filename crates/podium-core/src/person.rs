//! Person: a thin wrapper around an external account.
//!
//! A person stores no naming data of its own. Its display name is fetched at
//! read time from an [`AccountDirectory`].

use std::{collections::HashMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Opaque reference to an account owned by the external user system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountRef(pub String);

impl AccountRef {
  pub fn new(s: impl Into<String>) -> Self { Self(s.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AccountRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Capability for resolving account references to display names.
///
/// Implementations are called from inside storage transactions and must not
/// block for long.
pub trait AccountDirectory: Send + Sync {
  /// The full display name of `account`, or `None` if it does not exist.
  fn full_name(&self, account: &AccountRef) -> Option<String>;
}

/// An in-memory [`AccountDirectory`].
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
  names: HashMap<AccountRef, String>,
}

impl StaticDirectory {
  pub fn new() -> Self { Self::default() }

  /// Builder-style insert.
  pub fn with(mut self, account: impl Into<String>, name: impl Into<String>) -> Self {
    self.insert(account, name);
    self
  }

  pub fn insert(&mut self, account: impl Into<String>, name: impl Into<String>) {
    self.names.insert(AccountRef::new(account), name.into());
  }
}

impl AccountDirectory for StaticDirectory {
  fn full_name(&self, account: &AccountRef) -> Option<String> {
    self.names.get(account).cloned()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:  Uuid,
  /// Nullable at the schema level, but expected to be set in practice.
  pub account:    Option<AccountRef>,
  pub created_at: DateTime<Utc>,
}

impl Person {
  /// Resolve the display name through `directory`.
  ///
  /// Fails with [`Error::MissingAccount`] when no account is linked and with
  /// [`Error::UnknownAccount`] when the directory has no such account.
  pub fn resolve_name(&self, directory: &dyn AccountDirectory) -> Result<String> {
    let account = self
      .account
      .as_ref()
      .ok_or(Error::MissingAccount(self.person_id))?;
    directory
      .full_name(account)
      .ok_or_else(|| Error::UnknownAccount(account.clone()))
  }
}

/// What happens to a person's participation and outcome history when the
/// person is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonDeletion {
  /// Rewrite the records to literal-name form, then delete the person.
  #[default]
  ConvertToLiteral,
  /// Delete the records together with the person.
  Cascade,
}

/// Summary returned by [`crate::store::PodiumStore::delete_person`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRemoval {
  /// Records rewritten to literal-name form.
  pub converted: usize,
  /// Records left without identity because the person's name could not be
  /// resolved, exceeds the literal-name limit, or is already taken by a
  /// sibling record.
  pub cleared:   usize,
  /// Records removed along with the person.
  pub deleted:   usize,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn person(account: Option<&str>) -> Person {
    Person {
      person_id:  Uuid::new_v4(),
      account:    account.map(AccountRef::new),
      created_at: Utc::now(),
    }
  }

  #[test]
  fn resolves_through_directory() {
    let dir = StaticDirectory::new().with("alice", "Alice Liddell");
    assert_eq!(person(Some("alice")).resolve_name(&dir).unwrap(), "Alice Liddell");
  }

  #[test]
  fn missing_account_is_an_error() {
    let dir = StaticDirectory::new();
    let p = person(None);
    assert!(matches!(
      p.resolve_name(&dir),
      Err(Error::MissingAccount(id)) if id == p.person_id
    ));
  }

  #[test]
  fn unknown_account_is_an_error() {
    let dir = StaticDirectory::new();
    assert!(matches!(
      person(Some("ghost")).resolve_name(&dir),
      Err(Error::UnknownAccount(a)) if a.as_str() == "ghost"
    ));
  }
}
