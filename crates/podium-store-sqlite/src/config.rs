//! Store configuration, read from an optional TOML file and `PODIUM_*`
//! environment variables.

use std::{path::{Path, PathBuf}, time::Duration};

use podium_core::person::PersonDeletion;
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  /// SQLite database file.
  pub path:            PathBuf,
  /// How long a writer waits for the database lock before giving up with a
  /// retryable conflict.
  pub busy_timeout_ms: u64,
  pub person_deletion: PersonDeletion,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      path:            PathBuf::from("podium.db"),
      busy_timeout_ms: 5_000,
      person_deletion: PersonDeletion::default(),
    }
  }
}

impl StoreConfig {
  /// Layer `file` (if it exists) and then the environment over the defaults.
  ///
  /// Environment keys are upper-cased field names with a `PODIUM_` prefix,
  /// e.g. `PODIUM_BUSY_TIMEOUT_MS=10000`.
  pub fn load(file: Option<&Path>) -> Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(file) = file {
      builder = builder.add_source(config::File::from(file).required(false));
    }
    let settings = builder
      .add_source(config::Environment::with_prefix("PODIUM"))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn busy_timeout(&self) -> Duration { Duration::from_millis(self.busy_timeout_ms) }
}
