//! The kind registry of administrator-defined categories.
//!
//! Event kinds and competition kinds additionally declare which participation
//! kinds and outcome kinds are valid beneath them; see [`KindRelation`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, validate};

/// Longest accepted kind name.
pub const NAME_MAX: usize = 255;

/// Which registry a kind belongs to. Each category is stored separately.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum KindCategory {
  /// Seminar, olympiad round, ...
  Event,
  /// Stage, exam round, ...
  Competition,
  /// Participant, organizer, ...
  Participation,
  /// First prize, medal, ...
  Outcome,
  Tag,
}

impl KindCategory {
  pub const ALL: [Self; 5] = [
    Self::Event,
    Self::Competition,
    Self::Participation,
    Self::Outcome,
    Self::Tag,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Event => "event kind",
      Self::Competition => "competition kind",
      Self::Participation => "participation kind",
      Self::Outcome => "outcome kind",
      Self::Tag => "tag",
    }
  }
}

impl fmt::Display for KindCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A named category record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kind {
  pub kind_id:     Uuid,
  pub category:    KindCategory,
  pub name:        String,
  pub description: String,
}

impl fmt::Display for Kind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

/// Input to [`crate::store::PodiumStore::add_kind`] and `update_kind`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewKind {
  pub name:        String,
  #[serde(default)]
  pub description: String,
}

impl NewKind {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), description: String::new() }
  }

  /// Field constraints shared by every category.
  pub fn validate(&self) -> Result<()> {
    validate::required("name", &self.name, NAME_MAX)
  }
}

/// A permitted-set relation between two kind categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindRelation {
  /// Event kind → permitted participation kinds.
  EventParticipation,
  /// Competition kind → permitted outcome kinds.
  CompetitionOutcome,
}

impl KindRelation {
  pub fn parent(self) -> KindCategory {
    match self {
      Self::EventParticipation => KindCategory::Event,
      Self::CompetitionOutcome => KindCategory::Competition,
    }
  }

  pub fn child(self) -> KindCategory {
    match self {
      Self::EventParticipation => KindCategory::Participation,
      Self::CompetitionOutcome => KindCategory::Outcome,
    }
  }
}
