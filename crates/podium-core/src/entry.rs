//! Participations and outcomes: the records linking a participant to an
//! event or a competition.
//!
//! Both share the same identity model: a participant is either a [`Person`]
//! or a literal name typed in for someone not registered as a person.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  person::{AccountDirectory, Person},
  validate,
};

/// Longest accepted literal name.
pub const LITERAL_NAME_MAX: usize = 99;

// ─── Participant ─────────────────────────────────────────────────────────────

/// The identity columns of a participation or outcome as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  pub person_id:    Option<Uuid>,
  /// Used when the participant is not registered as a person.
  pub literal_name: Option<String>,
}

impl Participant {
  pub fn person(person_id: Uuid) -> Self {
    Self { person_id: Some(person_id), literal_name: None }
  }

  pub fn literal(name: impl Into<String>) -> Self {
    Self { person_id: None, literal_name: Some(name.into()) }
  }

  /// Blank literal names count as absent.
  pub fn normalized(mut self) -> Self {
    if self.literal_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      self.literal_name = None;
    }
    self
  }

  /// Field constraints plus exclusivity. Needs no storage access.
  pub fn validate(&self) -> Result<()> {
    if let Some(name) = &self.literal_name {
      validate::max_len("literal_name", name, LITERAL_NAME_MAX)?;
    }
    validate::exclusive_identity(self)
  }
}

/// A participant with its person loaded, ready for name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
  Person(Person),
  Literal(String),
  /// Neither a person nor a literal name. Allowed by the schema, but such a
  /// record has no effective name.
  Unset,
}

impl Identity {
  /// Combine the loaded person (if any) with the literal name.
  pub fn from_parts(person: Option<Person>, literal_name: Option<String>) -> Result<Self> {
    match (person, literal_name) {
      (Some(_), Some(_)) => Err(Error::ConflictingIdentity),
      (Some(p), None) => Ok(Self::Person(p)),
      (None, Some(n)) => Ok(Self::Literal(n)),
      (None, None) => Ok(Self::Unset),
    }
  }

  pub fn person_id(&self) -> Option<Uuid> {
    match self {
      Self::Person(p) => Some(p.person_id),
      _ => None,
    }
  }

  /// The display name used for uniqueness checks: the literal name if set,
  /// else the person's resolved name. `Ok(None)` for [`Identity::Unset`].
  pub fn effective_name(&self, directory: &dyn AccountDirectory) -> Result<Option<String>> {
    match self {
      Self::Literal(n) => Ok(Some(n.clone())),
      Self::Person(p) => p.resolve_name(directory).map(Some),
      Self::Unset => Ok(None),
    }
  }
}

// ─── Participation ───────────────────────────────────────────────────────────

/// Links a participant to an event under a participation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
  pub participation_id: Uuid,
  #[serde(flatten)]
  pub participant:      Participant,
  pub event_id:         Uuid,
  pub kind_id:          Uuid,
  /// Whether the participant advanced to the next round.
  pub advanced:         bool,
  pub created_at:       DateTime<Utc>,
}

/// Input to [`crate::store::PodiumStore::add_participation`] and
/// `update_participation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewParticipation {
  #[serde(flatten)]
  pub participant: Participant,
  pub event_id:    Uuid,
  pub kind_id:     Uuid,
  #[serde(default)]
  pub advanced:    bool,
}

impl NewParticipation {
  pub fn new(participant: Participant, event_id: Uuid, kind_id: Uuid) -> Self {
    Self { participant, event_id, kind_id, advanced: false }
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Links a participant to a competition under an outcome kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
  pub outcome_id:     Uuid,
  #[serde(flatten)]
  pub participant:    Participant,
  pub competition_id: Uuid,
  pub kind_id:        Uuid,
  pub created_at:     DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOutcome {
  #[serde(flatten)]
  pub participant:    Participant,
  pub competition_id: Uuid,
  pub kind_id:        Uuid,
}

impl NewOutcome {
  pub fn new(participant: Participant, competition_id: Uuid, kind_id: Uuid) -> Self {
    Self { participant, competition_id, kind_id }
  }
}

impl fmt::Display for Participant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (&self.person_id, &self.literal_name) {
      (Some(id), _) => write!(f, "person {id}"),
      (None, Some(n)) => f.write_str(n),
      (None, None) => f.write_str("?"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_literal_is_absent() {
    let p = Participant::literal("   ").normalized();
    assert_eq!(p.literal_name, None);
    let p = Participant::literal("Alice").normalized();
    assert_eq!(p.literal_name.as_deref(), Some("Alice"));
  }

  #[test]
  fn literal_name_length_is_bounded() {
    let p = Participant::literal("x".repeat(LITERAL_NAME_MAX + 1));
    assert!(matches!(
      p.validate(),
      Err(Error::FieldTooLong { field: "literal_name", max: LITERAL_NAME_MAX })
    ));
  }

  #[test]
  fn identity_rejects_both_parts() {
    let person = Person {
      person_id:  Uuid::new_v4(),
      account:    None,
      created_at: Utc::now(),
    };
    assert!(matches!(
      Identity::from_parts(Some(person), Some("X".into())),
      Err(Error::ConflictingIdentity)
    ));
    assert_eq!(Identity::from_parts(None, None).unwrap(), Identity::Unset);
  }
}
