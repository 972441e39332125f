//! Error types for `podium-core`.
//!
//! Every variant is a validation-time failure the caller can correct and
//! resubmit; none of them is raised after a record has been persisted.

use thiserror::Error;
use uuid::Uuid;

use crate::{kind::KindCategory, person::AccountRef};

#[derive(Debug, Error)]
pub enum Error {
  #[error("only one of person or literal name may be set")]
  ConflictingIdentity,

  #[error("kind {kind_id} is not permitted by parent {parent_id}")]
  DisallowedKind { kind_id: Uuid, parent_id: Uuid },

  #[error("{name:?} already takes part in {parent_id}")]
  DuplicateParticipant { name: String, parent_id: Uuid },

  #[error("person {0} has no linked account")]
  MissingAccount(Uuid),

  #[error("account {0} is unknown to the directory")]
  UnknownAccount(AccountRef),

  #[error("account {0} is already linked to a person")]
  DuplicateAccount(AccountRef),

  #[error("competition {parent_id} cannot become the parent of {competition_id}")]
  CompetitionCycle { competition_id: Uuid, parent_id: Uuid },

  #[error("{category} {kind_id} is still referenced")]
  KindInUse { category: KindCategory, kind_id: Uuid },

  #[error("{category} named {name:?} already exists")]
  DuplicateKindName { category: KindCategory, name: String },

  #[error("expected a {expected}, got a {found}")]
  KindCategoryMismatch {
    expected: KindCategory,
    found:    KindCategory,
  },

  #[error("field `{0}` must not be empty")]
  FieldEmpty(&'static str),

  #[error("field `{field}` exceeds {max} characters")]
  FieldTooLong { field: &'static str, max: usize },

  #[error("end date precedes start date")]
  InvalidDateRange,

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: Uuid },
}

impl Error {
  pub fn not_found(entity: &'static str, id: Uuid) -> Self {
    Self::NotFound { entity, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
