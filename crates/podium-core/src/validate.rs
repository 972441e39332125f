//! Pre-persist checks.
//!
//! These are pure functions over already-loaded data. Storage backends load
//! the parent's permitted kinds and the sibling identities inside their write
//! transaction and run the checks in this order:
//!
//! 1. [`exclusive_identity`]
//! 2. [`kind_permitted`]
//! 3. [`unique_participant`]

use uuid::Uuid;

use crate::{
  Error, Result,
  entry::{Identity, Participant},
  person::AccountDirectory,
};

/// Non-blank and at most `max` characters.
pub fn required(field: &'static str, value: &str, max: usize) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::FieldEmpty(field));
  }
  max_len(field, value, max)
}

pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<()> {
  if value.chars().count() > max {
    return Err(Error::FieldTooLong { field, max });
  }
  Ok(())
}

/// A participant names a person or a literal name, never both.
pub fn exclusive_identity(participant: &Participant) -> Result<()> {
  if participant.person_id.is_some() && participant.literal_name.is_some() {
    return Err(Error::ConflictingIdentity);
  }
  Ok(())
}

/// `kind_id` must be in the permitted set of the parent's kind.
///
/// `permitted` is `None` when the parent has no kind; such a parent permits
/// nothing.
pub fn kind_permitted(kind_id: Uuid, parent_id: Uuid, permitted: Option<&[Uuid]>) -> Result<()> {
  match permitted {
    Some(set) if set.contains(&kind_id) => Ok(()),
    _ => Err(Error::DisallowedKind { kind_id, parent_id }),
  }
}

/// No sibling under the same parent may refer to the same person or resolve
/// to the same effective name.
///
/// `siblings` must not contain the candidate itself. Siblings whose name
/// cannot be resolved never match. A candidate linked to a person whose name
/// cannot be resolved fails with that resolution error.
pub fn unique_participant(
  candidate: &Identity,
  siblings: &[Identity],
  parent_id: Uuid,
  directory: &dyn AccountDirectory,
) -> Result<()> {
  if let Some(person_id) = candidate.person_id()
    && siblings.iter().any(|s| s.person_id() == Some(person_id))
  {
    let name = candidate
      .effective_name(directory)
      .ok()
      .flatten()
      .unwrap_or_else(|| person_id.to_string());
    return Err(Error::DuplicateParticipant { name, parent_id });
  }

  let Some(name) = candidate.effective_name(directory)? else {
    return Ok(());
  };

  let taken = siblings
    .iter()
    .filter_map(|s| s.effective_name(directory).ok().flatten())
    .any(|other| other == name);

  if taken {
    return Err(Error::DuplicateParticipant { name, parent_id });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::person::{AccountRef, Person, StaticDirectory};

  fn person(account: Option<&str>) -> Person {
    Person {
      person_id:  Uuid::new_v4(),
      account:    account.map(AccountRef::new),
      created_at: Utc::now(),
    }
  }

  fn literal(n: &str) -> Identity { Identity::Literal(n.into()) }

  #[test]
  fn kindless_parent_permits_nothing() {
    let kind = Uuid::new_v4();
    let parent = Uuid::new_v4();
    assert!(kind_permitted(kind, parent, Some(&[kind])).is_ok());
    assert!(matches!(
      kind_permitted(kind, parent, Some(&[])),
      Err(Error::DisallowedKind { .. })
    ));
    assert!(matches!(
      kind_permitted(kind, parent, None),
      Err(Error::DisallowedKind { .. })
    ));
  }

  #[test]
  fn literal_collides_with_resolved_person() {
    let dir = StaticDirectory::new().with("alice", "Alice");
    let siblings = [Identity::Person(person(Some("alice")))];
    let err = unique_participant(&literal("Alice"), &siblings, Uuid::new_v4(), &dir)
      .unwrap_err();
    assert!(matches!(err, Error::DuplicateParticipant { name, .. } if name == "Alice"));
  }

  #[test]
  fn names_compare_case_sensitively() {
    let dir = StaticDirectory::new();
    let siblings = [literal("alice")];
    assert!(unique_participant(&literal("Alice"), &siblings, Uuid::new_v4(), &dir).is_ok());
  }

  #[test]
  fn unresolved_siblings_never_match() {
    let dir = StaticDirectory::new();
    let siblings = [
      Identity::Unset,
      Identity::Person(person(None)),
      Identity::Person(person(Some("ghost"))),
    ];
    assert!(unique_participant(&literal("Bob"), &siblings, Uuid::new_v4(), &dir).is_ok());
    assert!(unique_participant(&Identity::Unset, &siblings, Uuid::new_v4(), &dir).is_ok());
  }

  #[test]
  fn same_person_is_a_duplicate_even_without_a_name() {
    let dir = StaticDirectory::new();
    let p = person(None);
    let siblings = [Identity::Person(p.clone())];
    assert!(matches!(
      unique_participant(&Identity::Person(p), &siblings, Uuid::new_v4(), &dir),
      Err(Error::DuplicateParticipant { .. })
    ));
  }

  #[test]
  fn unresolvable_candidate_person_fails() {
    let dir = StaticDirectory::new();
    let p = person(None);
    let id = p.person_id;
    assert!(matches!(
      unique_participant(&Identity::Person(p), &[], Uuid::new_v4(), &dir),
      Err(Error::MissingAccount(got)) if got == id
    ));
  }
}
