//! Events and competitions, the two activity types people take part in.
//!
//! Competitions form a forest through `parent_competition_id`. The tree is
//! not trusted to be acyclic on read: [`ancestry`] walks it with a visited
//! set, and [`would_cycle`] guards every write of a parent link.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, validate};

pub const NAME_MAX: usize = 255;
pub const DATE_LABEL_MAX: usize = 255;

// ─── Event ───────────────────────────────────────────────────────────────────

/// A concrete event at a place, e.g. one seminar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub event_id:    Uuid,
  pub name:        String,
  /// References an event kind; the kind cannot be deleted while referenced.
  pub kind_id:     Option<Uuid>,
  pub description: String,
  pub start_date:  Option<NaiveDate>,
  pub end_date:    Option<NaiveDate>,
}

/// Input to [`crate::store::PodiumStore::add_event`] and `update_event`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEvent {
  pub name:        String,
  pub kind_id:     Option<Uuid>,
  #[serde(default)]
  pub description: String,
  pub start_date:  Option<NaiveDate>,
  pub end_date:    Option<NaiveDate>,
}

impl NewEvent {
  pub fn new(name: impl Into<String>, kind_id: Option<Uuid>) -> Self {
    Self { name: name.into(), kind_id, ..Self::default() }
  }

  pub fn validate(&self) -> Result<()> {
    validate::required("name", &self.name, NAME_MAX)?;
    if let (Some(start), Some(end)) = (self.start_date, self.end_date)
      && end < start
    {
      return Err(Error::InvalidDateRange);
    }
    Ok(())
  }

  pub fn into_event(self, event_id: Uuid) -> Event {
    Event {
      event_id,
      name: self.name,
      kind_id: self.kind_id,
      description: self.description,
      start_date: self.start_date,
      end_date: self.end_date,
    }
  }
}

// ─── Competition ─────────────────────────────────────────────────────────────

/// One node of a competition tree, e.g. a stage or exam round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
  pub competition_id:        Uuid,
  pub name:                  String,
  pub kind_id:               Option<Uuid>,
  /// Cleared when the parent is deleted.
  pub parent_competition_id: Option<Uuid>,
  pub description:           String,
  /// Free-text date, e.g. "spring 2017".
  pub date_label:            String,
  /// Cleared when the event is deleted.
  pub event_id:              Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCompetition {
  pub name:                  String,
  pub kind_id:               Option<Uuid>,
  pub parent_competition_id: Option<Uuid>,
  #[serde(default)]
  pub description:           String,
  #[serde(default)]
  pub date_label:            String,
  pub event_id:              Option<Uuid>,
}

impl NewCompetition {
  pub fn new(name: impl Into<String>, kind_id: Option<Uuid>) -> Self {
    Self { name: name.into(), kind_id, ..Self::default() }
  }

  pub fn validate(&self) -> Result<()> {
    validate::required("name", &self.name, NAME_MAX)?;
    validate::max_len("date_label", &self.date_label, DATE_LABEL_MAX)
  }

  pub fn into_competition(self, competition_id: Uuid) -> Competition {
    Competition {
      competition_id,
      name: self.name,
      kind_id: self.kind_id,
      parent_competition_id: self.parent_competition_id,
      description: self.description,
      date_label: self.date_label,
      event_id: self.event_id,
    }
  }
}

// ─── Tree queries ────────────────────────────────────────────────────────────

/// Walk parent links starting at `first`, nearest ancestor first.
///
/// `parent_of` returns the parent of a node (or `None` at a root). The walk
/// stops at the first repeated node, so a corrupted cycle still terminates.
pub fn ancestry<E, F>(first: Option<Uuid>, mut parent_of: F) -> Result<Vec<Uuid>, E>
where
  F: FnMut(Uuid) -> Result<Option<Uuid>, E>,
{
  let mut seen = HashSet::new();
  let mut chain = Vec::new();
  let mut next = first;
  while let Some(id) = next {
    if !seen.insert(id) {
      break;
    }
    chain.push(id);
    next = parent_of(id)?;
  }
  Ok(chain)
}

/// Whether making `parent` the parent of `child` would close a cycle, i.e.
/// `parent` is `child` itself or one of its descendants.
pub fn would_cycle<E, F>(child: Uuid, parent: Uuid, parent_of: F) -> Result<bool, E>
where
  F: FnMut(Uuid) -> Result<Option<Uuid>, E>,
{
  Ok(ancestry(Some(parent), parent_of)?.contains(&child))
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, convert::Infallible};

  use super::*;

  fn lookup(
    links: &HashMap<Uuid, Uuid>,
  ) -> impl FnMut(Uuid) -> Result<Option<Uuid>, Infallible> + '_ {
    move |id| Ok(links.get(&id).copied())
  }

  #[test]
  fn ancestry_is_nearest_first() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let links = HashMap::from([(c, b), (b, a)]);
    let chain = ancestry(Some(b), lookup(&links)).unwrap();
    assert_eq!(chain, vec![b, a]);
  }

  #[test]
  fn ancestry_terminates_on_corrupt_cycle() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let links = HashMap::from([(a, b), (b, a)]);
    let chain = ancestry(Some(a), lookup(&links)).unwrap();
    assert_eq!(chain, vec![a, b]);
  }

  #[test]
  fn self_and_descendants_are_rejected_as_parent() {
    let (root, mid, leaf) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let links = HashMap::from([(leaf, mid), (mid, root)]);
    assert!(would_cycle(root, root, lookup(&links)).unwrap());
    assert!(would_cycle(root, leaf, lookup(&links)).unwrap());
    assert!(!would_cycle(leaf, root, lookup(&links)).unwrap());
  }

  #[test]
  fn end_before_start_is_rejected() {
    let mut ev = NewEvent::new("Seminar", None);
    ev.start_date = NaiveDate::from_ymd_opt(2017, 3, 10);
    ev.end_date = NaiveDate::from_ymd_opt(2017, 3, 9);
    assert!(matches!(ev.validate(), Err(Error::InvalidDateRange)));
  }
}
