//! The `PodiumStore` trait.
//!
//! Implemented by storage backends (e.g. `podium-store-sqlite`). Callers
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  activity::{Competition, Event, NewCompetition, NewEvent},
  entry::{NewOutcome, NewParticipation, Outcome, Participation},
  kind::{Kind, KindCategory, KindRelation, NewKind},
  person::{AccountRef, Person, PersonRemoval},
};

/// Abstraction over a Podium store backend.
///
/// Every write of a participation or outcome runs the checks in
/// [`crate::validate`] and persists atomically with them. Deletes follow the
/// reference rules of the data model: kinds are protected while referenced,
/// competition parent and event links are cleared, and participations and
/// outcomes go with their event or competition.
pub trait PodiumStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Kinds ─────────────────────────────────────────────────────────────

  fn add_kind(
    &self,
    category: KindCategory,
    input: NewKind,
  ) -> impl Future<Output = Result<Kind, Self::Error>> + Send + '_;

  fn get_kind(
    &self,
    category: KindCategory,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Kind>, Self::Error>> + Send + '_;

  /// All kinds of a category, ordered by name.
  fn list_kinds(
    &self,
    category: KindCategory,
  ) -> impl Future<Output = Result<Vec<Kind>, Self::Error>> + Send + '_;

  fn update_kind(
    &self,
    category: KindCategory,
    id: Uuid,
    input: NewKind,
  ) -> impl Future<Output = Result<Kind, Self::Error>> + Send + '_;

  /// Fails if any event, competition, participation or outcome still
  /// references the kind. Permitted-set links are removed with it.
  fn delete_kind(
    &self,
    category: KindCategory,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Add `child` to the permitted set of `parent`. Idempotent.
  fn permit(
    &self,
    relation: KindRelation,
    parent: Uuid,
    child: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove `child` from the permitted set of `parent`. Returns whether it
  /// was present.
  fn revoke(
    &self,
    relation: KindRelation,
    parent: Uuid,
    child: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn permitted(
    &self,
    relation: KindRelation,
    parent: Uuid,
  ) -> impl Future<Output = Result<Vec<Kind>, Self::Error>> + Send + '_;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Create and persist a person bound to `account`.
  fn add_person(
    &self,
    account: Option<AccountRef>,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  fn list_persons(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// The person's display name from the account directory.
  fn person_name(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Delete a person under the store's configured
  /// [`PersonDeletion`](crate::person::PersonDeletion) policy.
  fn delete_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<PersonRemoval, Self::Error>> + Send + '_;

  /// Events the person takes part in.
  fn events_of_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Competitions the person has an outcome in.
  fn competitions_of_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Competition>, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  fn add_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  fn list_events(
    &self,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  fn update_event(
    &self,
    id: Uuid,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Deletes the event's participations; attached competitions survive
  /// with their event link cleared.
  fn delete_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Competitions ──────────────────────────────────────────────────────

  fn add_competition(
    &self,
    input: NewCompetition,
  ) -> impl Future<Output = Result<Competition, Self::Error>> + Send + '_;

  fn get_competition(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Competition>, Self::Error>> + Send + '_;

  fn list_competitions(
    &self,
  ) -> impl Future<Output = Result<Vec<Competition>, Self::Error>> + Send + '_;

  /// Rejects a parent that is the competition itself or a descendant.
  fn update_competition(
    &self,
    id: Uuid,
    input: NewCompetition,
  ) -> impl Future<Output = Result<Competition, Self::Error>> + Send + '_;

  /// Deletes the competition's outcomes; child competitions survive with
  /// their parent link cleared.
  fn delete_competition(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Parent chain of a competition, nearest first. `NotFound` for an
  /// unknown competition.
  fn ancestors(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Competition>, Self::Error>> + Send + '_;

  /// Competitions whose parent is `id`; `NotFound` if `id` is unknown.
  fn children(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Competition>, Self::Error>> + Send + '_;

  /// `NotFound` if the event is unknown.
  fn competitions_of_event(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Competition>, Self::Error>> + Send + '_;

  // ── Participations ────────────────────────────────────────────────────

  /// Validate and persist a participation.
  fn add_participation(
    &self,
    input: NewParticipation,
  ) -> impl Future<Output = Result<Participation, Self::Error>> + Send + '_;

  /// Validate and overwrite a participation. The record itself is not
  /// counted as its own sibling.
  fn update_participation(
    &self,
    id: Uuid,
    input: NewParticipation,
  ) -> impl Future<Output = Result<Participation, Self::Error>> + Send + '_;

  fn get_participation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Participation>, Self::Error>> + Send + '_;

  /// Participations of an event, oldest first.
  fn list_participations(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Participation>, Self::Error>> + Send + '_;

  fn delete_participation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Effective name of a participation; `None` if it has no identity.
  fn participation_name(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  // ── Outcomes ──────────────────────────────────────────────────────────

  fn add_outcome(
    &self,
    input: NewOutcome,
  ) -> impl Future<Output = Result<Outcome, Self::Error>> + Send + '_;

  fn update_outcome(
    &self,
    id: Uuid,
    input: NewOutcome,
  ) -> impl Future<Output = Result<Outcome, Self::Error>> + Send + '_;

  fn get_outcome(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Outcome>, Self::Error>> + Send + '_;

  fn list_outcomes(
    &self,
    competition_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Outcome>, Self::Error>> + Send + '_;

  fn delete_outcome(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn outcome_name(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;
}
