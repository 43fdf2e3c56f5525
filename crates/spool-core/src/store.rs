//! Storage traits implemented by backends (e.g. `spool-store-sqlite`).
//!
//! The traits are split per concern so the engines can state exactly which
//! stores they touch: the feed aggregator needs follows, entries, and
//! profiles; the evaluator needs counters and grants. One backend type
//! usually implements all of them and thereby the [`Stores`] umbrella.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::{collections::HashSet, future::Future};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  achievement::Grant,
  counter::{CounterKey, CounterSnapshot},
  entry::{Entry, EntryPayload, NewEntry},
  social::{FollowEdge, List, Profile, WatchlistItem},
};

// ─── Follow graph ────────────────────────────────────────────────────────────

pub trait FollowStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create a follow edge. Returns `Ok(None)` if the edge already exists —
  /// following twice is a no-op, not an error. Callers must reject
  /// self-follows with [`crate::social::validate_follow`] first.
  fn follow(
    &self,
    follower: Uuid,
    followee: Uuid,
  ) -> impl Future<Output = Result<Option<FollowEdge>, Self::Error>> + Send + '_;

  /// Remove a follow edge. Returns whether an edge was removed.
  fn unfollow(
    &self,
    follower: Uuid,
    followee: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Everyone `user` follows, oldest edge first.
  fn followees(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<FollowEdge>, Self::Error>> + Send + '_;

  /// Everyone following `user`, via the reverse index.
  fn followers(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<FollowEdge>, Self::Error>> + Send + '_;
}

// ─── Entries ─────────────────────────────────────────────────────────────────

pub trait EntryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new entry. The store assigns the id and timestamp and
  /// derives the activity flag; see [`crate::entry::activity_flag`].
  fn insert_entry(
    &self,
    input: NewEntry,
  ) -> impl Future<Output = Result<Entry, Self::Error>> + Send + '_;

  fn get_entry(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send + '_;

  /// Replace the payload of an owned entry and recompute its activity flag.
  /// `subject_ref` is fixed at creation and never changes. Returns `None`
  /// when the entry does not exist or is not owned by `owner` — callers
  /// cannot distinguish the two.
  fn update_entry(
    &self,
    id: Uuid,
    owner: Uuid,
    payload: EntryPayload,
  ) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send + '_;

  /// Delete an owned entry. Returns the removed entry so callers can
  /// reverse its counter adjustments; `None` when absent or not owned.
  fn delete_entry(
    &self,
    id: Uuid,
    owner: Uuid,
  ) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send + '_;

  /// The most recent activity-eligible entries by one owner, newest first.
  /// This is the fan-out leg of the feed aggregator; `limit` caps what one
  /// prolific followee can contribute.
  fn recent_activity(
    &self,
    owner: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send + '_;

  /// The diary view: all of one owner's entries, activity-eligible or not,
  /// newest first.
  fn entries_for_owner(
    &self,
    owner: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send + '_;

  /// Activity-eligible entries about one catalog item, newest first.
  fn entries_for_subject<'a>(
    &'a self,
    subject: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send + 'a;
}

// ─── Profiles ────────────────────────────────────────────────────────────────

pub trait ProfileStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create or replace a user's public profile. The store assigns
  /// `updated_at`.
  fn upsert_profile(
    &self,
    profile: Profile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  fn profile(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Resolve many users in one batched lookup. Missing users are simply
  /// absent from the result; the order is unspecified.
  fn profiles_by_ids<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + 'a;
}

// ─── Counters ────────────────────────────────────────────────────────────────

pub trait CounterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Atomically add `delta` to a counter, clamping the result at zero.
  /// Returns the new value.
  fn adjust(
    &self,
    user: Uuid,
    key: CounterKey,
    delta: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// A point-in-time read of all of one user's counters.
  fn snapshot(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<CounterSnapshot, Self::Error>> + Send + '_;
}

// ─── Grants ──────────────────────────────────────────────────────────────────

pub trait GrantStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Conditional insert-only write: create the grant unless one already
  /// exists for `(user, achievement)`. `Ok(None)` means a concurrent
  /// evaluation won the race — the sole serialization point for at-most-once
  /// granting.
  fn try_grant<'a>(
    &'a self,
    user: Uuid,
    achievement: &'a str,
    earned_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Grant>, Self::Error>> + Send + 'a;

  /// The ids of every achievement already granted to `user`.
  fn granted_ids(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<HashSet<String>, Self::Error>> + Send + '_;

  /// All grants for `user`, newest first.
  fn grants_for(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<Grant>, Self::Error>> + Send + '_;
}

// ─── Lists ───────────────────────────────────────────────────────────────────

pub trait ListStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn create_list<'a>(
    &'a self,
    owner: Uuid,
    title: &'a str,
  ) -> impl Future<Output = Result<List, Self::Error>> + Send + 'a;

  /// Delete an owned list. Returns whether anything was removed; absent and
  /// not-owned are indistinguishable.
  fn delete_list(
    &self,
    id: Uuid,
    owner: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Watchlist ───────────────────────────────────────────────────────────────

pub trait WatchlistStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Add a catalog item to the owner's watchlist. Returns `None` when it
  /// was already present, so counter adjustments fire exactly once.
  fn watchlist_add<'a>(
    &'a self,
    owner: Uuid,
    subject: &'a str,
  ) -> impl Future<Output = Result<Option<WatchlistItem>, Self::Error>> + Send + 'a;

  /// Remove a catalog item. Returns whether anything changed.
  fn watchlist_remove<'a>(
    &'a self,
    owner: Uuid,
    subject: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

// ─── Umbrella ────────────────────────────────────────────────────────────────

/// Blanket umbrella for backends implementing every store trait. The HTTP
/// layer is generic over this.
pub trait Stores:
  FollowStore
  + EntryStore
  + ProfileStore
  + CounterStore
  + GrantStore
  + ListStore
  + WatchlistStore {
}

impl<T> Stores for T where
  T: FollowStore
    + EntryStore
    + ProfileStore
    + CounterStore
    + GrantStore
    + ListStore
    + WatchlistStore
{
}
