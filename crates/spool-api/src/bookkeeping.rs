//! Best-effort counter bookkeeping for the write paths.
//!
//! Counter adjustments are a secondary effect: a failure is logged and
//! swallowed, never rolled back into the primary write. The system prefers
//! an undercounted-but-consistent primary entity over blocking user actions
//! on aggregate maintenance; the evaluator tolerates the resulting drift.

use std::collections::HashMap;

use uuid::Uuid;

use spool_core::{
  counter::{CounterKey, WiredGenre},
  entry::Entry,
  store::CounterStore,
};

/// Apply a set of counter deltas, logging and continuing past failures.
pub async fn adjust_all<S: CounterStore>(
  store:  &S,
  user:   Uuid,
  deltas: &[(CounterKey, i64)],
) {
  for &(key, delta) in deltas {
    if delta == 0 {
      continue;
    }
    if let Err(e) = store.adjust(user, key, delta).await {
      tracing::warn!(
        %user,
        counter = key.as_str(),
        delta,
        error = %e,
        "counter adjustment failed, continuing"
      );
    }
  }
}

/// The counter deltas implied by creating (`sign = 1`) or deleting
/// (`sign = -1`) an entry.
pub fn entry_deltas(entry: &Entry, sign: i64) -> Vec<(CounterKey, i64)> {
  let mut deltas = Vec::new();
  if entry.subject_ref.is_some() {
    deltas.push((CounterKey::ItemsLogged, sign));
    for genre in wired_genres(&entry.payload.genres) {
      deltas.push((CounterKey::Genre(genre), sign));
    }
  }
  if entry.payload.has_review() {
    deltas.push((CounterKey::ReviewsWritten, sign));
  }
  deltas
}

/// The net deltas of an edit: reverse the old payload's contribution and
/// apply the new one's. `items_logged` cancels out since the subject is
/// immutable.
pub fn entry_edit_deltas(old: &Entry, new: &Entry) -> Vec<(CounterKey, i64)> {
  let mut merged: HashMap<CounterKey, i64> = HashMap::new();
  for (key, delta) in entry_deltas(old, -1).into_iter().chain(entry_deltas(new, 1)) {
    *merged.entry(key).or_insert(0) += delta;
  }
  merged.retain(|_, delta| *delta != 0);
  merged.into_iter().collect()
}

/// Distinct wired genres present in an entry's genre slugs.
fn wired_genres(genres: &[String]) -> Vec<WiredGenre> {
  let mut wired: Vec<WiredGenre> = genres
    .iter()
    .filter_map(|slug| WiredGenre::from_slug(slug))
    .collect();
  wired.sort_by_key(|g| g.slug());
  wired.dedup();
  wired
}
