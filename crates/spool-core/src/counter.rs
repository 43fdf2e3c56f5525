//! Per-user aggregate counters.
//!
//! Counters are adjusted only by write paths, through an atomic
//! increment/decrement API clamped at zero. This crate's engines never
//! mutate them — the evaluator reads an immutable point-in-time
//! [`CounterSnapshot`] and nothing else. Because the adjustment is a
//! best-effort secondary effect of the primary write, a snapshot may be
//! slightly stale or slightly ahead of the action that triggered it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// The two genres wired to a dedicated counter. Other genres appear in entry
/// payloads but are not counted; see [`crate::achievement::Predicate`] for
/// the predicate kinds that would need them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WiredGenre {
  Horror,
  Documentary,
}

impl WiredGenre {
  pub fn slug(self) -> &'static str {
    match self {
      Self::Horror => "horror",
      Self::Documentary => "documentary",
    }
  }

  /// The wired genre for a payload genre slug, if any.
  pub fn from_slug(slug: &str) -> Option<Self> {
    match slug {
      "horror" => Some(Self::Horror),
      "documentary" => Some(Self::Documentary),
      _ => None,
    }
  }
}

/// The closed set of counter names. The string form is the storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKey {
  ItemsLogged,
  ReviewsWritten,
  ListsCreated,
  Followers,
  Following,
  WatchlistSize,
  Genre(WiredGenre),
}

impl CounterKey {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::ItemsLogged => "items_logged",
      Self::ReviewsWritten => "reviews_written",
      Self::ListsCreated => "lists_created",
      Self::Followers => "followers",
      Self::Following => "following",
      Self::WatchlistSize => "watchlist_size",
      Self::Genre(WiredGenre::Horror) => "genre:horror",
      Self::Genre(WiredGenre::Documentary) => "genre:documentary",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "items_logged" => Ok(Self::ItemsLogged),
      "reviews_written" => Ok(Self::ReviewsWritten),
      "lists_created" => Ok(Self::ListsCreated),
      "followers" => Ok(Self::Followers),
      "following" => Ok(Self::Following),
      "watchlist_size" => Ok(Self::WatchlistSize),
      "genre:horror" => Ok(Self::Genre(WiredGenre::Horror)),
      "genre:documentary" => Ok(Self::Genre(WiredGenre::Documentary)),
      other => Err(Error::UnknownCounter(other.to_owned())),
    }
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// A point-in-time read of one user's counters. Absent keys read as zero —
/// a user with no counter row has simply never done the thing.
#[derive(Debug, Clone, Default)]
pub struct CounterSnapshot {
  values: HashMap<CounterKey, u64>,
}

impl CounterSnapshot {
  pub fn new(values: HashMap<CounterKey, u64>) -> Self { Self { values } }

  pub fn get(&self, key: CounterKey) -> u64 {
    self.values.get(&key).copied().unwrap_or(0)
  }
}

impl FromIterator<(CounterKey, u64)> for CounterSnapshot {
  fn from_iter<I: IntoIterator<Item = (CounterKey, u64)>>(iter: I) -> Self {
    Self { values: iter.into_iter().collect() }
  }
}
