//! The achievement catalog: static rule definitions and the grants they
//! produce.
//!
//! Definitions are compiled in and never mutated at runtime. Each predicate
//! is a variant of a closed enum, matched exhaustively — predicate kinds the
//! system cannot yet evaluate are explicit [`Eligibility::Unsupported`]
//! cases rather than silent no-ops.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::counter::{CounterKey, CounterSnapshot, WiredGenre};

// ─── Predicates ──────────────────────────────────────────────────────────────

/// The rule attached to an achievement definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
  /// A named counter has reached `threshold`.
  CounterAtLeast { counter: CounterKeyTag, threshold: u64 },
  /// A genre-scoped counter has reached `threshold`. Only the two wired
  /// genres have a counter source.
  GenreCountAtLeast { genre: WiredGenre, threshold: u64 },
  /// The triggering action happened on this calendar date, independent of
  /// any counter.
  OnDate { month: u32, day: u32 },
  /// Distinct genres logged — no counter source exists yet.
  UniqueGenresAtLeast { threshold: u64 },
  /// Consecutive days with at least one entry — no counter source exists
  /// yet.
  StreakAtLeast { days: u64 },
  /// Every season of one show logged — needs a cross-entity scan that
  /// simple counters cannot express.
  SeasonsCompleted,
}

/// Serde-friendly mirror of [`CounterKey`] without the genre arm, so catalog
/// definitions stay `const`-constructible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKeyTag {
  ItemsLogged,
  ReviewsWritten,
  ListsCreated,
  Followers,
  Following,
  WatchlistSize,
}

impl From<CounterKeyTag> for CounterKey {
  fn from(tag: CounterKeyTag) -> Self {
    match tag {
      CounterKeyTag::ItemsLogged => Self::ItemsLogged,
      CounterKeyTag::ReviewsWritten => Self::ReviewsWritten,
      CounterKeyTag::ListsCreated => Self::ListsCreated,
      CounterKeyTag::Followers => Self::Followers,
      CounterKeyTag::Following => Self::Following,
      CounterKeyTag::WatchlistSize => Self::WatchlistSize,
    }
  }
}

/// The outcome of checking one predicate against one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
  Earned,
  NotYet,
  /// The predicate kind has no working data source. Skipped by the
  /// evaluator; the rest of the catalog still runs.
  Unsupported,
}

impl Predicate {
  /// Evaluate against a counter snapshot and the trigger time.
  pub fn check(&self, snapshot: &CounterSnapshot, at: DateTime<Utc>) -> Eligibility {
    match *self {
      Self::CounterAtLeast { counter, threshold } => {
        met(snapshot.get(counter.into()) >= threshold)
      }
      Self::GenreCountAtLeast { genre, threshold } => {
        met(snapshot.get(CounterKey::Genre(genre)) >= threshold)
      }
      Self::OnDate { month, day } => met(at.month() == month && at.day() == day),
      Self::UniqueGenresAtLeast { .. }
      | Self::StreakAtLeast { .. }
      | Self::SeasonsCompleted => Eligibility::Unsupported,
    }
  }
}

fn met(b: bool) -> Eligibility {
  if b { Eligibility::Earned } else { Eligibility::NotYet }
}

// ─── Definitions ─────────────────────────────────────────────────────────────

/// One static catalog row.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AchievementDef {
  pub id:          &'static str,
  pub name:        &'static str,
  pub description: &'static str,
  pub predicate:   Predicate,
}

macro_rules! counter_def {
  ($id:literal, $name:literal, $desc:literal, $counter:ident >= $n:literal) => {
    AchievementDef {
      id:          $id,
      name:        $name,
      description: $desc,
      predicate:   Predicate::CounterAtLeast {
        counter:   CounterKeyTag::$counter,
        threshold: $n,
      },
    }
  };
}

/// The full catalog, in display order.
pub const CATALOG: &[AchievementDef] = &[
  counter_def!("first-entry", "First Reel", "Log your first item.", ItemsLogged >= 1),
  counter_def!("log-10", "Regular", "Log 10 items.", ItemsLogged >= 10),
  counter_def!("log-100", "Cinephile", "Log 100 items.", ItemsLogged >= 100),
  counter_def!("log-500", "Archivist", "Log 500 items.", ItemsLogged >= 500),
  counter_def!("first-review", "Critic's Debut", "Write your first review.", ReviewsWritten >= 1),
  counter_def!("review-25", "Columnist", "Write 25 reviews.", ReviewsWritten >= 25),
  counter_def!("first-list", "Curator", "Create your first list.", ListsCreated >= 1),
  counter_def!("list-10", "Programmer", "Create 10 lists.", ListsCreated >= 10),
  counter_def!("followers-10", "Small Following", "Reach 10 followers.", Followers >= 10),
  counter_def!("followers-100", "Crowd Pleaser", "Reach 100 followers.", Followers >= 100),
  counter_def!("following-25", "Well Connected", "Follow 25 people.", Following >= 25),
  counter_def!("watchlist-50", "Backlog", "Keep 50 items on your watchlist.", WatchlistSize >= 50),
  AchievementDef {
    id:          "horror-15",
    name:        "Night Shift",
    description: "Log 15 horror titles.",
    predicate:   Predicate::GenreCountAtLeast { genre: WiredGenre::Horror, threshold: 15 },
  },
  AchievementDef {
    id:          "documentary-10",
    name:        "Vérité",
    description: "Log 10 documentaries.",
    predicate:   Predicate::GenreCountAtLeast { genre: WiredGenre::Documentary, threshold: 10 },
  },
  AchievementDef {
    id:          "halloween",
    name:        "All Hallows",
    description: "Log something on October 31st.",
    predicate:   Predicate::OnDate { month: 10, day: 31 },
  },
  AchievementDef {
    id:          "new-year",
    name:        "Fresh Start",
    description: "Log something on January 1st.",
    predicate:   Predicate::OnDate { month: 1, day: 1 },
  },
  AchievementDef {
    id:          "genre-tourist",
    name:        "Genre Tourist",
    description: "Log items across 10 distinct genres.",
    predicate:   Predicate::UniqueGenresAtLeast { threshold: 10 },
  },
  AchievementDef {
    id:          "streak-7",
    name:        "Daily Ritual",
    description: "Log something 7 days in a row.",
    predicate:   Predicate::StreakAtLeast { days: 7 },
  },
  AchievementDef {
    id:          "completionist",
    name:        "Completionist",
    description: "Log every season of one show.",
    predicate:   Predicate::SeasonsCompleted,
  },
];

/// Look up a definition by id.
pub fn definition(id: &str) -> Option<&'static AchievementDef> {
  CATALOG.iter().find(|d| d.id == id)
}

// ─── Grants ──────────────────────────────────────────────────────────────────

/// One earned achievement. Created at most once per `(user, achievement)`
/// pair; never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
  pub user_id:        Uuid,
  pub achievement_id: String,
  pub earned_at:      DateTime<Utc>,
}
