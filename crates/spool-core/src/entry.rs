//! Diary entries — the fundamental unit of the Spool watch diary.
//!
//! An entry records that a user consumed (or is writing about) a catalog
//! item. Only a subset of entries is *activity-eligible*, i.e. visible in
//! followers' feeds: an entry qualifies exactly when it carries a rating, a
//! non-blank review, or is authored as a standalone post (no catalog
//! subject). Plain "watched, no opinion" entries stay in the owner's diary
//! but never surface in a feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Payload ─────────────────────────────────────────────────────────────────

/// The author-controlled content of an entry. Opaque to the feed aggregator;
/// it only matters for computing the activity flag and the counter deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPayload {
  pub title:     String,
  /// Half-star scale, 1..=10. `None` means unrated.
  pub rating:    Option<u8>,
  pub review:    Option<String>,
  /// Opaque reference to an uploaded still or poster; storage lives
  /// elsewhere.
  pub media_ref: Option<String>,
  /// Genre slugs copied from the catalog item at log time.
  pub genres:    Vec<String>,
}

impl EntryPayload {
  /// `true` when the review field holds actual written text.
  pub fn has_review(&self) -> bool {
    self.review.as_deref().is_some_and(|r| !r.trim().is_empty())
  }

  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::BlankTitle);
    }
    if let Some(r) = self.rating
      && !(1..=10).contains(&r)
    {
      return Err(Error::RatingOutOfRange(r));
    }
    Ok(())
  }
}

/// Whether an entry with this subject and payload belongs in feeds.
///
/// The flag is derived, never client-supplied, and is recomputed on every
/// edit — removing a rating demotes an entry out of the feed.
pub fn activity_flag(subject_ref: Option<&str>, payload: &EntryPayload) -> bool {
  payload.rating.is_some() || payload.has_review() || subject_ref.is_none()
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A persisted diary entry. `entry_id`, `created_at`, and `activity` are
/// assigned by the store; `subject_ref` is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
  pub entry_id:    Uuid,
  pub owner_id:    Uuid,
  /// Opaque id of the catalog item logged; `None` for standalone posts.
  pub subject_ref: Option<String>,
  pub created_at:  DateTime<Utc>,
  /// Derived feed-eligibility flag; see [`activity_flag`].
  pub activity:    bool,
  #[serde(flatten)]
  pub payload:     EntryPayload,
}

/// Input to [`crate::store::EntryStore::insert_entry`].
#[derive(Debug, Clone)]
pub struct NewEntry {
  pub owner_id:    Uuid,
  pub subject_ref: Option<String>,
  pub payload:     EntryPayload,
}

impl NewEntry {
  pub fn validate(&self) -> Result<()> { self.payload.validate() }
}
