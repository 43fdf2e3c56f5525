//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Genre lists are compact
//! JSON arrays. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use spool_core::{
  counter::CounterKey,
  entry::{Entry, EntryPayload},
  social::{FollowEdge, Profile},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Counter keys ────────────────────────────────────────────────────────────

pub fn encode_counter_key(key: CounterKey) -> &'static str { key.as_str() }

pub fn decode_counter_key(s: &str) -> Result<CounterKey> {
  Ok(CounterKey::parse(s)?)
}

// ─── Genres ──────────────────────────────────────────────────────────────────

pub fn encode_genres(genres: &[String]) -> Result<String> {
  Ok(serde_json::to_string(genres)?)
}

pub fn decode_genres(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `entries` row.
pub struct RawEntry {
  pub entry_id:    String,
  pub owner_id:    String,
  pub subject_ref: Option<String>,
  pub created_at:  String,
  pub activity:    bool,
  pub title:       String,
  pub rating:      Option<u8>,
  pub review:      Option<String>,
  pub media_ref:   Option<String>,
  pub genres:      String,
}

impl RawEntry {
  /// The column list matching the field order above.
  pub const COLUMNS: &'static str =
    "entry_id, owner_id, subject_ref, created_at, activity, \
     title, rating, review, media_ref, genres";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:    row.get(0)?,
      owner_id:    row.get(1)?,
      subject_ref: row.get(2)?,
      created_at:  row.get(3)?,
      activity:    row.get(4)?,
      title:       row.get(5)?,
      rating:      row.get(6)?,
      review:      row.get(7)?,
      media_ref:   row.get(8)?,
      genres:      row.get(9)?,
    })
  }

  pub fn into_entry(self) -> Result<Entry> {
    Ok(Entry {
      entry_id:    decode_uuid(&self.entry_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      subject_ref: self.subject_ref,
      created_at:  decode_dt(&self.created_at)?,
      activity:    self.activity,
      payload:     EntryPayload {
        title:     self.title,
        rating:    self.rating,
        review:    self.review,
        media_ref: self.media_ref,
        genres:    decode_genres(&self.genres)?,
      },
    })
  }
}

/// Raw strings read directly from a `follows` row.
pub struct RawFollow {
  pub follower_id: String,
  pub followee_id: String,
  pub followed_at: String,
}

impl RawFollow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      follower_id: row.get(0)?,
      followee_id: row.get(1)?,
      followed_at: row.get(2)?,
    })
  }

  pub fn into_edge(self) -> Result<FollowEdge> {
    Ok(FollowEdge {
      follower_id: decode_uuid(&self.follower_id)?,
      followee_id: decode_uuid(&self.followee_id)?,
      followed_at: decode_dt(&self.followed_at)?,
    })
  }
}

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub user_id:    String,
  pub handle:     String,
  pub avatar_ref: Option<String>,
  pub verified:   bool,
  pub updated_at: String,
}

impl RawProfile {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      handle:     row.get(1)?,
      avatar_ref: row.get(2)?,
      verified:   row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      user_id:    decode_uuid(&self.user_id)?,
      handle:     self.handle,
      avatar_ref: self.avatar_ref,
      verified:   self.verified,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

