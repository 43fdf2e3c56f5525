//! The social graph and identity types: follow edges, public profiles, and
//! the thin collaborator entities (lists, watchlist rows) whose write paths
//! feed the per-user counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Follow graph ────────────────────────────────────────────────────────────

/// A directed edge in the follow graph. Unique per ordered pair; self-edges
/// are rejected before they reach any store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowEdge {
  pub follower_id: Uuid,
  pub followee_id: Uuid,
  pub followed_at: DateTime<Utc>,
}

/// Reject self-follows with a typed error. Called by write paths before the
/// store sees the edge; backends additionally enforce this with a CHECK.
pub fn validate_follow(follower: Uuid, followee: Uuid) -> Result<()> {
  if follower == followee {
    return Err(Error::SelfFollow);
  }
  Ok(())
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// The minimal public identity projection for a user. Users without a
/// profile row are legal; readers degrade to [`Actor::placeholder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub user_id:    Uuid,
  pub handle:     String,
  pub avatar_ref: Option<String>,
  pub verified:   bool,
  pub updated_at: DateTime<Utc>,
}

/// Reject blank handles before they reach the profile store.
pub fn validate_handle(handle: &str) -> Result<()> {
  if handle.trim().is_empty() {
    return Err(Error::BlankHandle);
  }
  Ok(())
}

/// The resolved identity attached to a feed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub handle:     String,
  pub avatar_ref: Option<String>,
  pub verified:   bool,
}

impl Actor {
  /// Stand-in for a deleted or unresolvable user. Entries are never dropped
  /// for identity reasons.
  pub fn placeholder() -> Self {
    Self {
      handle:     "unknown user".into(),
      avatar_ref: None,
      verified:   false,
    }
  }
}

impl From<&Profile> for Actor {
  fn from(p: &Profile) -> Self {
    Self {
      handle:     p.handle.clone(),
      avatar_ref: p.avatar_ref.clone(),
      verified:   p.verified,
    }
  }
}

// ─── Collaborator entities ───────────────────────────────────────────────────

/// A user-curated list. Carried here only because list creation and deletion
/// feed the `lists_created` counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
  pub list_id:    Uuid,
  pub owner_id:   Uuid,
  pub title:      String,
  pub created_at: DateTime<Utc>,
}

/// A watchlist row — one catalog item a user intends to watch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistItem {
  pub owner_id:    Uuid,
  pub subject_ref: String,
  pub added_at:    DateTime<Utc>,
}
