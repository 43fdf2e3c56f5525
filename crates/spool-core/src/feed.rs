//! The feed aggregator — fan-out-on-read over the viewer's follow graph.
//!
//! There is no precomputed feed table: the entry store is indexed by owner,
//! so the only read-side option is one bounded query per followee, merged
//! and truncated. Each leg is independently bounded and independently
//! fallible — a single unreachable or throttled followee must never blank
//! the viewer's feed.

use std::{
  collections::{HashMap, HashSet},
  time::Duration,
};

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;
use uuid::Uuid;

use crate::{
  entry::Entry,
  social::Actor,
  store::{EntryStore, FollowStore, ProfileStore},
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Tuning knobs for [`build_feed`].
#[derive(Debug, Clone)]
pub struct FeedConfig {
  /// Entries fetched per followee. Caps what one prolific account can
  /// contribute before the merge.
  pub per_followee:     usize,
  /// Upper bound on the returned feed length.
  pub max_items:        usize,
  /// Deadline for each followee query, applied per leg so one slow
  /// followee cannot dominate total feed latency.
  pub followee_timeout: Duration,
}

impl Default for FeedConfig {
  fn default() -> Self {
    Self {
      per_followee:     5,
      max_items:        30,
      followee_timeout: Duration::from_millis(400),
    }
  }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// One feed row: an activity-eligible entry joined with its resolved actor.
/// Derived per request, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
  #[serde(flatten)]
  pub entry: Entry,
  pub actor: Actor,
}

/// The only fatal failure mode: without the viewer's own follow list there
/// is no meaningful degraded response.
#[derive(Debug, Error)]
pub enum FeedError {
  #[error("could not load follow list: {0}")]
  Follows(#[source] Box<dyn std::error::Error + Send + Sync>),
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Build the viewer's feed: most-recent-first, at most `max_items` entries.
///
/// An empty followee set yields an empty feed, not an error. Failed or
/// timed-out followee queries contribute zero entries; a failed identity
/// batch degrades every actor to the placeholder. In both degraded cases
/// the response is still a success.
pub async fn build_feed<S>(
  store:  &S,
  viewer: Uuid,
  config: &FeedConfig,
) -> Result<Vec<FeedItem>, FeedError>
where
  S: FollowStore + EntryStore + ProfileStore,
{
  let followees = store
    .followees(viewer)
    .await
    .map_err(|e| FeedError::Follows(Box::new(e)))?;

  if followees.is_empty() {
    return Ok(Vec::new());
  }

  // Fan out one bounded, deadlined query per followee.
  let legs = followees.iter().map(|edge| {
    let owner = edge.followee_id;
    async move {
      let result =
        timeout(config.followee_timeout, store.recent_activity(owner, config.per_followee))
          .await;
      (owner, result)
    }
  });

  let mut entries: Vec<Entry> = Vec::new();
  for (owner, result) in join_all(legs).await {
    match result {
      Ok(Ok(batch)) => entries.extend(batch),
      Ok(Err(e)) => {
        tracing::warn!(followee = %owner, error = %e, "followee query failed, skipping");
      }
      Err(_) => {
        tracing::warn!(followee = %owner, "followee query timed out, skipping");
      }
    }
  }

  // Merge: newest first, ties broken by ascending entry id for determinism.
  entries.sort_by(|a, b| {
    b.created_at
      .cmp(&a.created_at)
      .then_with(|| a.entry_id.cmp(&b.entry_id))
  });
  entries.truncate(config.max_items);

  let actors = resolve_actors(store, &entries).await;

  Ok(
    entries
      .into_iter()
      .map(|entry| {
        let actor = actors
          .get(&entry.owner_id)
          .cloned()
          .unwrap_or_else(Actor::placeholder);
        FeedItem { entry, actor }
      })
      .collect(),
  )
}

/// Resolve the distinct actor ids in one batched lookup. On failure, return
/// an empty map so every entry degrades to the placeholder actor.
async fn resolve_actors<S: ProfileStore>(
  store:   &S,
  entries: &[Entry],
) -> HashMap<Uuid, Actor> {
  let ids: Vec<Uuid> = entries
    .iter()
    .map(|e| e.owner_id)
    .collect::<HashSet<_>>()
    .into_iter()
    .collect();

  if ids.is_empty() {
    return HashMap::new();
  }

  match store.profiles_by_ids(&ids).await {
    Ok(profiles) => profiles
      .iter()
      .map(|p| (p.user_id, Actor::from(p)))
      .collect(),
    Err(e) => {
      tracing::warn!(error = %e, "identity batch lookup failed, using placeholders");
      HashMap::new()
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
