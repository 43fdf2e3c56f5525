//! The achievement evaluator.
//!
//! Invoked after any counter-affecting action, fire-and-forget. The same
//! user may be evaluated concurrently from two near-simultaneous triggers;
//! correctness rests entirely on the grant store's conditional insert —
//! callers never serialize invocations. A lost race is benign, and a stale
//! counter snapshot self-heals on the user's next action.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  achievement::{CATALOG, Eligibility, Grant},
  store::{CounterStore, GrantStore},
};

/// Failure of one of the two upfront reads. Per-definition grant failures
/// are logged and absorbed instead.
#[derive(Debug, Error)]
pub enum EvalError {
  #[error("could not read counter snapshot: {0}")]
  Counters(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("could not read granted achievements: {0}")]
  Grants(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Evaluate the full catalog for `user` against their current counters.
///
/// Returns the grants newly created by this invocation; the triggering
/// caller consumes nothing.
pub async fn evaluate<S>(store: &S, user: Uuid) -> Result<Vec<Grant>, EvalError>
where
  S: CounterStore + GrantStore,
{
  evaluate_at(store, user, Utc::now()).await
}

/// [`evaluate`] with an explicit trigger time, for calendar-date predicates
/// and tests.
pub async fn evaluate_at<S>(
  store: &S,
  user:  Uuid,
  at:    DateTime<Utc>,
) -> Result<Vec<Grant>, EvalError>
where
  S: CounterStore + GrantStore,
{
  let snapshot = store
    .snapshot(user)
    .await
    .map_err(|e| EvalError::Counters(Box::new(e)))?;
  let granted = store
    .granted_ids(user)
    .await
    .map_err(|e| EvalError::Grants(Box::new(e)))?;

  let mut new_grants = Vec::new();

  for def in CATALOG {
    if granted.contains(def.id) {
      continue;
    }
    match def.predicate.check(&snapshot, at) {
      Eligibility::NotYet => {}
      Eligibility::Unsupported => {
        tracing::debug!(achievement = def.id, "predicate has no data source, skipping");
      }
      Eligibility::Earned => match store.try_grant(user, def.id, at).await {
        Ok(Some(grant)) => {
          tracing::info!(%user, achievement = def.id, "achievement granted");
          new_grants.push(grant);
        }
        Ok(None) => {
          // A concurrent evaluation granted it first.
          tracing::trace!(%user, achievement = def.id, "grant race lost");
        }
        Err(e) => {
          // One bad grant must not block the rest of the catalog.
          tracing::warn!(%user, achievement = def.id, error = %e, "grant attempt failed");
        }
      },
    }
  }

  Ok(new_grants)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
