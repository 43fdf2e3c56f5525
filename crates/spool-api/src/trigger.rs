//! The evaluation trigger queue.
//!
//! Write paths never call the achievement evaluator inline; they enqueue the
//! affected user and a background worker drains the queue. `enqueue` awaits
//! channel capacity, so a burst of writes backpressures instead of silently
//! dropping triggers. Redundant delivery is safe — grants are idempotent —
//! and a missed evaluation self-heals on the user's next action.

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use spool_core::{
  awards,
  store::{CounterStore, GrantStore},
};

/// Cloneable handle for enqueueing evaluation triggers.
#[derive(Clone)]
pub struct EvalQueue {
  tx: mpsc::Sender<Uuid>,
}

impl EvalQueue {
  /// Queue `user` for evaluation. Waits for capacity under load; only fails
  /// silently if the worker has shut down, which is logged.
  pub async fn enqueue(&self, user: Uuid) {
    if self.tx.send(user).await.is_err() {
      tracing::error!(%user, "evaluation worker is gone, trigger dropped");
    }
  }
}

/// Spawn the background worker and return its queue handle.
///
/// A failed evaluation is retried once before being logged and dropped.
pub fn spawn_evaluator<S>(store: Arc<S>, capacity: usize) -> EvalQueue
where
  S: CounterStore + GrantStore + 'static,
{
  let (tx, mut rx) = mpsc::channel::<Uuid>(capacity);

  tokio::spawn(async move {
    while let Some(user) = rx.recv().await {
      if let Err(e) = awards::evaluate(store.as_ref(), user).await {
        tracing::warn!(%user, error = %e, "evaluation failed, retrying once");
        if let Err(e) = awards::evaluate(store.as_ref(), user).await {
          tracing::error!(%user, error = %e, "evaluation failed after retry");
        }
      }
    }
  });

  EvalQueue { tx }
}
