//! JSON REST API for Spool.
//!
//! Exposes an axum [`Router`] backed by any [`spool_core::store::Stores`]
//! implementation. Identity is established upstream; this layer reads the
//! viewer from the `x-viewer-id` header and optionally requires a bearer
//! token. TLS and transport concerns are the caller's responsibility.
//!
//! Every write handler follows the same shape: primary write, then
//! best-effort counter adjustments whose failures are logged and swallowed,
//! then an achievement-evaluation enqueue.

pub mod achievements;
pub mod auth;
pub mod bookkeeping;
pub mod entries;
pub mod error;
pub mod feed;
pub mod follows;
pub mod lists;
pub mod profiles;
pub mod trigger;
pub mod watchlist;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use spool_core::{feed::FeedConfig, store::Stores};

pub use auth::AuthConfig;
pub use error::ApiError;
pub use trigger::{EvalQueue, spawn_evaluator};

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
  pub evals: EvalQueue,
  pub auth:  Arc<AuthConfig>,
  pub feed:  FeedConfig,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      evals: self.evals.clone(),
      auth:  Arc::clone(&self.auth),
      feed:  self.feed.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: Stores + 'static,
{
  Router::new()
    // Feed
    .route("/feed", get(feed::handler::<S>))
    // Entries
    .route("/entries", post(entries::create::<S>))
    .route(
      "/entries/{id}",
      put(entries::update::<S>).delete(entries::remove::<S>),
    )
    // Follow graph
    .route("/follows", post(follows::create::<S>))
    .route("/follows/{followee}", delete(follows::remove::<S>))
    .route("/users/{id}/followers", get(follows::followers::<S>))
    .route("/users/{id}/following", get(follows::following::<S>))
    // Achievements
    .route("/achievements", get(achievements::catalog::<S>))
    .route("/users/{id}/achievements", get(achievements::grants::<S>))
    // Profiles
    .route("/profile", put(profiles::upsert::<S>))
    .route("/users/{id}/profile", get(profiles::get_one::<S>))
    // Diary and subject reads
    .route("/users/{id}/entries", get(entries::diary::<S>))
    .route("/subjects/{subject}/entries", get(entries::for_subject::<S>))
    // Lists
    .route("/lists", post(lists::create::<S>))
    .route("/lists/{id}", delete(lists::remove::<S>))
    // Watchlist
    .route(
      "/watchlist/{subject}",
      put(watchlist::add::<S>).delete(watchlist::remove::<S>),
    )
    .with_state(state)
}

#[cfg(test)]
mod tests;
