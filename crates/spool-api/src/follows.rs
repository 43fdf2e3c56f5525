//! Handlers for the follow graph.
//!
//! A successful follow or unfollow adjusts `following` on the viewer and
//! `followers` on the other side, then enqueues evaluation for both users —
//! follower-count achievements belong to the followee, not the actor.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use spool_core::{
  counter::CounterKey,
  social::{self, FollowEdge},
  store::{FollowStore, Stores},
};
use uuid::Uuid;

use crate::{
  AppState, bookkeeping,
  auth::{Authed, Viewer},
  error::{ApiError, store_err},
};

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FollowBody {
  pub followee_id: Uuid,
}

/// `POST /follows` — body: `{"followee_id":"..."}`. 204 when the edge
/// already existed.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Json(body): Json<FollowBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Stores,
{
  social::validate_follow(viewer.0, body.followee_id)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let edge = state
    .store
    .follow(viewer.0, body.followee_id)
    .await
    .map_err(store_err)?;

  match edge {
    Some(edge) => {
      bookkeeping::adjust_all(state.store.as_ref(), viewer.0, &[(CounterKey::Following, 1)])
        .await;
      bookkeeping::adjust_all(
        state.store.as_ref(),
        body.followee_id,
        &[(CounterKey::Followers, 1)],
      )
      .await;
      state.evals.enqueue(viewer.0).await;
      state.evals.enqueue(body.followee_id).await;
      Ok((StatusCode::CREATED, Json(edge)).into_response())
    }
    None => Ok(StatusCode::NO_CONTENT.into_response()),
  }
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /follows/:followee` — 404 when not following.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(followee): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: Stores,
{
  let removed = state
    .store
    .unfollow(viewer.0, followee)
    .await
    .map_err(store_err)?;

  if !removed {
    return Err(ApiError::NotFound(format!("not following {followee}")));
  }

  bookkeeping::adjust_all(state.store.as_ref(), viewer.0, &[(CounterKey::Following, -1)])
    .await;
  bookkeeping::adjust_all(state.store.as_ref(), followee, &[(CounterKey::Followers, -1)])
    .await;
  state.evals.enqueue(viewer.0).await;
  state.evals.enqueue(followee).await;

  Ok(StatusCode::NO_CONTENT)
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /users/:id/followers`
pub async fn followers<S>(
  State(state): State<AppState<S>>,
  _auth: Authed,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<FollowEdge>>, ApiError>
where
  S: Stores,
{
  let edges = state.store.followers(id).await.map_err(store_err)?;
  Ok(Json(edges))
}

/// `GET /users/:id/following`
pub async fn following<S>(
  State(state): State<AppState<S>>,
  _auth: Authed,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<FollowEdge>>, ApiError>
where
  S: Stores,
{
  let edges = state.store.followees(id).await.map_err(store_err)?;
  Ok(Json(edges))
}
