//! Handlers for the watchlist. The add/remove results report whether
//! anything changed, so the `watchlist_size` counter fires exactly once per
//! state transition.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use spool_core::{counter::CounterKey, store::{Stores, WatchlistStore}};

use crate::{
  AppState, bookkeeping,
  auth::Viewer,
  error::{ApiError, store_err},
};

/// `PUT /watchlist/:subject` — 204 when already present.
pub async fn add<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(subject): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Stores,
{
  let item = state
    .store
    .watchlist_add(viewer.0, &subject)
    .await
    .map_err(store_err)?;

  match item {
    Some(item) => {
      bookkeeping::adjust_all(
        state.store.as_ref(),
        viewer.0,
        &[(CounterKey::WatchlistSize, 1)],
      )
      .await;
      state.evals.enqueue(viewer.0).await;
      Ok((StatusCode::CREATED, Json(item)).into_response())
    }
    None => Ok(StatusCode::NO_CONTENT.into_response()),
  }
}

/// `DELETE /watchlist/:subject` — 404 when not on the list.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(subject): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: Stores,
{
  let removed = state
    .store
    .watchlist_remove(viewer.0, &subject)
    .await
    .map_err(store_err)?;

  if !removed {
    return Err(ApiError::NotFound(format!("{subject} is not on the watchlist")));
  }

  bookkeeping::adjust_all(
    state.store.as_ref(),
    viewer.0,
    &[(CounterKey::WatchlistSize, -1)],
  )
  .await;
  state.evals.enqueue(viewer.0).await;

  Ok(StatusCode::NO_CONTENT)
}
