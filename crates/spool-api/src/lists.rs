//! Handlers for user-curated lists. Thin CRUD; carried because list
//! creation feeds the `lists_created` counter.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use spool_core::{counter::CounterKey, store::{ListStore, Stores}};
use uuid::Uuid;

use crate::{
  AppState, bookkeeping,
  auth::Viewer,
  error::{ApiError, store_err},
};

#[derive(Debug, Deserialize)]
pub struct CreateListBody {
  pub title: String,
}

/// `POST /lists`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Json(body): Json<CreateListBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Stores,
{
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("list title must not be blank".into()));
  }

  let list = state
    .store
    .create_list(viewer.0, &body.title)
    .await
    .map_err(store_err)?;

  bookkeeping::adjust_all(state.store.as_ref(), viewer.0, &[(CounterKey::ListsCreated, 1)])
    .await;
  state.evals.enqueue(viewer.0).await;

  Ok((StatusCode::CREATED, Json(list)))
}

/// `DELETE /lists/:id` — 404 when absent or not owned.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: Stores,
{
  let removed = state
    .store
    .delete_list(id, viewer.0)
    .await
    .map_err(store_err)?;

  if !removed {
    return Err(ApiError::NotFound(format!("list {id} not found")));
  }

  bookkeeping::adjust_all(state.store.as_ref(), viewer.0, &[(CounterKey::ListsCreated, -1)])
    .await;
  state.evals.enqueue(viewer.0).await;

  Ok(StatusCode::NO_CONTENT)
}
