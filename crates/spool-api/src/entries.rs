//! Handlers for diary entries.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/entries` | Create; bumps log/review/genre counters |
//! | `PUT`    | `/entries/:id` | Edit payload; activity flag recomputed |
//! | `DELETE` | `/entries/:id` | Reverses the create-time counter bumps |
//! | `GET`    | `/users/:id/entries` | Diary view, ineligible entries included |
//! | `GET`    | `/subjects/:subject/entries` | Activity entries for one catalog item |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use spool_core::{
  entry::{Entry, EntryPayload, NewEntry},
  store::{EntryStore, Stores},
};
use uuid::Uuid;

use crate::{
  AppState, bookkeeping,
  auth::{Authed, Viewer},
  error::{ApiError, store_err},
};

const DEFAULT_PAGE: usize = 50;

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateEntryBody {
  pub title:       String,
  #[serde(default)]
  pub subject_ref: Option<String>,
  #[serde(default)]
  pub rating:      Option<u8>,
  #[serde(default)]
  pub review:      Option<String>,
  #[serde(default)]
  pub media_ref:   Option<String>,
  #[serde(default)]
  pub genres:      Vec<String>,
}

/// `POST /entries`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Json(body): Json<CreateEntryBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Stores,
{
  let input = NewEntry {
    owner_id:    viewer.0,
    subject_ref: body.subject_ref,
    payload:     EntryPayload {
      title:     body.title,
      rating:    body.rating,
      review:    body.review,
      media_ref: body.media_ref,
      genres:    body.genres,
    },
  };
  input.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let entry = state.store.insert_entry(input).await.map_err(store_err)?;

  bookkeeping::adjust_all(
    state.store.as_ref(),
    viewer.0,
    &bookkeeping::entry_deltas(&entry, 1),
  )
  .await;
  state.evals.enqueue(viewer.0).await;

  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EditEntryBody {
  pub title:     String,
  #[serde(default)]
  pub rating:    Option<u8>,
  #[serde(default)]
  pub review:    Option<String>,
  #[serde(default)]
  pub media_ref: Option<String>,
  #[serde(default)]
  pub genres:    Vec<String>,
}

/// `PUT /entries/:id` — full payload replacement. The catalog subject is
/// fixed at creation and absent from the body.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(id): Path<Uuid>,
  Json(body): Json<EditEntryBody>,
) -> Result<Json<Entry>, ApiError>
where
  S: Stores,
{
  let payload = EntryPayload {
    title:     body.title,
    rating:    body.rating,
    review:    body.review,
    media_ref: body.media_ref,
    genres:    body.genres,
  };
  payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

  // The old payload is needed to compute the counter delta of the edit.
  let old = state
    .store
    .get_entry(id)
    .await
    .map_err(store_err)?
    .filter(|e| e.owner_id == viewer.0)
    .ok_or_else(|| ApiError::NotFound(format!("entry {id} not found")))?;

  let updated = state
    .store
    .update_entry(id, viewer.0, payload)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("entry {id} not found")))?;

  bookkeeping::adjust_all(
    state.store.as_ref(),
    viewer.0,
    &bookkeeping::entry_edit_deltas(&old, &updated),
  )
  .await;
  state.evals.enqueue(viewer.0).await;

  Ok(Json(updated))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /entries/:id`
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
    .delete_entry(id, viewer.0)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("entry {id} not found")))?;

  bookkeeping::adjust_all(
    state.store.as_ref(),
    viewer.0,
    &bookkeeping::entry_deltas(&removed, -1),
  )
  .await;
  state.evals.enqueue(viewer.0).await;

  Ok(StatusCode::NO_CONTENT)
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageParams {
  pub limit: Option<usize>,
}

/// `GET /users/:id/entries[?limit=N]` — the diary view.
pub async fn diary<S>(
  State(state): State<AppState<S>>,
  _auth: Authed,
  Path(id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<Entry>>, ApiError>
where
  S: Stores,
{
  let entries = state
    .store
    .entries_for_owner(id, params.limit.unwrap_or(DEFAULT_PAGE))
    .await
    .map_err(store_err)?;
  Ok(Json(entries))
}

/// `GET /subjects/:subject/entries[?limit=N]`
pub async fn for_subject<S>(
  State(state): State<AppState<S>>,
  _auth: Authed,
  Path(subject): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<Entry>>, ApiError>
where
  S: Stores,
{
  let entries = state
    .store
    .entries_for_subject(&subject, params.limit.unwrap_or(DEFAULT_PAGE))
    .await
    .map_err(store_err)?;
  Ok(Json(entries))
}
