//! Handlers for public profiles.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use serde::Deserialize;
use spool_core::{
  social::{self, Profile},
  store::{ProfileStore, Stores},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{Authed, Viewer},
  error::{ApiError, store_err},
};

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
  pub handle:     String,
  #[serde(default)]
  pub avatar_ref: Option<String>,
}

/// `PUT /profile` — the viewer upserts their own public profile. The
/// verification flag is operator-managed and survives the upsert untouched.
pub async fn upsert<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Json(body): Json<ProfileBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: Stores,
{
  social::validate_handle(&body.handle)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let verified = state
    .store
    .profile(viewer.0)
    .await
    .map_err(store_err)?
    .is_some_and(|p| p.verified);

  let stored = state
    .store
    .upsert_profile(Profile {
      user_id:    viewer.0,
      handle:     body.handle,
      avatar_ref: body.avatar_ref,
      verified,
      updated_at: Utc::now(),
    })
    .await
    .map_err(store_err)?;

  Ok(Json(stored))
}

/// `GET /users/:id/profile` — 404 when absent.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _auth: Authed,
  Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError>
where
  S: Stores,
{
  let profile = state
    .store
    .profile(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("no profile for user {id}")))?;
  Ok(Json(profile))
}
