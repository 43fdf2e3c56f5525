//! Handlers for the achievement catalog and a user's grants.
//!
//! Simple projections over the grant ledger and the static catalog; the
//! write side lives entirely in the evaluator.

use axum::{
  Json,
  extract::{Path, State},
};
use spool_core::{
  achievement::{AchievementDef, CATALOG, Grant},
  store::{GrantStore, Stores},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authed,
  error::{ApiError, store_err},
};

/// `GET /achievements` — the static catalog, for client-side rendering.
pub async fn catalog<S>(
  State(_state): State<AppState<S>>,
  _auth: Authed,
) -> Json<&'static [AchievementDef]>
where
  S: Stores,
{
  Json(CATALOG)
}

/// `GET /users/:id/achievements` — the user's grants, newest first.
pub async fn grants<S>(
  State(state): State<AppState<S>>,
  _auth: Authed,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Grant>>, ApiError>
where
  S: Stores,
{
  let rows = state.store.grants_for(id).await.map_err(store_err)?;
  Ok(Json(rows))
}
