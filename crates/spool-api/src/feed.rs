//! Handler for `GET /feed`.

use axum::{Json, extract::State};
use spool_core::{
  feed::{FeedItem, build_feed},
  store::Stores,
};

use crate::{
  AppState,
  auth::Viewer,
  error::{ApiError, store_err},
};

/// `GET /feed` — the viewer's aggregated feed. An empty list is a valid
/// response; degraded followee legs are handled inside the aggregator.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
) -> Result<Json<Vec<FeedItem>>, ApiError>
where
  S: Stores,
{
  let items = build_feed(state.store.as_ref(), viewer.0, &state.feed)
    .await
    .map_err(store_err)?;
  Ok(Json(items))
}
