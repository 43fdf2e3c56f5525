//! The auth boundary.
//!
//! Identity is established by an upstream gateway; this service trusts the
//! `x-viewer-id` header it forwards. When an `api_token` is configured,
//! every route additionally requires `Authorization: Bearer <token>`.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Header carrying the authenticated viewer's id, set by the upstream
/// gateway.
pub const VIEWER_HEADER: &str = "x-viewer-id";

/// Instance-level credentials.
#[derive(Clone, Default)]
pub struct AuthConfig {
  /// Shared bearer token; `None` means an open instance.
  pub api_token: Option<String>,
}

/// Check the bearer token, if one is configured.
pub fn check_token(headers: &HeaderMap, config: &AuthConfig) -> Result<(), ApiError> {
  let Some(expected) = config.api_token.as_deref() else {
    return Ok(());
  };

  let presented = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(ApiError::Unauthorized)?;

  if presented != expected {
    return Err(ApiError::Unauthorized);
  }
  Ok(())
}

/// Zero-size marker: present in the handler means the bearer token (if any)
/// was valid. Used on routes that need no viewer identity.
pub struct Authed;

impl<S: Send + Sync> FromRequestParts<AppState<S>> for Authed {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    check_token(&parts.headers, &state.auth)?;
    Ok(Authed)
  }
}

/// The authenticated viewer, for viewer-scoped routes. Extraction fails with
/// 401 when the token or the viewer header is missing or malformed.
pub struct Viewer(pub Uuid);

impl<S: Send + Sync> FromRequestParts<AppState<S>> for Viewer {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    check_token(&parts.headers, &state.auth)?;

    let id = parts
      .headers
      .get(VIEWER_HEADER)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| Uuid::parse_str(v).ok())
      .ok_or(ApiError::Unauthorized)?;

    Ok(Viewer(id))
  }
}
