//! Router-level tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, Response, StatusCode, header},
};
use serde_json::{Value, json};
use spool_core::feed::FeedConfig;
use spool_store_sqlite::SqliteStore;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, AuthConfig, auth::VIEWER_HEADER, router, trigger};

// ─── Harness ─────────────────────────────────────────────────────────────────

async fn test_app(token: Option<&str>) -> Router<()> {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let evals = trigger::spawn_evaluator(Arc::clone(&store), 64);
  router(AppState {
    store,
    evals,
    auth: Arc::new(AuthConfig { api_token: token.map(String::from) }),
    feed: FeedConfig::default(),
  })
}

fn request(
  method: &str,
  uri: &str,
  viewer: Option<Uuid>,
  body: Option<Value>,
) -> Request<Body> {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(viewer) = viewer {
    builder = builder.header(VIEWER_HEADER, viewer.to_string());
  }
  match body {
    Some(value) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(serde_json::to_vec(&value).unwrap()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  }
}

async fn json_body(response: Response<Body>) -> Value {
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn entry_body(title: &str, rating: Option<u8>, subject: Option<&str>) -> Value {
  json!({
    "title":       title,
    "rating":      rating,
    "subject_ref": subject,
    "genres":      [],
  })
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn viewer_header_is_required_on_viewer_routes() {
  let app = test_app(None).await;

  let response =
    app.oneshot(request("GET", "/feed", None, None)).await.unwrap();
  assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_token_is_enforced_when_configured() {
  let app = test_app(Some("sesame")).await;
  let viewer = Uuid::new_v4();

  let bare =
    request("GET", &format!("/users/{viewer}/entries"), None, None);
  let response = app.clone().oneshot(bare).await.unwrap();
  assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

  let mut with_token =
    request("GET", &format!("/users/{viewer}/entries"), None, None);
  with_token.headers_mut().insert(
    header::AUTHORIZATION,
    "Bearer sesame".parse().unwrap(),
  );
  let response = app.oneshot(with_token).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
}

// ─── Entries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn entry_lifecycle_roundtrip() {
  let app = test_app(None).await;
  let owner = Uuid::new_v4();

  let response = app
    .clone()
    .oneshot(request(
      "POST",
      "/entries",
      Some(owner),
      Some(entry_body("Alien", Some(9), Some("movie:alien-1979"))),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::CREATED);
  let created = json_body(response).await;
  let id = created["entry_id"].as_str().unwrap().to_string();
  assert_eq!(created["title"], "Alien");
  assert_eq!(created["activity"], true);

  let response = app
    .clone()
    .oneshot(request(
      "PUT",
      &format!("/entries/{id}"),
      Some(owner),
      Some(entry_body("Alien (rewatch)", Some(10), None)),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let updated = json_body(response).await;
  assert_eq!(updated["title"], "Alien (rewatch)");
  // Subject is fixed at creation, not part of the edit body.
  assert_eq!(updated["subject_ref"], "movie:alien-1979");

  let response = app
    .clone()
    .oneshot(request(
      "GET",
      &format!("/users/{owner}/entries"),
      Some(owner),
      None,
    ))
    .await
    .unwrap();
  assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);

  let response = app
    .clone()
    .oneshot(request("DELETE", &format!("/entries/{id}"), Some(owner), None))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NO_CONTENT);

  let response = app
    .oneshot(request(
      "GET",
      &format!("/users/{owner}/entries"),
      Some(owner),
      None,
    ))
    .await
    .unwrap();
  assert!(json_body(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_entries_are_rejected() {
  let app = test_app(None).await;
  let owner = Uuid::new_v4();

  let response = app
    .clone()
    .oneshot(request(
      "POST",
      "/entries",
      Some(owner),
      Some(entry_body("Alien", Some(11), None)),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);

  let response = app
    .oneshot(request(
      "POST",
      "/entries",
      Some(owner),
      Some(entry_body("   ", None, None)),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn editing_someone_elses_entry_is_a_404() {
  let app = test_app(None).await;
  let owner = Uuid::new_v4();

  let response = app
    .clone()
    .oneshot(request(
      "POST",
      "/entries",
      Some(owner),
      Some(entry_body("Heat", Some(8), None)),
    ))
    .await
    .unwrap();
  let id = json_body(response).await["entry_id"]
    .as_str()
    .unwrap()
    .to_string();

  let intruder = Uuid::new_v4();
  let response = app
    .oneshot(request(
      "PUT",
      &format!("/entries/{id}"),
      Some(intruder),
      Some(entry_body("Heat??", None, None)),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ─── Follows and the feed ────────────────────────────────────────────────────

#[tokio::test]
async fn followed_activity_shows_up_in_the_feed() {
  let app = test_app(None).await;
  let viewer = Uuid::new_v4();
  let author = Uuid::new_v4();

  let response = app
    .clone()
    .oneshot(request(
      "PUT",
      "/profile",
      Some(author),
      Some(json!({ "handle": "filmlog" })),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  app
    .clone()
    .oneshot(request(
      "POST",
      "/entries",
      Some(author),
      Some(entry_body("Ran", Some(10), Some("movie:ran-1985"))),
    ))
    .await
    .unwrap();

  let response = app
    .clone()
    .oneshot(request(
      "POST",
      "/follows",
      Some(viewer),
      Some(json!({ "followee_id": author })),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::CREATED);

  // Repeating the follow changes nothing.
  let response = app
    .clone()
    .oneshot(request(
      "POST",
      "/follows",
      Some(viewer),
      Some(json!({ "followee_id": author })),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NO_CONTENT);

  let response = app
    .clone()
    .oneshot(request("GET", "/feed", Some(viewer), None))
    .await
    .unwrap();
  let feed = json_body(response).await;
  let items = feed.as_array().unwrap();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0]["title"], "Ran");
  assert_eq!(items[0]["actor"]["handle"], "filmlog");

  let response = app
    .clone()
    .oneshot(request(
      "DELETE",
      &format!("/follows/{author}"),
      Some(viewer),
      None,
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NO_CONTENT);

  let response = app
    .oneshot(request("GET", "/feed", Some(viewer), None))
    .await
    .unwrap();
  assert!(json_body(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn self_follow_is_rejected() {
  let app = test_app(None).await;
  let viewer = Uuid::new_v4();

  let response = app
    .oneshot(request(
      "POST",
      "/follows",
      Some(viewer),
      Some(json!({ "followee_id": viewer })),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn actor_without_profile_renders_as_placeholder() {
  let app = test_app(None).await;
  let viewer = Uuid::new_v4();
  let author = Uuid::new_v4();

  app
    .clone()
    .oneshot(request(
      "POST",
      "/entries",
      Some(author),
      Some(entry_body("Stalker", Some(9), None)),
    ))
    .await
    .unwrap();
  app
    .clone()
    .oneshot(request(
      "POST",
      "/follows",
      Some(viewer),
      Some(json!({ "followee_id": author })),
    ))
    .await
    .unwrap();

  let response = app
    .oneshot(request("GET", "/feed", Some(viewer), None))
    .await
    .unwrap();
  let feed = json_body(response).await;
  assert_eq!(feed[0]["actor"]["handle"], "unknown user");
}

// ─── Achievements ────────────────────────────────────────────────────────────

#[tokio::test]
async fn catalog_is_served() {
  let app = test_app(None).await;

  let response = app
    .oneshot(request("GET", "/achievements", None, None))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let catalog = json_body(response).await;
  assert!(catalog.as_array().unwrap().len() > 10);
  assert!(catalog[0]["id"].is_string());
}

/// The evaluator runs off a background queue, so the grant lands shortly
/// after the write response, not within it.
#[tokio::test]
async fn first_entry_earns_its_achievement() {
  let app = test_app(None).await;
  let owner = Uuid::new_v4();

  let response = app
    .clone()
    .oneshot(request(
      "POST",
      "/entries",
      Some(owner),
      Some(entry_body("Paris, Texas", Some(10), None)),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::CREATED);

  let mut granted = Vec::new();
  for _ in 0..50 {
    let response = app
      .clone()
      .oneshot(request(
        "GET",
        &format!("/users/{owner}/achievements"),
        Some(owner),
        None,
      ))
      .await
      .unwrap();
    let body = json_body(response).await;
    granted = body
      .as_array()
      .unwrap()
      .iter()
      .map(|g| g["achievement_id"].as_str().unwrap().to_string())
      .collect();
    if !granted.is_empty() {
      break;
    }
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
  }

  assert!(granted.contains(&"first-entry".to_string()));
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn profile_upsert_and_fetch() {
  let app = test_app(None).await;
  let user = Uuid::new_v4();

  let response = app
    .clone()
    .oneshot(request(
      "PUT",
      "/profile",
      Some(user),
      Some(json!({ "handle": "mubi_refugee", "avatar_ref": "img:1" })),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let response = app
    .clone()
    .oneshot(request(
      "GET",
      &format!("/users/{user}/profile"),
      Some(user),
      None,
    ))
    .await
    .unwrap();
  let profile = json_body(response).await;
  assert_eq!(profile["handle"], "mubi_refugee");
  assert_eq!(profile["verified"], false);

  let response = app
    .oneshot(request(
      "GET",
      &format!("/users/{}/profile", Uuid::new_v4()),
      Some(user),
      None,
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_handle_is_rejected() {
  let app = test_app(None).await;

  let response = app
    .oneshot(request(
      "PUT",
      "/profile",
      Some(Uuid::new_v4()),
      Some(json!({ "handle": "  " })),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ─── Lists and watchlist ─────────────────────────────────────────────────────

#[tokio::test]
async fn list_lifecycle() {
  let app = test_app(None).await;
  let owner = Uuid::new_v4();

  let response = app
    .clone()
    .oneshot(request(
      "POST",
      "/lists",
      Some(owner),
      Some(json!({ "title": "slow cinema" })),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::CREATED);
  let id = json_body(response).await["list_id"]
    .as_str()
    .unwrap()
    .to_string();

  let response = app
    .clone()
    .oneshot(request("DELETE", &format!("/lists/{id}"), Some(owner), None))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NO_CONTENT);

  let response = app
    .oneshot(request("DELETE", &format!("/lists/{id}"), Some(owner), None))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn watchlist_add_is_idempotent() {
  let app = test_app(None).await;
  let owner = Uuid::new_v4();

  let response = app
    .clone()
    .oneshot(request(
      "PUT",
      "/watchlist/movie:solaris-1972",
      Some(owner),
      None,
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::CREATED);

  let response = app
    .clone()
    .oneshot(request(
      "PUT",
      "/watchlist/movie:solaris-1972",
      Some(owner),
      None,
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NO_CONTENT);

  let response = app
    .clone()
    .oneshot(request(
      "DELETE",
      "/watchlist/movie:solaris-1972",
      Some(owner),
      None,
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NO_CONTENT);

  let response = app
    .oneshot(request(
      "DELETE",
      "/watchlist/movie:solaris-1972",
      Some(owner),
      None,
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
