//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use futures::future::join_all;
use spool_core::{
  counter::{CounterKey, WiredGenre},
  entry::{EntryPayload, NewEntry},
  social::Profile,
  store::{
    CounterStore, EntryStore, FollowStore, GrantStore, ListStore,
    ProfileStore, WatchlistStore,
  },
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn payload(title: &str, rating: Option<u8>, review: Option<&str>) -> EntryPayload {
  EntryPayload {
    title:     title.into(),
    rating,
    review:    review.map(str::to_owned),
    media_ref: None,
    genres:    vec![],
  }
}

fn logged_entry(owner: Uuid, rating: Option<u8>) -> NewEntry {
  NewEntry {
    owner_id:    owner,
    subject_ref: Some("tt0079944".into()),
    payload:     payload("Stalker", rating, None),
  }
}

// ─── Follows ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn follow_unfollow_roundtrip() {
  let s = store().await;
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

  let edge = s.follow(a, b).await.unwrap().expect("new edge");
  assert_eq!(edge.follower_id, a);
  assert_eq!(edge.followee_id, b);

  assert!(s.unfollow(a, b).await.unwrap());
  assert!(!s.unfollow(a, b).await.unwrap());
}

#[tokio::test]
async fn duplicate_follow_is_none() {
  let s = store().await;
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

  assert!(s.follow(a, b).await.unwrap().is_some());
  assert!(s.follow(a, b).await.unwrap().is_none());

  assert_eq!(s.followees(a).await.unwrap().len(), 1);
}

#[tokio::test]
async fn self_follow_rejected() {
  let s = store().await;
  let a = Uuid::new_v4();
  let err = s.follow(a, a).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(spool_core::Error::SelfFollow)
  ));
}

#[tokio::test]
async fn reverse_index_lists_followers() {
  let s = store().await;
  let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

  s.follow(a, c).await.unwrap();
  s.follow(b, c).await.unwrap();

  let followers = s.followers(c).await.unwrap();
  assert_eq!(followers.len(), 2);
  assert!(followers.iter().all(|e| e.followee_id == c));

  assert!(s.followers(a).await.unwrap().is_empty());
}

// ─── Entries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_derives_activity_flag() {
  let s = store().await;
  let owner = Uuid::new_v4();

  let rated = s.insert_entry(logged_entry(owner, Some(8))).await.unwrap();
  assert!(rated.activity);

  let plain = s.insert_entry(logged_entry(owner, None)).await.unwrap();
  assert!(!plain.activity);

  let post = s
    .insert_entry(NewEntry {
      owner_id:    owner,
      subject_ref: None,
      payload:     payload("thoughts on slow cinema", None, None),
    })
    .await
    .unwrap();
  assert!(post.activity);
}

#[tokio::test]
async fn recent_activity_filters_and_orders() {
  let s = store().await;
  let owner = Uuid::new_v4();

  s.insert_entry(logged_entry(owner, None)).await.unwrap();
  let first = s.insert_entry(logged_entry(owner, Some(6))).await.unwrap();
  let second = s.insert_entry(logged_entry(owner, Some(9))).await.unwrap();

  let recent = s.recent_activity(owner, 10).await.unwrap();
  assert_eq!(recent.len(), 2);
  // Newest first; the unrated entry is absent.
  assert!(recent[0].created_at >= recent[1].created_at);
  let ids: Vec<_> = recent.iter().map(|e| e.entry_id).collect();
  assert!(ids.contains(&first.entry_id));
  assert!(ids.contains(&second.entry_id));

  let bounded = s.recent_activity(owner, 1).await.unwrap();
  assert_eq!(bounded.len(), 1);
}

#[tokio::test]
async fn diary_view_includes_ineligible_entries() {
  let s = store().await;
  let owner = Uuid::new_v4();

  s.insert_entry(logged_entry(owner, None)).await.unwrap();
  s.insert_entry(logged_entry(owner, Some(7))).await.unwrap();

  assert_eq!(s.entries_for_owner(owner, 10).await.unwrap().len(), 2);
  assert_eq!(s.recent_activity(owner, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn edit_flips_activity_flag_both_ways() {
  let s = store().await;
  let owner = Uuid::new_v4();

  let entry = s.insert_entry(logged_entry(owner, Some(8))).await.unwrap();

  // Removing the rating demotes the entry out of the feed.
  let demoted = s
    .update_entry(entry.entry_id, owner, payload("Stalker", None, None))
    .await
    .unwrap()
    .unwrap();
  assert!(!demoted.activity);
  assert!(s.recent_activity(owner, 10).await.unwrap().is_empty());

  // Adding a review promotes it back.
  let promoted = s
    .update_entry(entry.entry_id, owner, payload("Stalker", None, Some("the zone lingers")))
    .await
    .unwrap()
    .unwrap();
  assert!(promoted.activity);
  assert_eq!(s.recent_activity(owner, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_preserves_subject_and_timestamps() {
  let s = store().await;
  let owner = Uuid::new_v4();

  let entry = s.insert_entry(logged_entry(owner, Some(8))).await.unwrap();
  let updated = s
    .update_entry(entry.entry_id, owner, payload("Stalker (rewatch)", Some(10), None))
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.subject_ref.as_deref(), Some("tt0079944"));
  assert_eq!(updated.created_at, entry.created_at);
  assert_eq!(updated.payload.title, "Stalker (rewatch)");
  assert_eq!(updated.payload.rating, Some(10));
}

#[tokio::test]
async fn update_by_non_owner_is_none() {
  let s = store().await;
  let owner = Uuid::new_v4();

  let entry = s.insert_entry(logged_entry(owner, Some(8))).await.unwrap();
  let result = s
    .update_entry(entry.entry_id, Uuid::new_v4(), payload("hijacked", Some(1), None))
    .await
    .unwrap();
  assert!(result.is_none());

  // Untouched.
  let fetched = s.get_entry(entry.entry_id).await.unwrap().unwrap();
  assert_eq!(fetched.payload.title, "Stalker");
}

#[tokio::test]
async fn delete_returns_removed_entry() {
  let s = store().await;
  let owner = Uuid::new_v4();

  let entry = s.insert_entry(logged_entry(owner, Some(8))).await.unwrap();

  assert!(s.delete_entry(entry.entry_id, Uuid::new_v4()).await.unwrap().is_none());

  let removed = s.delete_entry(entry.entry_id, owner).await.unwrap().unwrap();
  assert_eq!(removed.entry_id, entry.entry_id);
  assert_eq!(removed.payload.rating, Some(8));

  assert!(s.get_entry(entry.entry_id).await.unwrap().is_none());
}

#[tokio::test]
async fn entries_for_subject_is_activity_only() {
  let s = store().await;
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

  s.insert_entry(logged_entry(a, Some(9))).await.unwrap();
  s.insert_entry(logged_entry(b, None)).await.unwrap();
  s.insert_entry(NewEntry {
    owner_id:    b,
    subject_ref: Some("tt0062622".into()),
    payload:     payload("2001", Some(10), None),
  })
  .await
  .unwrap();

  let about = s.entries_for_subject("tt0079944", 10).await.unwrap();
  assert_eq!(about.len(), 1);
  assert_eq!(about[0].owner_id, a);
}

#[tokio::test]
async fn genres_roundtrip() {
  let s = store().await;
  let owner = Uuid::new_v4();

  let mut input = logged_entry(owner, Some(8));
  input.payload.genres = vec!["horror".into(), "sci-fi".into()];
  let entry = s.insert_entry(input).await.unwrap();

  let fetched = s.get_entry(entry.entry_id).await.unwrap().unwrap();
  assert_eq!(fetched.payload.genres, vec!["horror", "sci-fi"]);
}

// ─── Profiles ────────────────────────────────────────────────────────────────

fn profile(user: Uuid, handle: &str) -> Profile {
  Profile {
    user_id:    user,
    handle:     handle.into(),
    avatar_ref: None,
    verified:   false,
    updated_at: Utc::now(),
  }
}

#[tokio::test]
async fn upsert_and_get_profile() {
  let s = store().await;
  let user = Uuid::new_v4();

  s.upsert_profile(profile(user, "asta")).await.unwrap();
  let fetched = s.profile(user).await.unwrap().unwrap();
  assert_eq!(fetched.handle, "asta");

  let mut renamed = profile(user, "asta-prime");
  renamed.verified = true;
  s.upsert_profile(renamed).await.unwrap();
  let fetched = s.profile(user).await.unwrap().unwrap();
  assert_eq!(fetched.handle, "asta-prime");
  assert!(fetched.verified);
}

#[tokio::test]
async fn profile_missing_returns_none() {
  let s = store().await;
  assert!(s.profile(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn batch_resolution_skips_missing_users() {
  let s = store().await;
  let (a, b, ghost) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

  s.upsert_profile(profile(a, "asta")).await.unwrap();
  s.upsert_profile(profile(b, "bruno")).await.unwrap();

  let resolved = s.profiles_by_ids(&[a, ghost, b]).await.unwrap();
  assert_eq!(resolved.len(), 2);
  let handles: Vec<_> = resolved.iter().map(|p| p.handle.as_str()).collect();
  assert!(handles.contains(&"asta"));
  assert!(handles.contains(&"bruno"));

  assert!(s.profiles_by_ids(&[]).await.unwrap().is_empty());
}

// ─── Counters ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn adjust_and_snapshot() {
  let s = store().await;
  let user = Uuid::new_v4();

  assert_eq!(s.adjust(user, CounterKey::ItemsLogged, 1).await.unwrap(), 1);
  assert_eq!(s.adjust(user, CounterKey::ItemsLogged, 2).await.unwrap(), 3);
  s.adjust(user, CounterKey::Genre(WiredGenre::Horror), 1).await.unwrap();

  let snap = s.snapshot(user).await.unwrap();
  assert_eq!(snap.get(CounterKey::ItemsLogged), 3);
  assert_eq!(snap.get(CounterKey::Genre(WiredGenre::Horror)), 1);
  assert_eq!(snap.get(CounterKey::Followers), 0);
}

#[tokio::test]
async fn counters_clamp_at_zero() {
  let s = store().await;
  let user = Uuid::new_v4();

  // Decrementing a counter that was never incremented settles at zero.
  assert_eq!(s.adjust(user, CounterKey::Following, -1).await.unwrap(), 0);

  s.adjust(user, CounterKey::Following, 2).await.unwrap();
  assert_eq!(s.adjust(user, CounterKey::Following, -5).await.unwrap(), 0);
}

#[tokio::test]
async fn counters_are_per_user() {
  let s = store().await;
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

  s.adjust(a, CounterKey::ItemsLogged, 5).await.unwrap();
  assert_eq!(s.snapshot(b).await.unwrap().get(CounterKey::ItemsLogged), 0);
}

// ─── Grants ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn try_grant_is_insert_only() {
  let s = store().await;
  let user = Uuid::new_v4();
  let first_earned = Utc::now();

  let grant = s.try_grant(user, "log-10", first_earned).await.unwrap();
  assert!(grant.is_some());

  // The duplicate loses and the original timestamp survives.
  let lost = s.try_grant(user, "log-10", Utc::now()).await.unwrap();
  assert!(lost.is_none());

  let rows = s.grants_for(user).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].earned_at.timestamp(), first_earned.timestamp());
}

#[tokio::test]
async fn concurrent_try_grant_yields_one_row() {
  let s = store().await;
  let user = Uuid::new_v4();
  let now = Utc::now();

  let attempts = join_all((0..8).map(|_| {
    let s = s.clone();
    async move { s.try_grant(user, "first-entry", now).await.unwrap() }
  }))
  .await;

  assert_eq!(attempts.iter().filter(|g| g.is_some()).count(), 1);
  assert_eq!(s.grants_for(user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn grants_are_scoped_per_pair() {
  let s = store().await;
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
  let now = Utc::now();

  assert!(s.try_grant(a, "log-10", now).await.unwrap().is_some());
  // Different user, same achievement: no interference.
  assert!(s.try_grant(b, "log-10", now).await.unwrap().is_some());
  // Same user, different achievement: no interference.
  assert!(s.try_grant(a, "first-review", now).await.unwrap().is_some());

  let ids = s.granted_ids(a).await.unwrap();
  assert!(ids.contains("log-10"));
  assert!(ids.contains("first-review"));
  assert_eq!(ids.len(), 2);
}

// ─── Lists ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_lifecycle() {
  let s = store().await;
  let owner = Uuid::new_v4();

  let list = s.create_list(owner, "films about rooms").await.unwrap();
  assert_eq!(list.title, "films about rooms");

  assert!(!s.delete_list(list.list_id, Uuid::new_v4()).await.unwrap());
  assert!(s.delete_list(list.list_id, owner).await.unwrap());
  assert!(!s.delete_list(list.list_id, owner).await.unwrap());
}

// ─── Watchlist ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn watchlist_add_is_idempotent() {
  let s = store().await;
  let owner = Uuid::new_v4();

  let item = s.watchlist_add(owner, "tt0079944").await.unwrap();
  assert!(item.is_some());
  // The duplicate reports no change, so counters fire exactly once.
  assert!(s.watchlist_add(owner, "tt0079944").await.unwrap().is_none());

  assert!(s.watchlist_remove(owner, "tt0079944").await.unwrap());
  assert!(!s.watchlist_remove(owner, "tt0079944").await.unwrap());
}
