//! [`SqliteStore`] — the SQLite implementation of every `spool_core` store
//! trait.

use std::{collections::HashSet, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use spool_core::{
  achievement::Grant,
  counter::{CounterKey, CounterSnapshot},
  entry::{self, Entry, EntryPayload, NewEntry},
  social::{self, FollowEdge, List, Profile, WatchlistItem},
  store::{
    CounterStore, EntryStore, FollowStore, GrantStore, ListStore,
    ProfileStore, WatchlistStore,
  },
};

use crate::{
  encode::{
    RawEntry, RawFollow, RawProfile, decode_counter_key, encode_counter_key,
    encode_dt, encode_genres, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Spool store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a per-owner entry range query, optionally restricted to
  /// activity-eligible rows.
  async fn entries_by_owner(
    &self,
    owner: Uuid,
    limit: usize,
    activity_only: bool,
  ) -> Result<Vec<Entry>> {
    let owner_str = encode_uuid(owner);
    let limit_val = limit as i64;

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let activity_clause =
          if activity_only { "AND activity = 1" } else { "" };
        let sql = format!(
          "SELECT {} FROM entries
           WHERE owner_id = ?1 {activity_clause}
           ORDER BY created_at DESC, entry_id ASC
           LIMIT ?2",
          RawEntry::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str, limit_val], RawEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }
}

// ─── FollowStore ─────────────────────────────────────────────────────────────

impl FollowStore for SqliteStore {
  type Error = Error;

  async fn follow(&self, follower: Uuid, followee: Uuid) -> Result<Option<FollowEdge>> {
    social::validate_follow(follower, followee).map_err(Error::Core)?;

    let edge = FollowEdge {
      follower_id: follower,
      followee_id: followee,
      followed_at: Utc::now(),
    };

    let follower_str = encode_uuid(follower);
    let followee_str = encode_uuid(followee);
    let at_str       = encode_dt(edge.followed_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO follows (follower_id, followee_id, followed_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![follower_str, followee_str, at_str],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(inserted.then_some(edge))
  }

  async fn unfollow(&self, follower: Uuid, followee: Uuid) -> Result<bool> {
    let follower_str = encode_uuid(follower);
    let followee_str = encode_uuid(followee);

    let removed: bool = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
          rusqlite::params![follower_str, followee_str],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(removed)
  }

  async fn followees(&self, user: Uuid) -> Result<Vec<FollowEdge>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawFollow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT follower_id, followee_id, followed_at FROM follows
           WHERE follower_id = ?1
           ORDER BY followed_at ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawFollow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFollow::into_edge).collect()
  }

  async fn followers(&self, user: Uuid) -> Result<Vec<FollowEdge>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawFollow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT follower_id, followee_id, followed_at FROM follows
           WHERE followee_id = ?1
           ORDER BY followed_at ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawFollow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFollow::into_edge).collect()
  }
}

// ─── EntryStore ──────────────────────────────────────────────────────────────

impl EntryStore for SqliteStore {
  type Error = Error;

  async fn insert_entry(&self, input: NewEntry) -> Result<Entry> {
    let activity =
      entry::activity_flag(input.subject_ref.as_deref(), &input.payload);
    let new = Entry {
      entry_id:    Uuid::new_v4(),
      owner_id:    input.owner_id,
      subject_ref: input.subject_ref,
      created_at:  Utc::now(),
      activity,
      payload:     input.payload,
    };

    let entry_id_str = encode_uuid(new.entry_id);
    let owner_str    = encode_uuid(new.owner_id);
    let subject      = new.subject_ref.clone();
    let at_str       = encode_dt(new.created_at);
    let title        = new.payload.title.clone();
    let rating       = new.payload.rating;
    let review       = new.payload.review.clone();
    let media_ref    = new.payload.media_ref.clone();
    let genres_str   = encode_genres(&new.payload.genres)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entries (
             entry_id, owner_id, subject_ref, created_at, activity,
             title, rating, review, media_ref, genres
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            entry_id_str,
            owner_str,
            subject,
            at_str,
            activity,
            title,
            rating,
            review,
            media_ref,
            genres_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(new)
  }

  async fn get_entry(&self, id: Uuid) -> Result<Option<Entry>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM entries WHERE entry_id = ?1",
          RawEntry::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawEntry::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  async fn update_entry(
    &self,
    id: Uuid,
    owner: Uuid,
    payload: EntryPayload,
  ) -> Result<Option<Entry>> {
    let id_str     = encode_uuid(id);
    let owner_str  = encode_uuid(owner);
    let genres_str = encode_genres(&payload.genres)?;

    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        // Owner check and subject lookup in one step; the flag depends on
        // the immutable subject_ref.
        let subject: Option<Option<String>> = conn
          .query_row(
            "SELECT subject_ref FROM entries
             WHERE entry_id = ?1 AND owner_id = ?2",
            rusqlite::params![id_str, owner_str],
            |row| row.get(0),
          )
          .optional()?;

        let Some(subject) = subject else {
          return Ok(None);
        };

        let activity = entry::activity_flag(subject.as_deref(), &payload);

        conn.execute(
          "UPDATE entries
           SET activity = ?3, title = ?4, rating = ?5, review = ?6,
               media_ref = ?7, genres = ?8
           WHERE entry_id = ?1 AND owner_id = ?2",
          rusqlite::params![
            id_str,
            owner_str,
            activity,
            payload.title,
            payload.rating,
            payload.review,
            payload.media_ref,
            genres_str,
          ],
        )?;

        let sql = format!(
          "SELECT {} FROM entries WHERE entry_id = ?1",
          RawEntry::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawEntry::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  async fn delete_entry(&self, id: Uuid, owner: Uuid) -> Result<Option<Entry>> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_uuid(owner);

    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM entries WHERE entry_id = ?1 AND owner_id = ?2",
          RawEntry::COLUMNS
        );
        let raw = conn
          .query_row(&sql, rusqlite::params![id_str, owner_str], RawEntry::from_row)
          .optional()?;

        if raw.is_some() {
          conn.execute(
            "DELETE FROM entries WHERE entry_id = ?1 AND owner_id = ?2",
            rusqlite::params![id_str, owner_str],
          )?;
        }
        Ok(raw)
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  async fn recent_activity(&self, owner: Uuid, limit: usize) -> Result<Vec<Entry>> {
    self.entries_by_owner(owner, limit, true).await
  }

  async fn entries_for_owner(&self, owner: Uuid, limit: usize) -> Result<Vec<Entry>> {
    self.entries_by_owner(owner, limit, false).await
  }

  async fn entries_for_subject(&self, subject: &str, limit: usize) -> Result<Vec<Entry>> {
    let subject_str = subject.to_owned();
    let limit_val   = limit as i64;

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM entries
           WHERE subject_ref = ?1 AND activity = 1
           ORDER BY created_at DESC, entry_id ASC
           LIMIT ?2",
          RawEntry::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![subject_str, limit_val], RawEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }
}

// ─── ProfileStore ────────────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  type Error = Error;

  async fn upsert_profile(&self, profile: Profile) -> Result<Profile> {
    let stored = Profile { updated_at: Utc::now(), ..profile };

    let user_str   = encode_uuid(stored.user_id);
    let handle     = stored.handle.clone();
    let avatar_ref = stored.avatar_ref.clone();
    let verified   = stored.verified;
    let at_str     = encode_dt(stored.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (user_id, handle, avatar_ref, verified, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(user_id) DO UPDATE SET
             handle = ?2, avatar_ref = ?3, verified = ?4, updated_at = ?5",
          rusqlite::params![user_str, handle, avatar_ref, verified, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(stored)
  }

  async fn profile(&self, user: Uuid) -> Result<Option<Profile>> {
    let user_str = encode_uuid(user);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, handle, avatar_ref, verified, updated_at
               FROM profiles WHERE user_id = ?1",
              rusqlite::params![user_str],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let id_strs: Vec<String> = ids.iter().copied().map(encode_uuid).collect();

    let raws: Vec<RawProfile> = self
      .conn
      .call(move |conn| {
        let placeholders = (1..=id_strs.len())
          .map(|i| format!("?{i}"))
          .collect::<Vec<_>>()
          .join(", ");
        let sql = format!(
          "SELECT user_id, handle, avatar_ref, verified, updated_at
           FROM profiles WHERE user_id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(id_strs.iter()),
            RawProfile::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }
}

// ─── CounterStore ────────────────────────────────────────────────────────────

impl CounterStore for SqliteStore {
  type Error = Error;

  async fn adjust(&self, user: Uuid, key: CounterKey, delta: i64) -> Result<u64> {
    let user_str = encode_uuid(user);
    let name     = encode_counter_key(key).to_owned();

    let value: i64 = self
      .conn
      .call(move |conn| {
        // The clamp applies on both the insert and the update arm, so a
        // decrement of a missing counter settles at zero.
        conn.execute(
          "INSERT INTO counters (user_id, name, value)
           VALUES (?1, ?2, MAX(0, ?3))
           ON CONFLICT(user_id, name) DO UPDATE SET value = MAX(0, value + ?3)",
          rusqlite::params![user_str, name, delta],
        )?;
        let value = conn.query_row(
          "SELECT value FROM counters WHERE user_id = ?1 AND name = ?2",
          rusqlite::params![user_str, name],
          |row| row.get(0),
        )?;
        Ok(value)
      })
      .await?;

    Ok(value as u64)
  }

  async fn snapshot(&self, user: Uuid) -> Result<CounterSnapshot> {
    let user_str = encode_uuid(user);

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT name, value FROM counters WHERE user_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(name, value)| Ok((decode_counter_key(&name)?, value as u64)))
      .collect::<Result<CounterSnapshot>>()
  }
}

// ─── GrantStore ──────────────────────────────────────────────────────────────

impl GrantStore for SqliteStore {
  type Error = Error;

  async fn try_grant(
    &self,
    user: Uuid,
    achievement: &str,
    earned_at: DateTime<Utc>,
  ) -> Result<Option<Grant>> {
    let user_str        = encode_uuid(user);
    let achievement_str = achievement.to_owned();
    let at_str          = encode_dt(earned_at);

    let won: bool = self
      .conn
      .call(move |conn| {
        // The number of changed rows discriminates the race winner from
        // the loser.
        let changed = conn.execute(
          "INSERT INTO grants (user_id, achievement_id, earned_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(user_id, achievement_id) DO NOTHING",
          rusqlite::params![user_str, achievement_str, at_str],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(won.then(|| Grant {
      user_id:        user,
      achievement_id: achievement.to_owned(),
      earned_at,
    }))
  }

  async fn granted_ids(&self, user: Uuid) -> Result<HashSet<String>> {
    let user_str = encode_uuid(user);

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT achievement_id FROM grants WHERE user_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids.into_iter().collect())
  }

  async fn grants_for(&self, user: Uuid) -> Result<Vec<Grant>> {
    let user_str = encode_uuid(user);

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT achievement_id, earned_at FROM grants
           WHERE user_id = ?1
           ORDER BY earned_at DESC, achievement_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(achievement_id, at_str)| {
        Ok(Grant {
          user_id: user,
          achievement_id,
          earned_at: crate::encode::decode_dt(&at_str)?,
        })
      })
      .collect()
  }
}

// ─── ListStore ───────────────────────────────────────────────────────────────

impl ListStore for SqliteStore {
  type Error = Error;

  async fn create_list(&self, owner: Uuid, title: &str) -> Result<List> {
    let list = List {
      list_id:    Uuid::new_v4(),
      owner_id:   owner,
      title:      title.to_owned(),
      created_at: Utc::now(),
    };

    let list_id_str = encode_uuid(list.list_id);
    let owner_str   = encode_uuid(owner);
    let title_str   = list.title.clone();
    let at_str      = encode_dt(list.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lists (list_id, owner_id, title, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![list_id_str, owner_str, title_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(list)
  }

  async fn delete_list(&self, id: Uuid, owner: Uuid) -> Result<bool> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_uuid(owner);

    let removed: bool = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "DELETE FROM lists WHERE list_id = ?1 AND owner_id = ?2",
          rusqlite::params![id_str, owner_str],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(removed)
  }
}

// ─── WatchlistStore ──────────────────────────────────────────────────────────

impl WatchlistStore for SqliteStore {
  type Error = Error;

  async fn watchlist_add(&self, owner: Uuid, subject: &str) -> Result<Option<WatchlistItem>> {
    let item = WatchlistItem {
      owner_id:    owner,
      subject_ref: subject.to_owned(),
      added_at:    Utc::now(),
    };

    let owner_str   = encode_uuid(owner);
    let subject_str = item.subject_ref.clone();
    let at_str      = encode_dt(item.added_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO watchlist (owner_id, subject_ref, added_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![owner_str, subject_str, at_str],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(inserted.then_some(item))
  }

  async fn watchlist_remove(&self, owner: Uuid, subject: &str) -> Result<bool> {
    let owner_str   = encode_uuid(owner);
    let subject_str = subject.to_owned();

    let removed: bool = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "DELETE FROM watchlist WHERE owner_id = ?1 AND subject_ref = ?2",
          rusqlite::params![owner_str, subject_str],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(removed)
  }
}
