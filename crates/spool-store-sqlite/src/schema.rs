//! SQL schema for the Spool SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS entries (
    entry_id    TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    subject_ref TEXT,               -- NULL for standalone posts
    created_at  TEXT NOT NULL,      -- ISO 8601 UTC; server-assigned
    activity    INTEGER NOT NULL,   -- derived feed-eligibility flag
    title       TEXT NOT NULL,
    rating      INTEGER,            -- 1..=10 half-star scale, or NULL
    review      TEXT,
    media_ref   TEXT,
    genres      TEXT NOT NULL DEFAULT '[]'  -- JSON array of slugs
);

-- The per-owner eligible range scan behind the feed fan-out.
CREATE INDEX IF NOT EXISTS entries_owner_activity_idx
    ON entries(owner_id, activity, created_at);
CREATE INDEX IF NOT EXISTS entries_subject_idx
    ON entries(subject_ref, created_at);

CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL,
    followee_id TEXT NOT NULL,
    followed_at TEXT NOT NULL,
    PRIMARY KEY (follower_id, followee_id),
    CHECK (follower_id != followee_id)
);

-- Reverse index: who follows me.
CREATE INDEX IF NOT EXISTS follows_followee_idx ON follows(followee_id);

CREATE TABLE IF NOT EXISTS profiles (
    user_id    TEXT PRIMARY KEY,
    handle     TEXT NOT NULL,
    avatar_ref TEXT,
    verified   INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

-- Mutated only through the clamped upsert in store.rs; values never go
-- negative.
CREATE TABLE IF NOT EXISTS counters (
    user_id TEXT NOT NULL,
    name    TEXT NOT NULL,
    value   INTEGER NOT NULL,
    PRIMARY KEY (user_id, name)
);

-- Insert-only. The primary key is the serialization point for at-most-once
-- granting.
CREATE TABLE IF NOT EXISTS grants (
    user_id        TEXT NOT NULL,
    achievement_id TEXT NOT NULL,
    earned_at      TEXT NOT NULL,
    PRIMARY KEY (user_id, achievement_id)
);

CREATE TABLE IF NOT EXISTS lists (
    list_id    TEXT PRIMARY KEY,
    owner_id   TEXT NOT NULL,
    title      TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS lists_owner_idx ON lists(owner_id);

CREATE TABLE IF NOT EXISTS watchlist (
    owner_id    TEXT NOT NULL,
    subject_ref TEXT NOT NULL,
    added_at    TEXT NOT NULL,
    PRIMARY KEY (owner_id, subject_ref)
);

PRAGMA user_version = 1;
";
