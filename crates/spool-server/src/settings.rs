//! Server configuration, read from a TOML file and `SPOOL_*` environment
//! variables.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use spool_core::feed::FeedConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  /// Path to the SQLite database file; created on first start.
  pub store_path:          PathBuf,
  /// Shared bearer token. Unset means an open instance.
  pub api_token:           Option<String>,
  pub feed_per_followee:   usize,
  pub feed_max_items:      usize,
  pub followee_timeout_ms: u64,
  pub eval_queue_capacity: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let feed = FeedConfig::default();
    Self {
      host:                "127.0.0.1".into(),
      port:                5850,
      store_path:          PathBuf::from("spool.db"),
      api_token:           None,
      feed_per_followee:   feed.per_followee,
      feed_max_items:      feed.max_items,
      followee_timeout_ms: feed.followee_timeout.as_millis() as u64,
      eval_queue_capacity: 256,
    }
  }
}

impl ServerConfig {
  pub fn feed(&self) -> FeedConfig {
    FeedConfig {
      per_followee:     self.feed_per_followee,
      max_items:        self.feed_max_items,
      followee_timeout: Duration::from_millis(self.followee_timeout_ms),
    }
  }
}
