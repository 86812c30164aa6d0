use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sharding::ShardingConfig;

/// Staging directory inside the root when none is configured. Identifiers
/// never start with `.`, so it cannot collide with a shard directory.
pub const STAGING_DIR: &str = ".staging";

/// Configuration for [`FileSystemStore`](crate::FileSystemStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory under which shard directories are created.
    pub root: PathBuf,
    /// Where uploads are staged before the rename. Must be on the same
    /// volume as `root`. `None` means `root/.staging`.
    pub scratch_dir: Option<PathBuf>,
    /// Number of nested shard directories.
    pub depth: i64,
    /// Characters of the identifier used per shard directory.
    pub segment_len: i64,
    /// Permission bits for stored files (unix only).
    pub file_mode: u32,
    /// Permission bits for created shard directories (unix only).
    pub dir_mode: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data"),
            scratch_dir: None,
            depth: 2,
            segment_len: 2,
            file_mode: 0o600,
            dir_mode: 0o700,
        }
    }
}

impl StoreConfig {
    /// Default layout rooted at `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn sharding(&self) -> ShardingConfig {
        ShardingConfig::new(self.root.clone(), self.depth, self.segment_len)
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| self.root.join(STAGING_DIR))
    }
}
