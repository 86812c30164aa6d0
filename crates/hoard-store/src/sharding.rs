//! Identifier -> nested directory path.
//!
//! Large object counts would overload a single directory, so each object is
//! filed under `depth` directories named after successive `segment_len`
//! character slices of its identifier:
//!
//! ```text
//! depth 2, segment 2:  abcd1234  ->  <base>/ab/cd/abcd1234
//! ```
//!
//! The mapping is a pure function of the identifier and the configuration.
//! Nothing here touches the filesystem.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Layout parameters for nested object paths.
///
/// `depth` and `segment_len` are signed so values read from configuration
/// files can be reported as invalid instead of failing to deserialize.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardingConfig {
    pub base_path: PathBuf,
    pub depth: i64,
    pub segment_len: i64,
}

impl ShardingConfig {
    pub fn new(base_path: impl Into<PathBuf>, depth: i64, segment_len: i64) -> Self {
        Self {
            base_path: base_path.into(),
            depth,
            segment_len,
        }
    }

    /// All objects directly under `base_path`.
    pub fn flat(base_path: impl Into<PathBuf>) -> Self {
        Self::new(base_path, 0, 0)
    }

    /// Check the identifier-independent constraints.
    pub fn validate(&self) -> Result<(), ShardingError> {
        if self.depth < 0 {
            return Err(ShardingError::NegativeDepth(self.depth));
        }
        if self.depth > 0 && self.segment_len < 1 {
            return Err(ShardingError::SegmentTooShort(self.segment_len));
        }
        Ok(())
    }

    /// Characters an identifier needs to fill every shard level.
    fn required_len(&self) -> u128 {
        if self.depth == 0 {
            0
        } else {
            self.depth as u128 * self.segment_len as u128
        }
    }
}

/// Errors from path generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShardingError {
    #[error("nested path level must be non-negative (given {0})")]
    NegativeDepth(i64),

    #[error("folder segment length must be at least 1 (given {0})")]
    SegmentTooShort(i64),

    #[error(
        "identifier '{identifier}' can't be used for a path with {depth} nested levels \
         and folder segment length {segment_len}"
    )]
    IdentifierTooShort {
        identifier: String,
        depth: i64,
        segment_len: i64,
    },

    #[error("identifier '{identifier}' yields the directory name '{segment}'")]
    UnsafeSegment { identifier: String, segment: String },
}

/// Maps identifiers to their nested storage paths.
#[derive(Clone, Debug)]
pub struct NestedPathGenerator {
    config: ShardingConfig,
}

impl NestedPathGenerator {
    pub fn new(config: ShardingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShardingConfig {
        &self.config
    }

    /// Compute the final path for `identifier`.
    ///
    /// Validation runs in order: depth, segment length, identifier length.
    /// The identifier is never truncated to fit.
    pub fn generate(&self, identifier: &str) -> Result<PathBuf, ShardingError> {
        self.config.validate()?;

        if (identifier.chars().count() as u128) < self.config.required_len() {
            return Err(ShardingError::IdentifierTooShort {
                identifier: identifier.to_string(),
                depth: self.config.depth,
                segment_len: self.config.segment_len,
            });
        }

        let mut path = self.config.base_path.clone();
        let mut chars = identifier.chars();
        for _ in 0..self.config.depth {
            let segment: String = chars.by_ref().take(self.config.segment_len as usize).collect();
            path.push(checked_segment(identifier, segment)?);
        }
        path.push(checked_segment(identifier, identifier.to_string())?);
        Ok(path)
    }
}

/// Path components must stay below the base path.
fn checked_segment(identifier: &str, segment: String) -> Result<String, ShardingError> {
    if segment == "." || segment == ".." || segment.contains(['/', '\\']) {
        return Err(ShardingError::UnsafeSegment {
            identifier: identifier.to_string(),
            segment,
        });
    }
    Ok(segment)
}
