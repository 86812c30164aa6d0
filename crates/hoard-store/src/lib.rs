//! Content-addressed blob storage for Hoard.
//!
//! This crate turns an incoming byte stream into a durably stored file named
//! after its own content. A save stages the bytes in a uniquely named
//! temporary file while hashing them in the same pass, derives the
//! [`Identifier`](hoard_types::Identifier) from the digest, computes a nested
//! shard path from that identifier, and publishes the file there with a
//! single atomic rename.
//!
//! # Components
//!
//! - [`ContentHasher`](hoard_crypto::ContentHasher) -- streaming SHA-256
//! - [`NestedPathGenerator`] -- identifier -> nested directory path
//! - [`NamingStrategy`] / [`Sha256Naming`] -- stream -> identifier
//! - [`SaveHook`] -- before/after notifications around a save
//! - [`FileSystemStore`] -- the storage engine
//! - [`ObjectHandle`] -- caller-owned read stream plus size and extension
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`FileSystemStore`] -- sharded directory tree on local disk
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. An object is never visible at its final path until it is complete.
//! 2. The store keeps no in-memory state between calls and takes no locks;
//!    filesystem rename is the only coordination point.
//! 3. Paths are always recomputed from the identifier; there is no index.
//! 4. All I/O errors are propagated with the stage that produced them.

pub mod config;
pub mod error;
pub mod filesystem;
pub mod handle;
pub mod hooks;
pub mod memory;
pub mod naming;
pub mod sharding;
pub mod tee;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::StoreConfig;
pub use error::{Stage, StoreError, StoreResult};
pub use filesystem::FileSystemStore;
pub use handle::ObjectHandle;
pub use hooks::{HookError, HookStage, NoOpHook, SaveContext, SaveHook, SaveReport, TracingHook};
pub use memory::InMemoryBlobStore;
pub use naming::{NamingError, NamingStrategy, Sha256Naming};
pub use sharding::{NestedPathGenerator, ShardingConfig, ShardingError};
pub use tee::TeeReader;
pub use traits::{BlobStore, SaveRequest};
