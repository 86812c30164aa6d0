//! HTTP server for Hoard.
//!
//! Exposes a [`BlobStore`](hoard_store::BlobStore) over three routes:
//! multipart upload, streamed download, and delete. Store calls run on the
//! blocking pool; bodies cross over through bounded channels.

pub mod body;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod sniff;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{HealthResponse, UploadResponse};
pub use router::{build_router, AppState};
pub use server::HoardServer;
