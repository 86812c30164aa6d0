//! Content hashing for Hoard.
//!
//! Provides a streaming SHA-256 [`ContentHasher`] that consumes arbitrary
//! readers in bounded chunks, and the fixed-size [`Digest`] it produces.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod digest;
pub mod hasher;

pub use digest::Digest;
pub use hasher::{ContentHasher, CHUNK_SIZE};
