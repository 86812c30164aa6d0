use std::io::{self, Read};

use sha2::{Digest as _, Sha256};

use crate::digest::Digest;

/// Read buffer size used when hashing a stream.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Streaming SHA-256 content hasher.
///
/// The hasher never holds more than one [`CHUNK_SIZE`] buffer of input in
/// memory, so objects of any length can be hashed. The digest depends only on
/// the bytes read, never on how the reader splits them.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentHasher;

impl ContentHasher {
    pub const fn new() -> Self {
        Self
    }

    /// Consume `input` to EOF and return the digest of every byte read.
    ///
    /// A read error aborts hashing and is returned as-is; no partial digest
    /// is ever produced.
    pub fn encode<R: Read + ?Sized>(&self, input: &mut R) -> io::Result<Digest> {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buf[..n]);
        }
        Ok(Digest::from_hash(hasher.finalize().into()))
    }
}
