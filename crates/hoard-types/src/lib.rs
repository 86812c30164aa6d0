//! Foundation types for Hoard.
//!
//! Every other Hoard crate depends on `hoard-types`. The central type is
//! [`Identifier`]: the content-derived key under which a blob is stored,
//! served and deleted. There is no other ID space.

pub mod error;
pub mod identifier;

pub use error::TypeError;
pub use identifier::Identifier;
