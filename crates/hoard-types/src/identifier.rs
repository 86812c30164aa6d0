use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest identifier accepted, matching the usual filename limit.
pub const MAX_IDENTIFIER_LEN: usize = 255;

/// Content-derived key for a stored object.
///
/// An `Identifier` is normally the lower-case hex digest of an object's bytes,
/// optionally followed by a type extension (`<hex>.png`). Identical content
/// under the same extension policy always yields the same identifier, and the
/// identifier is the only key the store knows.
///
/// Identifiers become filenames on disk, so parsing rejects anything that
/// could escape the storage root: path separators, leading dots, and
/// characters outside `[A-Za-z0-9._-]`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Parse and validate an identifier string.
    pub fn parse(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        let reason = if value.is_empty() {
            Some("must not be empty")
        } else if value.len() > MAX_IDENTIFIER_LEN {
            Some("longer than 255 bytes")
        } else if value.starts_with('.') {
            Some("must not start with '.'")
        } else if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
        {
            Some("only ASCII letters, digits, '.', '_' and '-' are allowed")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(TypeError::InvalidIdentifier { value, reason }),
            None => Ok(Self(value)),
        }
    }

    /// Build an identifier from a hex digest and an optional extension.
    ///
    /// The extension may be given with or without its leading dot.
    pub fn from_digest(hex_digest: &str, extension: Option<&str>) -> Result<Self, TypeError> {
        match extension.map(|e| e.trim_start_matches('.')) {
            Some(ext) if !ext.is_empty() => Self::parse(format!("{hex_digest}.{ext}")),
            _ => Self::parse(hex_digest),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The suffix after the last `.`, if any.
    pub fn extension(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, ext)| ext).filter(|e| !e.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: parsing rejects empty identifiers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
