use std::io::{self, Read};

use hoard_crypto::ContentHasher;
use hoard_types::{Identifier, TypeError};

/// Derives an identifier from an object's byte stream.
///
/// Implementations must read `input` to EOF and be deterministic: the same
/// bytes and the same content-type hint always produce the same identifier.
/// The store relies on full consumption, because the bytes are staged to
/// disk as they are read.
pub trait NamingStrategy: Send + Sync {
    fn generate(
        &self,
        input: &mut dyn Read,
        content_type: Option<&str>,
    ) -> Result<Identifier, NamingError>;
}

/// Errors from identifier generation.
#[derive(Debug, thiserror::Error)]
pub enum NamingError {
    #[error("failed to hash input stream: {0}")]
    Read(#[source] io::Error),

    #[error("could not find a file extension for content type '{0}'")]
    UnknownContentType(String),

    #[error(transparent)]
    InvalidIdentifier(#[from] TypeError),
}

/// Names objects by the hex SHA-256 digest of their content.
///
/// Given a content-type hint, the first extension registered for that type is
/// appended (`image/png` -> `<digest>.png`). Without a hint the identifier is
/// the bare digest.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Naming {
    hasher: ContentHasher,
}

impl Sha256Naming {
    pub const fn new() -> Self {
        Self {
            hasher: ContentHasher::new(),
        }
    }

    fn extension_for(content_type: &str) -> Result<&'static str, NamingError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        mime_guess::get_mime_extensions_str(&essence)
            .and_then(|exts| exts.first().copied())
            .ok_or_else(|| NamingError::UnknownContentType(content_type.to_string()))
    }
}

impl NamingStrategy for Sha256Naming {
    fn generate(
        &self,
        input: &mut dyn Read,
        content_type: Option<&str>,
    ) -> Result<Identifier, NamingError> {
        // Resolve the extension first so an unusable hint fails before any
        // bytes are staged.
        let extension = content_type.map(Self::extension_for).transpose()?;
        let digest = self.hasher.encode(input).map_err(NamingError::Read)?;
        Ok(Identifier::from_digest(&digest.to_hex(), extension)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    const DIGEST: &str = "4859309121b35604ae3a848ac3a275b8d71410a1c09d9585c19ecea9fb84a2e2";

    /// Drains the input and always answers with the same name.
    pub(crate) struct StaticNaming(pub &'static str);

    impl NamingStrategy for StaticNaming {
        fn generate(
            &self,
            input: &mut dyn Read,
            _content_type: Option<&str>,
        ) -> Result<Identifier, NamingError> {
            io::copy(input, &mut io::sink()).map_err(NamingError::Read)?;
            Ok(Identifier::parse(self.0)?)
        }
    }

    struct ErrReader;

    impl Read for ErrReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("encountered error"))
        }
    }

    #[test]
    fn blank_hint_gives_bare_digest() {
        let id = Sha256Naming::new()
            .generate(&mut Cursor::new("Some testing string"), None)
            .unwrap();
        assert_eq!(id.as_str(), DIGEST);
    }

    #[test]
    fn hint_appends_extension() {
        let id = Sha256Naming::new()
            .generate(&mut Cursor::new("Some testing string"), Some("image/png"))
            .unwrap();
        assert_eq!(id.as_str(), format!("{DIGEST}.png"));
    }

    #[test]
    fn hint_parameters_are_ignored() {
        let id = Sha256Naming::new()
            .generate(&mut Cursor::new("x"), Some("IMAGE/PNG; charset=binary"))
            .unwrap();
        assert_eq!(id.extension(), Some("png"));
    }

    #[test]
    fn unknown_hint_is_rejected() {
        let err = Sha256Naming::new()
            .generate(&mut Cursor::new("x"), Some("application/x-definitely-not-real"))
            .unwrap_err();
        assert!(matches!(err, NamingError::UnknownContentType(_)));
    }

    #[test]
    fn read_error_is_reported() {
        let err = Sha256Naming::new()
            .generate(&mut ErrReader, None)
            .unwrap_err();
        assert!(err.to_string().contains("failed to hash input stream"));
    }

    #[test]
    fn static_naming_drains_input() {
        let mut input = Cursor::new(vec![1u8; 1000]);
        let id = StaticNaming("encrypted1").generate(&mut input, None).unwrap();
        assert_eq!(id.as_str(), "encrypted1");
        assert_eq!(input.position(), 1000);
    }
}
