use std::fmt;
use std::io::{self, Read};

use hoard_types::Identifier;

/// An open stored object.
///
/// Wraps the read stream together with the object's length (taken from
/// metadata, not by reading the body) and its identifier. The caller owns the
/// stream; dropping the handle releases it. The store does not track handles.
pub struct ObjectHandle {
    identifier: Identifier,
    size: u64,
    reader: Box<dyn Read + Send>,
}

impl ObjectHandle {
    pub fn new(identifier: Identifier, size: u64, reader: Box<dyn Read + Send>) -> Self {
        Self {
            identifier,
            size,
            reader,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Length of the object in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Extension carried by the identifier, if any.
    pub fn extension(&self) -> Option<&str> {
        self.identifier.extension()
    }

    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.reader
    }

    /// Read the whole object into memory.
    pub fn read_all(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(usize::try_from(self.size).unwrap_or(0));
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for ObjectHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("identifier", &self.identifier)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn exposes_metadata_and_bytes() {
        let id = Identifier::parse("abcdef.txt").unwrap();
        let handle = ObjectHandle::new(id, 5, Box::new(Cursor::new(b"hello".to_vec())));
        assert_eq!(handle.size(), 5);
        assert_eq!(handle.extension(), Some("txt"));
        assert!(format!("{handle:?}").contains("abcdef.txt"));
        assert_eq!(handle.read_all().unwrap(), b"hello");
    }
}
