use std::io::Read;

use hoard_types::Identifier;

use crate::error::StoreResult;
use crate::handle::ObjectHandle;
use crate::naming::NamingStrategy;

/// Everything a single save needs.
pub struct SaveRequest<'a> {
    pub body: &'a mut dyn Read,
    pub naming: Option<&'a dyn NamingStrategy>,
    /// MIME hint handed to the naming strategy.
    pub content_type: Option<&'a str>,
}

impl<'a> SaveRequest<'a> {
    /// A request with no naming strategy and no content-type hint.
    pub fn new(body: &'a mut dyn Read) -> Self {
        Self {
            body,
            naming: None,
            content_type: None,
        }
    }

    pub fn naming(mut self, naming: &'a dyn NamingStrategy) -> Self {
        self.naming = Some(naming);
        self
    }

    pub fn content_type(mut self, content_type: &'a str) -> Self {
        self.content_type = Some(content_type);
        self
    }
}

/// Content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - The identifier returned by `save` is derived from the bytes that were
///   actually stored.
/// - A saved object is complete before it becomes visible to `load`.
/// - Saving identical bytes twice returns the same identifier.
/// - A missing object is reported as [`StoreError::NotFound`], never as a
///   generic I/O failure.
///
/// [`StoreError::NotFound`]: crate::StoreError::NotFound
pub trait BlobStore: Send + Sync {
    /// Consume the request body and store it under its derived identifier.
    fn save(&self, request: SaveRequest<'_>) -> StoreResult<Identifier>;

    /// Open a stored object for reading.
    fn load(&self, id: &Identifier) -> StoreResult<ObjectHandle>;

    /// Remove a stored object.
    fn delete(&self, id: &Identifier) -> StoreResult<()>;

    /// Check whether an object exists.
    ///
    /// Default implementation opens the object and drops the handle.
    fn exists(&self, id: &Identifier) -> StoreResult<bool> {
        match self.load(id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
