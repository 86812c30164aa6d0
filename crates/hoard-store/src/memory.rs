use std::collections::HashMap;
use std::io::Cursor;
use std::sync::RwLock;

use hoard_types::Identifier;

use crate::error::{StoreError, StoreResult};
use crate::handle::ObjectHandle;
use crate::tee::TeeReader;
use crate::traits::{BlobStore, SaveRequest};

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Objects are held behind a `RwLock` and
/// copied on read. Saves follow the same naming contract as the filesystem
/// store, so identifiers are interchangeable between the two.
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<Identifier, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn save(&self, request: SaveRequest<'_>) -> StoreResult<Identifier> {
        let naming = request.naming.ok_or(StoreError::MissingNamingStrategy)?;
        let mut data = Vec::new();
        let mut tee = TeeReader::new(request.body, &mut data);
        let id = naming
            .generate(&mut tee, request.content_type)
            .map_err(StoreError::Naming)?;
        let mut map = self.objects.write().expect("lock poisoned");
        map.insert(id.clone(), data);
        Ok(id)
    }

    fn load(&self, id: &Identifier) -> StoreResult<ObjectHandle> {
        let map = self.objects.read().expect("lock poisoned");
        let data = map
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(ObjectHandle::new(
            id.clone(),
            data.len() as u64,
            Box::new(Cursor::new(data)),
        ))
    }

    fn exists(&self, id: &Identifier) -> StoreResult<bool> {
        Ok(self.objects.read().expect("lock poisoned").contains_key(id))
    }

    fn delete(&self, id: &Identifier) -> StoreResult<()> {
        let mut map = self.objects.write().expect("lock poisoned");
        map.remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::Sha256Naming;

    fn save(store: &InMemoryBlobStore, data: &[u8]) -> Identifier {
        let mut body = Cursor::new(data.to_vec());
        store
            .save(SaveRequest::new(&mut body).naming(&Sha256Naming::new()))
            .unwrap()
    }

    #[test]
    fn save_and_load() {
        let store = InMemoryBlobStore::new();
        let id = save(&store, b"hello world");
        assert_eq!(
            id.as_str(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        let handle = store.load(&id).unwrap();
        assert_eq!(handle.size(), 11);
        assert_eq!(handle.read_all().unwrap(), b"hello world");
    }

    #[test]
    fn naming_strategy_required() {
        let store = InMemoryBlobStore::new();
        let mut body = Cursor::new(b"x".to_vec());
        let err = store.save(SaveRequest::new(&mut body)).unwrap_err();
        assert!(matches!(err, StoreError::MissingNamingStrategy));
        assert!(store.is_empty());
    }

    #[test]
    fn same_content_same_id() {
        let store = InMemoryBlobStore::new();
        let a = save(&store, b"identical content");
        let b = save(&store, b"identical content");
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_object_is_not_found() {
        let store = InMemoryBlobStore::new();
        let id = Identifier::parse("nonexistent").unwrap();
        assert!(store.load(&id).unwrap_err().is_not_found());
        assert!(store.delete(&id).unwrap_err().is_not_found());
        assert!(!store.exists(&id).unwrap());
    }

    #[test]
    fn delete_removes() {
        let store = InMemoryBlobStore::new();
        let id = save(&store, b"to-delete");
        assert!(store.exists(&id).unwrap());
        store.delete(&id).unwrap();
        assert!(!store.exists(&id).unwrap());
    }
}
