use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use hoard_types::Identifier;

use crate::config::StoreConfig;
use crate::error::{Stage, StoreError, StoreResult};
use crate::handle::ObjectHandle;
use crate::hooks::{HookStage, NoOpHook, SaveContext, SaveHook, SaveReport};
use crate::sharding::NestedPathGenerator;
use crate::tee::TeeReader;
use crate::traits::{BlobStore, SaveRequest};

/// Prefix of staged uploads, so orphans are easy to find in the scratch dir.
pub const STAGING_PREFIX: &str = ".hoard-";

/// Sharded, content-addressed store on the local filesystem.
///
/// A save stages the body in a fresh temporary file, hashes it on the way
/// through, and renames the finished file to its shard path. Readers only
/// ever see complete files. The store holds no mutable state, so one
/// instance can be shared across threads freely.
pub struct FileSystemStore {
    config: StoreConfig,
    paths: NestedPathGenerator,
    hook: Arc<dyn SaveHook>,
}

impl FileSystemStore {
    /// Build a store, rejecting an unusable sharding layout up front.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let sharding = config.sharding();
        sharding.validate().map_err(StoreError::InvalidConfig)?;
        Ok(Self {
            paths: NestedPathGenerator::new(sharding),
            config,
            hook: Arc::new(NoOpHook),
        })
    }

    /// Install lifecycle hooks invoked around every save.
    pub fn with_hook(mut self, hook: Arc<dyn SaveHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Final on-disk path for `id`.
    pub fn path_for(&self, id: &Identifier) -> StoreResult<PathBuf> {
        self.paths
            .generate(id.as_str())
            .map_err(StoreError::PathGeneration)
    }

    /// Create a temp file in the scratch area with the configured mode.
    ///
    /// Dropping the returned file unlinks it, which is how every failed
    /// save cleans up after itself.
    fn stage(&self) -> StoreResult<NamedTempFile> {
        let scratch = self.config.scratch_dir();
        self.create_dirs(&scratch)?;
        let staged = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&scratch)
            .map_err(StoreError::io(Stage::CreateTemp))?;
        set_mode(staged.as_file(), self.config.file_mode)
            .map_err(StoreError::io(Stage::SetPermissions))?;
        Ok(staged)
    }

    fn create_dirs(&self, dir: &Path) -> StoreResult<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(self.config.dir_mode);
        }
        builder
            .create(dir)
            .map_err(StoreError::io(Stage::CreateDirs))
    }
}

impl BlobStore for FileSystemStore {
    fn save(&self, request: SaveRequest<'_>) -> StoreResult<Identifier> {
        let naming = request.naming.ok_or(StoreError::MissingNamingStrategy)?;

        self.hook
            .before_save(&SaveContext {
                content_type: request.content_type,
            })
            .map_err(|source| StoreError::Hook {
                stage: HookStage::Before,
                source,
            })?;

        let staged = self.stage()?;

        // Single pass: the naming strategy reads the body, the tee writes
        // each chunk it sees into the staged file.
        let mut tee = TeeReader::new(request.body, staged.as_file());
        let identifier = naming
            .generate(&mut tee, request.content_type)
            .map_err(StoreError::Naming)?;
        let size = tee.bytes_copied();

        staged
            .as_file()
            .sync_all()
            .map_err(StoreError::io(Stage::Sync))?;

        let path = self.path_for(&identifier)?;
        if let Some(parent) = path.parent() {
            self.create_dirs(parent)?;
        }

        // Atomic on a single volume: readers see the old state or the whole
        // new file, nothing in between.
        staged.persist(&path).map_err(|e| StoreError::Io {
            stage: Stage::Write,
            source: e.error,
        })?;
        debug!(id = %identifier, size, path = %path.display(), "published object");

        self.hook
            .after_save(&SaveReport {
                identifier: &identifier,
                path: &path,
                size,
            })
            .map_err(|source| {
                warn!(id = %identifier, error = %source, "after-save hook failed; object stays published");
                StoreError::Hook {
                    stage: HookStage::After,
                    source,
                }
            })?;

        Ok(identifier)
    }

    fn load(&self, id: &Identifier) -> StoreResult<ObjectHandle> {
        let path = self.path_for(id)?;
        let file = File::open(&path).map_err(StoreError::lookup(id, Stage::Open))?;
        let size = file
            .metadata()
            .map_err(StoreError::lookup(id, Stage::Stat))?
            .len();
        Ok(ObjectHandle::new(id.clone(), size, Box::new(file)))
    }

    fn delete(&self, id: &Identifier) -> StoreResult<()> {
        let path = self.path_for(id)?;
        fs::remove_file(&path).map_err(StoreError::lookup(id, Stage::Remove))?;
        debug!(id = %id, path = %path.display(), "removed object");
        Ok(())
    }
}

impl std::fmt::Debug for FileSystemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystemStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if mode & !0o7777 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{mode:#o} is not a permission mode"),
        ));
    }
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}
