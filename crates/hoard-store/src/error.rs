use std::fmt;
use std::io;

use hoard_types::Identifier;

use crate::hooks::{HookError, HookStage};
use crate::naming::NamingError;
use crate::sharding::ShardingError;

/// The filesystem step an I/O error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    CreateTemp,
    SetPermissions,
    Sync,
    CreateDirs,
    /// The final rename into place.
    Write,
    Open,
    Stat,
    Remove,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateTemp => "create temporary file",
            Self::SetPermissions => "set requested file mode",
            Self::Sync => "sync staged file",
            Self::CreateDirs => "create nested directories",
            Self::Write => "write file",
            Self::Open => "open file",
            Self::Stat => "stat file",
            Self::Remove => "remove file",
        };
        f.write_str(s)
    }
}

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `save` was called without a naming strategy.
    #[error("cannot save without a naming strategy")]
    MissingNamingStrategy,

    /// The naming strategy failed (usually a read error on the input).
    #[error("failed to generate name: {0}")]
    Naming(#[source] NamingError),

    /// The identifier does not fit the sharding layout.
    #[error("failed to generate path: {0}")]
    PathGeneration(#[source] ShardingError),

    /// The store was built with an unusable sharding configuration.
    #[error("invalid sharding configuration: {0}")]
    InvalidConfig(#[source] ShardingError),

    /// No object is stored under this identifier.
    #[error("object not found: {0}")]
    NotFound(Identifier),

    /// Any other filesystem failure, tagged with the stage that hit it.
    #[error("failed to {stage}: {source}")]
    Io {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    /// A lifecycle hook rejected the save.
    #[error("{stage} hook failed: {source}")]
    Hook {
        stage: HookStage,
        #[source]
        source: HookError,
    },
}

impl StoreError {
    /// Adapter for `map_err` that tags an I/O error with its stage.
    pub fn io(stage: Stage) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Io { stage, source }
    }

    /// Tag an I/O error, turning `ErrorKind::NotFound` into [`StoreError::NotFound`].
    pub(crate) fn lookup(id: &Identifier, stage: Stage) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| {
            if source.kind() == io::ErrorKind::NotFound {
                Self::NotFound(id.clone())
            } else {
                Self::Io { stage, source }
            }
        }
    }

    /// `true` when the requested object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// `true` when a lifecycle hook, not the storage layer, failed.
    pub fn is_hook_failure(&self) -> bool {
        matches!(self, Self::Hook { .. })
    }

    /// The stage of an I/O failure, if this is one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Io { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Kind of the underlying I/O error, wherever it sits in the chain.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            Self::Naming(NamingError::Read(source)) => Some(source.kind()),
            Self::NotFound(_) => Some(io::ErrorKind::NotFound),
            _ => None,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
