use std::fmt;
use std::path::Path;

use hoard_types::Identifier;

/// What a before-save hook gets to see. The identifier is not known yet.
#[derive(Clone, Copy, Debug)]
pub struct SaveContext<'a> {
    pub content_type: Option<&'a str>,
}

/// What an after-save hook gets to see. The object is already published.
#[derive(Clone, Copy, Debug)]
pub struct SaveReport<'a> {
    pub identifier: &'a Identifier,
    pub path: &'a Path,
    pub size: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStage {
    Before,
    After,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before-save"),
            Self::After => f.write_str("after-save"),
        }
    }
}

/// Failure reported by a hook.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HookError(String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Notifications around [`FileSystemStore::save`](crate::FileSystemStore).
///
/// An error from either callback aborts the save and surfaces as
/// [`StoreError::Hook`](crate::StoreError::Hook). A failing `after_save` does
/// not unpublish the object.
pub trait SaveHook: Send + Sync {
    fn before_save(&self, ctx: &SaveContext<'_>) -> Result<(), HookError>;
    fn after_save(&self, report: &SaveReport<'_>) -> Result<(), HookError>;
}

pub struct NoOpHook;

impl SaveHook for NoOpHook {
    fn before_save(&self, _ctx: &SaveContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    fn after_save(&self, _report: &SaveReport<'_>) -> Result<(), HookError> {
        Ok(())
    }
}

/// Logs every save through `tracing`.
pub struct TracingHook;

impl SaveHook for TracingHook {
    fn before_save(&self, ctx: &SaveContext<'_>) -> Result<(), HookError> {
        tracing::info!(content_type = ?ctx.content_type, "saving object");
        Ok(())
    }

    fn after_save(&self, report: &SaveReport<'_>) -> Result<(), HookError> {
        tracing::info!(
            id = %report.identifier,
            size = report.size,
            path = %report.path.display(),
            "object saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_hook_allows() {
        let id = Identifier::parse("abcd").unwrap();
        NoOpHook
            .before_save(&SaveContext { content_type: None })
            .unwrap();
        NoOpHook
            .after_save(&SaveReport {
                identifier: &id,
                path: Path::new("x/abcd"),
                size: 4,
            })
            .unwrap();
    }

    #[test]
    fn tracing_hook_allows() {
        TracingHook
            .before_save(&SaveContext {
                content_type: Some("text/plain"),
            })
            .unwrap();
    }

    #[test]
    fn stage_display() {
        assert_eq!(HookStage::Before.to_string(), "before-save");
        assert_eq!(HookStage::After.to_string(), "after-save");
    }
}
