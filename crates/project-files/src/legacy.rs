//! Two-stage population: the archive pipeline first, a fixed built-in
//! file set when that fails.

use crate::archive::ArchiveDecoder;
use crate::fetch::Fetcher;
use crate::fs::{FileSystem, FsError};
use crate::loader::{LoadOutcome, ProjectLoader};
use crate::sync::{SyncError, SyncOptions};

/// Errors from a [`LegacyLoader`].
#[derive(Debug, thiserror::Error)]
pub enum LegacyError {
    #[error("filesystem error: {0}")]
    Filesystem(#[from] FsError),

    #[error("{0}")]
    Other(String),
}

/// Writes a built-in set of project files without any archive.
#[async_trait::async_trait]
pub trait LegacyLoader: Send + Sync {
    /// Overwrite project files, optionally limited to some project ids.
    async fn reset_files(
        &self,
        fs: &dyn FileSystem,
        projects: Option<&[String]>,
    ) -> Result<(), LegacyError>;

    /// Create project files that are missing.
    async fn create_files(&self, fs: &dyn FileSystem) -> Result<(), LegacyError>;

    /// Overwrite only test files (`.tst`, `.cmp`).
    async fn reset_tests(
        &self,
        fs: &dyn FileSystem,
        projects: Option<&[String]>,
    ) -> Result<(), LegacyError>;
}

/// Which pipeline ended up populating the filesystem.
#[derive(Debug)]
pub enum Populated {
    Archive(LoadOutcome),
    /// The archive pipeline failed with `cause`; built-in files were written.
    Legacy { cause: SyncError },
}

impl Populated {
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy { .. })
    }
}

/// Reset project files from the archive, or from built-in files if the
/// archive pipeline fails. The project filter only applies to the
/// built-in set; the archive always resets every project.
pub async fn reset_files<F, D>(
    loader: &ProjectLoader<F, D>,
    legacy: &dyn LegacyLoader,
    fs: &dyn FileSystem,
    projects: Option<&[String]>,
    options: SyncOptions,
) -> Result<Populated, LegacyError>
where
    F: Fetcher,
    D: ArchiveDecoder,
{
    match loader.reset(fs, options).await {
        Ok(outcome) => Ok(Populated::Archive(outcome)),
        Err(cause) => {
            tracing::warn!(
                error = %cause,
                "archive loading failed, falling back to built-in files"
            );
            legacy.reset_files(fs, projects).await?;
            Ok(Populated::Legacy { cause })
        }
    }
}

/// Create missing project files from the archive, or from built-in files
/// if the archive pipeline fails.
pub async fn create_files<F, D>(
    loader: &ProjectLoader<F, D>,
    legacy: &dyn LegacyLoader,
    fs: &dyn FileSystem,
    options: SyncOptions,
) -> Result<Populated, LegacyError>
where
    F: Fetcher,
    D: ArchiveDecoder,
{
    match loader.create(fs, options).await {
        Ok(outcome) => Ok(Populated::Archive(outcome)),
        Err(cause) => {
            tracing::warn!(
                error = %cause,
                "archive loading failed, falling back to built-in files"
            );
            legacy.create_files(fs).await?;
            Ok(Populated::Legacy { cause })
        }
    }
}

/// Reset test files. Always served by the built-in set.
pub async fn reset_tests(
    legacy: &dyn LegacyLoader,
    fs: &dyn FileSystem,
    projects: Option<&[String]>,
) -> Result<(), LegacyError> {
    legacy.reset_tests(fs, projects).await
}
