use std::collections::BTreeSet;

use crate::archive::ArchiveDecoder;
use crate::fetch::{FallbackFetcher, FetchSource, Fetcher, PROJECTS_ARCHIVE_URL};
use crate::fs::FileSystem;
use crate::path;
use crate::sync::{self, Phase, SyncError, SyncOptions, SyncReport};

/// How existing files are treated during a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Overwrite every file with the archive's copy.
    Reset,
    /// Only fill in files that are missing, preserving user edits.
    Create,
}

impl Policy {
    pub fn skip_existing(&self) -> bool {
        matches!(self, Self::Create)
    }
}

/// Result of a successful archive load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub source: FetchSource,
    pub report: SyncReport,
}

/// Loads course project files from the published archive.
pub struct ProjectLoader<F, D> {
    fetcher: FallbackFetcher<F>,
    decoder: D,
    archive_url: String,
}

impl<F: Fetcher, D: ArchiveDecoder> ProjectLoader<F, D> {
    pub fn new(fetcher: FallbackFetcher<F>, decoder: D) -> Self {
        Self {
            fetcher,
            decoder,
            archive_url: PROJECTS_ARCHIVE_URL.to_owned(),
        }
    }

    pub fn with_archive_url(mut self, url: impl Into<String>) -> Self {
        self.archive_url = url.into();
        self
    }

    pub fn archive_url(&self) -> &str {
        &self.archive_url
    }

    /// Fetch, decode and synchronize under `policy`.
    ///
    /// The policy decides `skip_existing`; the value in `options` is ignored.
    pub async fn load(
        &self,
        fs: &dyn FileSystem,
        policy: Policy,
        options: SyncOptions,
    ) -> Result<LoadOutcome, SyncError> {
        let mut options = options.with_skip_existing(policy.skip_existing());

        tracing::debug!(phase = %Phase::Fetching, url = %self.archive_url, ?policy);
        let fetched = self
            .fetcher
            .fetch(&self.archive_url, options.use_fallback)
            .await?;

        let report = sync::sync_bytes(fs, &self.decoder, fetched.bytes, &mut options).await?;

        tracing::info!(
            source = %fetched.source,
            written = report.written,
            skipped = report.skipped,
            "synchronized project files"
        );

        Ok(LoadOutcome {
            source: fetched.source,
            report,
        })
    }

    /// Overwrite all project files with fresh copies.
    pub async fn reset(
        &self,
        fs: &dyn FileSystem,
        options: SyncOptions,
    ) -> Result<LoadOutcome, SyncError> {
        self.load(fs, Policy::Reset, options).await
    }

    /// Create project files that do not exist yet.
    pub async fn create(
        &self,
        fs: &dyn FileSystem,
        options: SyncOptions,
    ) -> Result<LoadOutcome, SyncError> {
        self.load(fs, Policy::Create, options).await
    }

    /// Synchronize from archive bytes already in hand. Nothing is fetched,
    /// so `use_fallback` has no effect.
    pub async fn load_from_data(
        &self,
        fs: &dyn FileSystem,
        bytes: Vec<u8>,
        mut options: SyncOptions,
    ) -> Result<SyncReport, SyncError> {
        sync::sync_bytes(fs, &self.decoder, bytes, &mut options).await
    }

    /// Sorted, de-duplicated project ids present in the archive.
    pub async fn project_ids(&self) -> Result<Vec<String>, SyncError> {
        let fetched = self.fetcher.fetch(&self.archive_url, true).await?;
        let archive = self.decoder.decode(fetched.bytes)?;

        let ids: BTreeSet<String> = archive
            .entries()
            .iter()
            .filter_map(|entry| path::project_id(&entry.relative_path))
            .collect();

        Ok(ids.into_iter().collect())
    }
}
