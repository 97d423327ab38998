use std::fmt;

use crate::archive::{Archive, ArchiveDecoder, DecodeError};
use crate::fetch::FetchError;
use crate::fs::{FileSystem, FsError, ensure_dir, exists};
use crate::path::{self, DEFAULT_BASE_PATH, Normalized};

/// Callback invoked with `(done, total)` after each file entry.
pub type ProgressFn = Box<dyn FnMut(usize, usize) + Send>;

/// Stage of a synchronization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Decoding,
    Enumerating,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetching => write!(f, "fetching"),
            Self::Decoding => write!(f, "decoding"),
            Self::Enumerating => write!(f, "enumerating"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Any failure of the fetch → decode → write pipeline.
///
/// Fetch and decode failures happen before the filesystem is touched.
/// Filesystem failures leave earlier writes in place.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("archive decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("filesystem error: {0}")]
    Filesystem(#[from] FsError),
}

impl SyncError {
    /// The phase the pipeline was in when it failed.
    pub fn phase(&self) -> Phase {
        match self {
            Self::Fetch(_) => Phase::Fetching,
            Self::Decode(_) => Phase::Decoding,
            Self::Filesystem(_) => Phase::Enumerating,
        }
    }
}

/// Options for one synchronization call.
pub struct SyncOptions {
    /// Leave files that already exist untouched.
    pub skip_existing: bool,
    /// Directory entries are written under.
    pub base_path: String,
    /// Try the fallback location when the primary fetch fails.
    pub use_fallback: bool,
    pub on_progress: Option<ProgressFn>,
}

impl SyncOptions {
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_skip_existing(mut self, skip_existing: bool) -> Self {
        self.skip_existing = skip_existing;
        self
    }

    pub fn with_fallback(mut self, use_fallback: bool) -> Self {
        self.use_fallback = use_fallback;
        self
    }

    pub fn on_progress(mut self, f: impl FnMut(usize, usize) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    fn report_progress(&mut self, done: usize, total: usize) {
        if let Some(f) = self.on_progress.as_mut() {
            f(done, total);
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            skip_existing: true,
            base_path: DEFAULT_BASE_PATH.to_owned(),
            use_fallback: true,
            on_progress: None,
        }
    }
}

impl fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("skip_existing", &self.skip_existing)
            .field("base_path", &self.base_path)
            .field("use_fallback", &self.use_fallback)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// Counts of what a synchronization pass did with each file entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files written (created or overwritten).
    pub written: u64,
    /// Files left alone because they already existed.
    pub skipped: u64,
    /// Root-level entries that are never materialized.
    pub ignored: u64,
}

impl SyncReport {
    pub fn processed(&self) -> u64 {
        self.written + self.skipped + self.ignored
    }
}

/// Decode `bytes` and synchronize every entry into `fs`.
pub async fn sync_bytes(
    fs: &dyn FileSystem,
    decoder: &dyn ArchiveDecoder,
    bytes: Vec<u8>,
    options: &mut SyncOptions,
) -> Result<SyncReport, SyncError> {
    tracing::debug!(phase = %Phase::Decoding, size = bytes.len());
    let mut archive = decoder.decode(bytes)?;
    sync_archive(fs, archive.as_mut(), options).await
}

/// Write the file entries of `archive` into `fs` under `options.base_path`.
///
/// Entries are handled one at a time in archive order. Directory entries
/// are skipped; parent directories are created as files are written.
/// The first content or filesystem error aborts the pass.
pub async fn sync_archive(
    fs: &dyn FileSystem,
    archive: &mut dyn Archive,
    options: &mut SyncOptions,
) -> Result<SyncReport, SyncError> {
    let files: Vec<_> = archive
        .entries()
        .iter()
        .filter(|entry| !entry.is_dir)
        .cloned()
        .collect();
    let total = files.len();

    tracing::debug!(phase = %Phase::Enumerating, total, base_path = %options.base_path);

    let mut report = SyncReport::default();

    for (done, entry) in files.iter().enumerate().map(|(i, e)| (i + 1, e)) {
        let relative = match path::normalize(&entry.relative_path) {
            Normalized::Relative(relative) => relative,
            Normalized::Ignored => {
                report.ignored += 1;
                options.report_progress(done, total);
                continue;
            }
        };

        let target = path::target_path(&options.base_path, &relative);

        if options.skip_existing && exists(fs, &target).await {
            tracing::trace!(%target, "keeping existing file");
            report.skipped += 1;
            options.report_progress(done, total);
            continue;
        }

        if let Some(dir) = path::parent_dir(&target) {
            ensure_dir(fs, dir).await?;
        }

        let content = archive.read_text(entry).await?;
        fs.write_file(&target, &content).await?;
        tracing::trace!(%target, "wrote file");

        report.written += 1;
        options.report_progress(done, total);
    }

    tracing::debug!(
        phase = %Phase::Completed,
        written = report.written,
        skipped = report.skipped,
        ignored = report.ignored
    );

    Ok(report)
}
