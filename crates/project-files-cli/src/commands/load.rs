use std::path::Path;

use anyhow::{Context, Result};
use project_files::{FileSystem, ProjectLoader, SyncOptions};
use project_files_remote::{AutoDecoder, HttpFetcher};

use super::report;

/// Synchronize from an archive file already on disk.
pub async fn run(
    loader: &ProjectLoader<HttpFetcher, AutoDecoder>,
    fs: &dyn FileSystem,
    archive: &Path,
    overwrite: bool,
    options: SyncOptions,
) -> Result<()> {
    let bytes = tokio::fs::read(archive)
        .await
        .with_context(|| format!("failed to read archive: {}", archive.display()))?;

    let options = report::with_progress(options.with_skip_existing(!overwrite));
    let sync_report = loader.load_from_data(fs, bytes, options).await?;
    report::print_report(&sync_report);

    Ok(())
}
