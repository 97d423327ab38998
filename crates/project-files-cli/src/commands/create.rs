use anyhow::Result;
use project_files::{FileSystem, LegacyLoader, ProjectLoader, SyncOptions, legacy};
use project_files_remote::{AutoDecoder, HttpFetcher};

use super::report;

/// Create missing project files, keeping anything already on disk.
pub async fn run(
    loader: &ProjectLoader<HttpFetcher, AutoDecoder>,
    builtin: &dyn LegacyLoader,
    fs: &dyn FileSystem,
    options: SyncOptions,
) -> Result<()> {
    println!("Creating project files from {}...", loader.archive_url());

    let populated =
        legacy::create_files(loader, builtin, fs, report::with_progress(options)).await?;
    report::print_populated(&populated);

    Ok(())
}
