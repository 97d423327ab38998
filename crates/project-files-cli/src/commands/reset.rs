use anyhow::Result;
use project_files::{FileSystem, LegacyLoader, ProjectLoader, SyncOptions, legacy};
use project_files_remote::{AutoDecoder, HttpFetcher};

use super::report;

/// Overwrite project files with fresh copies.
pub async fn run(
    loader: &ProjectLoader<HttpFetcher, AutoDecoder>,
    builtin: &dyn LegacyLoader,
    fs: &dyn FileSystem,
    projects: &[String],
    options: SyncOptions,
) -> Result<()> {
    println!("Resetting project files from {}...", loader.archive_url());

    let filter = (!projects.is_empty()).then_some(projects);
    let populated =
        legacy::reset_files(loader, builtin, fs, filter, report::with_progress(options)).await?;
    report::print_populated(&populated);

    Ok(())
}
