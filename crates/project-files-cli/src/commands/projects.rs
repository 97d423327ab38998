use anyhow::Result;
use project_files::ProjectLoader;
use project_files_remote::{AutoDecoder, HttpFetcher};

/// List the project ids contained in the archive.
pub async fn run(loader: &ProjectLoader<HttpFetcher, AutoDecoder>) -> Result<()> {
    let ids = loader.project_ids().await?;

    if ids.is_empty() {
        println!("No projects found.");
        return Ok(());
    }

    for id in &ids {
        println!("{id}");
    }
    println!("\n{} projects", ids.len());

    Ok(())
}
