use std::time::Duration;

use project_files::{FetchError, Fetcher};

/// Fetches archive bytes over HTTP(S), or from disk for local locations.
///
/// Locations starting with `http://` or `https://` are downloaded;
/// `file://` URLs and plain paths are read from the local filesystem.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Build a fetcher whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", "project-files")
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("archive download failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                location: url.to_owned(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read archive body: {e}")))?;

        Ok(bytes.to_vec())
    }

    async fn read_local(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let path = location.strip_prefix("file://").unwrap_or(location);
        tokio::fs::read(path).await.map_err(|e| FetchError::Io {
            location: location.to_owned(),
            message: e.to_string(),
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// True for `http://` and `https://` locations, in any letter case.
fn is_remote(location: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        location
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(%location, "fetching archive");
        if is_remote(location) {
            self.download(location).await
        } else {
            self.read_local(location).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://example.com/projects.zip"));
        assert!(is_remote("http://localhost:8080/projects.zip"));
        assert!(!is_remote("./projects.zip"));
        assert!(!is_remote("file:///srv/projects.zip"));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert!(is_remote("HTTPS://example.com/projects.zip"));
        assert!(is_remote("Http://localhost/projects.zip"));
        assert!(!is_remote("https:/"));
    }

    #[tokio::test]
    async fn reads_file_urls_and_plain_paths() {
        let path = std::env::temp_dir().join("project-files-test-local-fetch.zip");
        std::fs::write(&path, b"bundled").unwrap();
        let fetcher = HttpFetcher::new();

        let plain = fetcher.get(path.to_str().unwrap()).await.unwrap();
        let url = fetcher
            .get(&format!("file://{}", path.display()))
            .await
            .unwrap();

        assert_eq!(plain, b"bundled");
        assert_eq!(url, b"bundled");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_local_file_is_io_error() {
        let fetcher = HttpFetcher::new();
        let result = fetcher.get("./definitely-not-here/projects.zip").await;
        assert!(matches!(result, Err(FetchError::Io { .. })));
    }
}
