use std::fmt;

/// Latest published archive of course project files.
pub const PROJECTS_ARCHIVE_URL: &str = "https://renanbazinin.github.io/projects/projects.zip";

/// File name of the archive bundled next to a deployment.
pub const ARCHIVE_FILE_NAME: &str = "projects.zip";

/// Fallback used when no deployment address is known.
pub const LOCAL_FALLBACK_LOCATION: &str = "./projects.zip";

/// Base paths the app is known to be served from.
const KNOWN_BASE_PATHS: &[&str] = &["/web-ide/", "/web-ide"];

/// In-app route segments; the app base is whatever precedes them.
const ROUTE_SEGMENTS: &[&str] = &[
    "/chip", "/cpu", "/asm", "/vm", "/bitmap", "/about", "/guide",
];

/// Errors that can occur while fetching archive bytes.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("{location} returned HTTP {status}")]
    Status { location: String, status: u16 },

    #[error("I/O error reading {location}: {message}")]
    Io { location: String, message: String },

    #[error("{primary_location}: {primary}; fallback {fallback_location}: {fallback}")]
    Exhausted {
        primary_location: String,
        primary: Box<FetchError>,
        fallback_location: String,
        fallback: Box<FetchError>,
    },
}

/// Which location supplied the archive bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// The published release.
    Primary,
    /// The copy bundled with the deployment.
    Fallback,
}

impl FetchSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primary => "release",
            Self::Fallback => "local",
        }
    }
}

impl fmt::Display for FetchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Archive bytes plus the location that produced them.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub bytes: Vec<u8>,
    pub source: FetchSource,
}

/// Retrieves raw bytes from a location (URL or local path).
///
/// A non-success status must be reported as an error.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, location: &str) -> Result<Vec<u8>, FetchError>;
}

#[async_trait::async_trait]
impl<T: Fetcher + ?Sized> Fetcher for std::sync::Arc<T> {
    async fn get(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        (**self).get(location).await
    }
}

/// Where to look when the primary location fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FallbackLocation {
    /// Use this location as-is.
    Fixed(String),
    /// Derive the location from the address the app is deployed at.
    Deployment(String),
    /// No deployment known; use [`LOCAL_FALLBACK_LOCATION`].
    #[default]
    Local,
}

impl FallbackLocation {
    pub fn resolve(&self) -> String {
        match self {
            Self::Fixed(location) => location.clone(),
            Self::Deployment(address) => fallback_archive_url(address),
            Self::Local => LOCAL_FALLBACK_LOCATION.to_owned(),
        }
    }
}

/// Compute the bundled archive URL for an app deployed at `address`.
///
/// `address` is a full URL such as `https://host/web-ide/chip`. The
/// archive is expected directly below the app base path.
pub fn fallback_archive_url(address: &str) -> String {
    let (origin, pathname) = split_origin(address);

    for base in KNOWN_BASE_PATHS {
        if pathname.starts_with(base) {
            let base = base.trim_end_matches('/');
            return format!("{origin}{base}/{ARCHIVE_FILE_NAME}");
        }
    }

    let mut base = ROUTE_SEGMENTS
        .iter()
        .find_map(|route| pathname.find(route).map(|idx| pathname[..idx].to_owned()))
        .unwrap_or_else(|| directory_of(pathname));

    if !base.ends_with('/') {
        base.push('/');
    }

    format!("{origin}{base}{ARCHIVE_FILE_NAME}")
}

fn directory_of(pathname: &str) -> String {
    if pathname.ends_with('/') {
        return pathname.to_owned();
    }

    match pathname.rfind('/') {
        Some(idx) if idx > 0 => pathname[..=idx].to_owned(),
        _ => "/".to_owned(),
    }
}

/// Split `scheme://host/path?query` into (`scheme://host`, `/path`).
fn split_origin(address: &str) -> (&str, &str) {
    let without_query = address.split(['?', '#']).next().unwrap_or(address);

    let authority_start = without_query.find("://").map(|i| i + 3).unwrap_or(0);

    match without_query[authority_start..].find('/') {
        Some(idx) => without_query.split_at(authority_start + idx),
        None => (without_query, "/"),
    }
}

/// Fetches the archive from a primary location, falling back to a
/// secondary one when the primary fails.
pub struct FallbackFetcher<F> {
    fetcher: F,
    fallback: FallbackLocation,
}

impl<F: Fetcher> FallbackFetcher<F> {
    pub fn new(fetcher: F, fallback: FallbackLocation) -> Self {
        Self { fetcher, fallback }
    }

    /// Fetch from `primary`, and from the fallback location when allowed.
    ///
    /// With `allow_fallback` off, the primary failure is returned as-is.
    pub async fn fetch(
        &self,
        primary: &str,
        allow_fallback: bool,
    ) -> Result<FetchResult, FetchError> {
        let primary_error = match self.fetcher.get(primary).await {
            Ok(bytes) => {
                return Ok(FetchResult {
                    bytes,
                    source: FetchSource::Primary,
                });
            }
            Err(e) => e,
        };

        if !allow_fallback {
            return Err(primary_error);
        }

        let fallback_location = self.fallback.resolve();
        tracing::warn!(
            %primary,
            error = %primary_error,
            "failed to fetch archive from primary location"
        );
        tracing::info!(fallback = %fallback_location, "falling back to local archive");

        match self.fetcher.get(&fallback_location).await {
            Ok(bytes) => Ok(FetchResult {
                bytes,
                source: FetchSource::Fallback,
            }),
            Err(fallback_error) => Err(FetchError::Exhausted {
                primary_location: primary.to_owned(),
                primary: Box::new(primary_error),
                fallback_location,
                fallback: Box::new(fallback_error),
            }),
        }
    }
}
