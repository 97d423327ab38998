pub mod archive;
pub mod disk;
pub mod fetch;
pub mod fs;
pub mod legacy;
pub mod loader;
pub mod path;
pub mod sync;

pub use archive::{Archive, ArchiveDecoder, ArchiveEntry, DecodeError};
pub use disk::DiskFileSystem;
pub use fetch::{
    FallbackFetcher, FallbackLocation, FetchError, FetchResult, FetchSource, Fetcher,
    PROJECTS_ARCHIVE_URL, fallback_archive_url,
};
pub use fs::{FileSystem, FsError, ensure_dir, exists};
pub use legacy::{LegacyError, LegacyLoader, Populated};
pub use loader::{LoadOutcome, Policy, ProjectLoader};
pub use path::{DEFAULT_BASE_PATH, Normalized};
pub use sync::{Phase, ProgressFn, SyncError, SyncOptions, SyncReport, sync_archive, sync_bytes};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
