pub mod detect;
pub mod http;
pub mod tarball;
pub mod zip_archive;

pub use detect::{ArchiveFormat, AutoDecoder, detect_format};
pub use http::HttpFetcher;
pub use tarball::{TarGzArchive, TarGzDecoder};
pub use zip_archive::{ZipDecoder, ZipProjectArchive};
