use project_files::{Archive, ArchiveDecoder, DecodeError};

use crate::tarball::TarGzDecoder;
use crate::zip_archive::ZipDecoder;

/// Archive formats recognized by magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        // local file header, or end-of-directory record of an empty zip
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Some(ArchiveFormat::Zip),
        [0x1F, 0x8B, ..] => Some(ArchiveFormat::TarGz),
        _ => None,
    }
}

/// Picks the zip or tar.gz decoder based on the archive's leading bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecoder;

impl ArchiveDecoder for AutoDecoder {
    fn decode(&self, bytes: Vec<u8>) -> Result<Box<dyn Archive>, DecodeError> {
        match detect_format(&bytes) {
            Some(ArchiveFormat::Zip) => ZipDecoder.decode(bytes),
            Some(ArchiveFormat::TarGz) => TarGzDecoder.decode(bytes),
            None => Err(DecodeError::Unsupported),
        }
    }
}
