use std::io::Read;
use std::path::Component;

use flate2::read::GzDecoder;
use project_files::{Archive, ArchiveDecoder, ArchiveEntry, DecodeError};

/// Decodes `.tar.gz` archives.
///
/// Tar streams cannot be read out of order, so every entry is
/// decompressed while decoding. Text decoding still happens on read.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzDecoder;

/// A fully extracted tarball.
pub struct TarGzArchive {
    entries: Vec<ArchiveEntry>,
    contents: Vec<Vec<u8>>,
}

impl TarGzArchive {
    pub fn new(bytes: &[u8]) -> Result<Self, DecodeError> {
        let decoder = GzDecoder::new(bytes);
        let mut archive = tar::Archive::new(decoder);

        let tar_entries = archive
            .entries()
            .map_err(|e| DecodeError::Corrupt(format!("failed to read tar entries: {e}")))?;

        let mut entries = Vec::new();
        let mut contents = Vec::new();

        for entry_result in tar_entries {
            let mut entry = entry_result
                .map_err(|e| DecodeError::Corrupt(format!("failed to read tar entry: {e}")))?;

            let entry_type = entry.header().entry_type();
            let is_dir = entry_type.is_dir();

            // Links and special files never become project files
            if !is_dir && entry_type != tar::EntryType::Regular {
                continue;
            }

            let path = entry
                .path()
                .map_err(|e| DecodeError::Corrupt(format!("invalid path in tar: {e}")))?
                .into_owned();

            if path
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
            {
                return Err(DecodeError::UnsafePath(path.to_string_lossy().into_owned()));
            }

            let mut data = Vec::new();
            if !is_dir {
                entry
                    .read_to_end(&mut data)
                    .map_err(|e| DecodeError::Corrupt(format!("failed to read tar entry: {e}")))?;
            }

            let relative_path = path
                .to_string_lossy()
                .replace('\\', "/")
                .trim_start_matches("./")
                .to_owned();
            entries.push(ArchiveEntry {
                relative_path,
                is_dir,
                index: contents.len(),
            });
            contents.push(data);
        }

        Ok(Self { entries, contents })
    }
}

#[async_trait::async_trait]
impl Archive for TarGzArchive {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Hands over the entry's bytes; a second read of the same entry
    /// yields empty text.
    async fn read_text(&mut self, entry: &ArchiveEntry) -> Result<String, DecodeError> {
        let data = self.contents.get_mut(entry.index).ok_or_else(|| {
            DecodeError::Corrupt(format!("no such entry: {}", entry.relative_path))
        })?;

        String::from_utf8(std::mem::take(data))
            .map_err(|_| DecodeError::NotText(entry.relative_path.clone()))
    }
}

impl ArchiveDecoder for TarGzDecoder {
    fn decode(&self, bytes: Vec<u8>) -> Result<Box<dyn Archive>, DecodeError> {
        Ok(Box::new(TarGzArchive::new(&bytes)?))
    }
}
