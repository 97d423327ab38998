use std::io::{Cursor, Read};

use project_files::{Archive, ArchiveDecoder, ArchiveEntry, DecodeError};

/// Decodes `.zip` archives, the format the course projects are published in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipDecoder;

/// A zip archive held in memory. Entry contents are decompressed only
/// when read.
pub struct ZipProjectArchive {
    archive: zip::ZipArchive<Cursor<Vec<u8>>>,
    entries: Vec<ArchiveEntry>,
}

impl ZipProjectArchive {
    pub fn new(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DecodeError::Corrupt(format!("failed to read zip directory: {e}")))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(|e| DecodeError::Corrupt(format!("failed to read zip entry: {e}")))?;

            if file.enclosed_name().is_none() {
                return Err(DecodeError::UnsafePath(file.name().to_owned()));
            }

            entries.push(ArchiveEntry {
                relative_path: file.name().to_owned(),
                is_dir: file.is_dir(),
                index,
            });
        }

        Ok(Self { archive, entries })
    }
}

#[async_trait::async_trait]
impl Archive for ZipProjectArchive {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    async fn read_text(&mut self, entry: &ArchiveEntry) -> Result<String, DecodeError> {
        let mut file = self
            .archive
            .by_index(entry.index)
            .map_err(|e| DecodeError::Corrupt(format!("{}: {e}", entry.relative_path)))?;

        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)
            .map_err(|e| DecodeError::Corrupt(format!("{}: {e}", entry.relative_path)))?;

        String::from_utf8(bytes).map_err(|_| DecodeError::NotText(entry.relative_path.clone()))
    }
}

impl ArchiveDecoder for ZipDecoder {
    fn decode(&self, bytes: Vec<u8>) -> Result<Box<dyn Archive>, DecodeError> {
        Ok(Box::new(ZipProjectArchive::new(bytes)?))
    }
}
