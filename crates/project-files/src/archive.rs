/// Errors raised while decoding archive bytes or reading entry contents.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unrecognized archive format")]
    Unsupported,

    #[error("corrupt archive: {0}")]
    Corrupt(String),

    #[error("unsafe entry path: {0}")]
    UnsafePath(String),

    #[error("entry is not UTF-8 text: {0}")]
    NotText(String),
}

/// One record inside a decoded archive.
///
/// Entries carry only metadata. Contents are read on demand through
/// [`Archive::read_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Archive-internal path, `/`-separated (e.g. `projects/01/Not.hdl`).
    pub relative_path: String,
    pub is_dir: bool,
    /// Position of the entry within the decoder's own storage.
    pub index: usize,
}

impl ArchiveEntry {
    pub fn file(relative_path: impl Into<String>, index: usize) -> Self {
        Self {
            relative_path: relative_path.into(),
            is_dir: false,
            index,
        }
    }

    pub fn dir(relative_path: impl Into<String>, index: usize) -> Self {
        Self {
            relative_path: relative_path.into(),
            is_dir: true,
            index,
        }
    }
}

/// A decoded archive whose entries have already been enumerated.
#[async_trait::async_trait]
pub trait Archive: Send {
    /// Every entry, in the order the decoder found them.
    fn entries(&self) -> &[ArchiveEntry];

    /// Read the full contents of a file entry as text.
    async fn read_text(&mut self, entry: &ArchiveEntry) -> Result<String, DecodeError>;
}

/// Turns raw bytes into an [`Archive`].
///
/// Decoding enumerates every entry up front, so a malformed archive is
/// rejected before anything is written.
pub trait ArchiveDecoder: Send + Sync {
    fn decode(&self, bytes: Vec<u8>) -> Result<Box<dyn Archive>, DecodeError>;
}

impl<T: ArchiveDecoder + ?Sized> ArchiveDecoder for std::sync::Arc<T> {
    fn decode(&self, bytes: Vec<u8>) -> Result<Box<dyn Archive>, DecodeError> {
        (**self).decode(bytes)
    }
}
