/// Errors reported by a [`FileSystem`].
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },
}

impl FsError {
    pub fn io(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// The filesystem project files are written into.
///
/// Paths are absolute and `/`-separated regardless of host platform.
/// A successful `write_file` must be visible to a later `stat` on the
/// same path.
#[async_trait::async_trait]
pub trait FileSystem: Send + Sync {
    /// Succeeds if `path` exists, as either a file or a directory.
    async fn stat(&self, path: &str) -> Result<(), FsError>;

    /// Create a single directory level. The parent must already exist.
    async fn mkdir(&self, path: &str) -> Result<(), FsError>;

    /// Write the full contents of a file, replacing anything already there.
    async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError>;
}

/// True if `path` exists. Any `stat` failure counts as absent.
pub async fn exists(fs: &dyn FileSystem, path: &str) -> bool {
    fs.stat(path).await.is_ok()
}

/// Make sure `dir` and all of its ancestors exist.
///
/// Walks the path one segment at a time and creates each level that
/// `stat` cannot find. Existing levels are left alone, so calling this
/// repeatedly for overlapping paths is harmless.
pub async fn ensure_dir(fs: &dyn FileSystem, dir: &str) -> Result<(), FsError> {
    let mut current = String::with_capacity(dir.len());

    for segment in dir.split('/').filter(|s| !s.is_empty()) {
        current.push('/');
        current.push_str(segment);

        if fs.stat(&current).await.is_err() {
            fs.mkdir(&current).await?;
        }
    }

    Ok(())
}
