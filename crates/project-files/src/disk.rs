use std::io::ErrorKind;
use std::path::PathBuf;

use crate::fs::{FileSystem, FsError};

/// [`FileSystem`] backed by a directory on the local disk.
///
/// Virtual paths like `/projects/01/Not.hdl` resolve to
/// `<root>/projects/01/Not.hdl`. Paths that try to leave the root are
/// rejected.
#[derive(Debug, Clone)]
pub struct DiskFileSystem {
    root: PathBuf,
}

impl DiskFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a virtual path onto the host filesystem.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, FsError> {
        let mut resolved = self.root.clone();

        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            if segment == ".." || segment.contains('\\') || segment.contains(':') {
                return Err(FsError::InvalidPath(path.to_owned()));
            }
            resolved.push(segment);
        }

        Ok(resolved)
    }
}

fn map_io(path: &str, err: std::io::Error) -> FsError {
    match err.kind() {
        ErrorKind::NotFound => FsError::NotFound(path.to_owned()),
        _ => FsError::io(path, err),
    }
}

#[async_trait::async_trait]
impl FileSystem for DiskFileSystem {
    async fn stat(&self, path: &str) -> Result<(), FsError> {
        let host = self.resolve(path)?;
        tokio::fs::metadata(&host)
            .await
            .map(|_| ())
            .map_err(|e| map_io(path, e))
    }

    async fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let host = self.resolve(path)?;
        tokio::fs::create_dir(&host)
            .await
            .map_err(|e| map_io(path, e))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        let host = self.resolve(path)?;
        tokio::fs::write(&host, content)
            .await
            .map_err(|e| map_io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::ensure_dir;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn resolves_under_root() {
        let fs = DiskFileSystem::new("/srv/ide");
        assert_eq!(
            fs.resolve("/projects/01/Not.hdl").unwrap(),
            PathBuf::from("/srv/ide/projects/01/Not.hdl")
        );
    }

    #[test]
    fn rejects_parent_segments() {
        let fs = DiskFileSystem::new("/srv/ide");
        assert!(matches!(
            fs.resolve("/projects/../../etc/passwd"),
            Err(FsError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn writes_and_stats_files() {
        let root = temp_root("project-files-test-disk-write");
        let fs = DiskFileSystem::new(&root);

        assert!(matches!(fs.stat("/projects").await, Err(FsError::NotFound(_))));

        ensure_dir(&fs, "/projects/01").await.unwrap();
        fs.write_file("/projects/01/Not.hdl", "CHIP Not {}")
            .await
            .unwrap();

        fs.stat("/projects/01/Not.hdl").await.unwrap();
        assert_eq!(
            std::fs::read_to_string(root.join("projects/01/Not.hdl")).unwrap(),
            "CHIP Not {}"
        );

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn mkdir_requires_parent() {
        let root = temp_root("project-files-test-disk-mkdir");
        let fs = DiskFileSystem::new(&root);

        let result = fs.mkdir("/missing/child").await;
        assert!(matches!(result, Err(FsError::NotFound(_))));

        let _ = std::fs::remove_dir_all(&root);
    }
}
