use project_files::path::target_path;
use project_files::{FileSystem, LegacyError, LegacyLoader, ensure_dir, exists};

/// A project file compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinFile {
    pub project: &'static str,
    pub name: &'static str,
    pub content: &'static str,
}

impl BuiltinFile {
    fn is_test(&self) -> bool {
        self.name.ends_with(".tst") || self.name.ends_with(".cmp")
    }
}

const NOT_HDL: &str = "// This file is part of www.nand2tetris.org
// and the book \"The Elements of Computing Systems\"
// by Nisan and Schocken, MIT Press.
/**
 * Not gate:
 * if (in) out = 0, else out = 1
 */
CHIP Not {
    IN in;
    OUT out;

    PARTS:
    //// Replace this comment with your code.
}
";

const NOT_TST: &str = "// This file is part of www.nand2tetris.org
// and the book \"The Elements of Computing Systems\"
// by Nisan and Schocken, MIT Press.

load Not.hdl,
output-file Not.out,
compare-to Not.cmp,
output-list in out;

set in 0,
eval,
output;

set in 1,
eval,
output;
";

const NOT_CMP: &str = "|in |out|
| 0 | 1 |
| 1 | 0 |
";

/// Files written when the archive cannot be loaded at all.
pub const BUILTIN_FILES: &[BuiltinFile] = &[
    BuiltinFile {
        project: "01",
        name: "Not.hdl",
        content: NOT_HDL,
    },
    BuiltinFile {
        project: "01",
        name: "Not.tst",
        content: NOT_TST,
    },
    BuiltinFile {
        project: "01",
        name: "Not.cmp",
        content: NOT_CMP,
    },
];

/// Legacy loader backed by [`BUILTIN_FILES`].
pub struct BuiltinFiles {
    base_path: String,
}

impl BuiltinFiles {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn selected<'a>(
        projects: Option<&'a [String]>,
    ) -> impl Iterator<Item = &'static BuiltinFile> + 'a {
        BUILTIN_FILES.iter().filter(move |file| {
            projects.is_none_or(|ids| ids.iter().any(|id| id == file.project))
        })
    }

    async fn write(
        &self,
        fs: &dyn FileSystem,
        file: &BuiltinFile,
        overwrite: bool,
    ) -> Result<(), LegacyError> {
        let dir = target_path(&self.base_path, file.project);
        let path = format!("{dir}/{}", file.name);

        if !overwrite && exists(fs, &path).await {
            return Ok(());
        }

        ensure_dir(fs, &dir).await?;
        fs.write_file(&path, file.content).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LegacyLoader for BuiltinFiles {
    async fn reset_files(
        &self,
        fs: &dyn FileSystem,
        projects: Option<&[String]>,
    ) -> Result<(), LegacyError> {
        for file in Self::selected(projects) {
            self.write(fs, file, true).await?;
        }
        Ok(())
    }

    async fn create_files(&self, fs: &dyn FileSystem) -> Result<(), LegacyError> {
        for file in BUILTIN_FILES {
            self.write(fs, file, false).await?;
        }
        Ok(())
    }

    async fn reset_tests(
        &self,
        fs: &dyn FileSystem,
        projects: Option<&[String]>,
    ) -> Result<(), LegacyError> {
        for file in Self::selected(projects).filter(|f| f.is_test()) {
            self.write(fs, file, true).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use project_files::test_support::InMemoryFs;

    use super::*;

    #[tokio::test]
    async fn reset_writes_every_builtin_file() {
        let fs = InMemoryFs::new();
        BuiltinFiles::new("/projects")
            .reset_files(&fs, None)
            .await
            .unwrap();

        assert_eq!(fs.files().len(), BUILTIN_FILES.len());
        assert_eq!(fs.read("/projects/01/Not.cmp").as_deref(), Some(NOT_CMP));
    }

    #[tokio::test]
    async fn reset_respects_project_filter() {
        let fs = InMemoryFs::new();
        let projects = vec!["02".to_owned()];
        BuiltinFiles::new("/projects")
            .reset_files(&fs, Some(projects.as_slice()))
            .await
            .unwrap();

        assert!(fs.files().is_empty());
    }

    #[tokio::test]
    async fn create_preserves_existing_files() {
        let fs = InMemoryFs::new();
        fs.seed("/projects/01/Not.hdl", "my solution");

        BuiltinFiles::new("/projects").create_files(&fs).await.unwrap();

        assert_eq!(fs.read("/projects/01/Not.hdl").as_deref(), Some("my solution"));
        assert_eq!(fs.read("/projects/01/Not.tst").as_deref(), Some(NOT_TST));
    }

    #[tokio::test]
    async fn reset_tests_leaves_sources_alone() {
        let fs = InMemoryFs::new();
        fs.seed("/projects/01/Not.hdl", "my solution");
        fs.seed("/projects/01/Not.tst", "stale");

        BuiltinFiles::new("/projects")
            .reset_tests(&fs, None)
            .await
            .unwrap();

        assert_eq!(fs.read("/projects/01/Not.hdl").as_deref(), Some("my solution"));
        assert_eq!(fs.read("/projects/01/Not.tst").as_deref(), Some(NOT_TST));
        assert_eq!(fs.read("/projects/01/Not.cmp").as_deref(), Some(NOT_CMP));
    }
}
