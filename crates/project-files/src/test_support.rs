use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::{
    Archive, ArchiveDecoder, ArchiveEntry, DecodeError, FetchError, Fetcher, FileSystem, FsError,
    LegacyError, LegacyLoader,
};

#[derive(Default)]
struct FsState {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, String>,
    fail_mkdir: HashSet<String>,
    fail_write: HashSet<String>,
    mkdir_calls: usize,
    write_calls: usize,
}

impl FsState {
    fn parent_exists(&self, path: &str) -> bool {
        match path.rfind('/') {
            Some(0) | None => true,
            Some(idx) => self.dirs.contains(&path[..idx]),
        }
    }
}

/// In-memory filesystem for testing. Enforces that parents exist before
/// children are created, like a real filesystem would.
#[derive(Default)]
pub struct InMemoryFs {
    state: Mutex<FsState>,
}

impl InMemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a file (and its ancestors) without going through the trait.
    pub fn seed(&self, path: &str, content: &str) {
        let mut state = self.state.lock().unwrap();
        let mut current = String::new();
        let parent = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        for segment in parent.split('/').filter(|s| !s.is_empty()) {
            current.push('/');
            current.push_str(segment);
            state.dirs.insert(current.clone());
        }
        state.files.insert(path.to_owned(), content.to_owned());
    }

    pub fn read(&self, path: &str) -> Option<String> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.state.lock().unwrap().dirs.contains(path)
    }

    /// Snapshot of every file and its content.
    pub fn files(&self) -> BTreeMap<String, String> {
        self.state.lock().unwrap().files.clone()
    }

    pub fn mkdir_calls(&self) -> usize {
        self.state.lock().unwrap().mkdir_calls
    }

    pub fn write_calls(&self) -> usize {
        self.state.lock().unwrap().write_calls
    }

    /// Make `mkdir` fail for this exact path.
    pub fn fail_mkdir(&self, path: &str) {
        self.state.lock().unwrap().fail_mkdir.insert(path.to_owned());
    }

    /// Make `write_file` fail for this exact path.
    pub fn fail_write(&self, path: &str) {
        self.state.lock().unwrap().fail_write.insert(path.to_owned());
    }
}

#[async_trait::async_trait]
impl FileSystem for InMemoryFs {
    async fn stat(&self, path: &str) -> Result<(), FsError> {
        let state = self.state.lock().unwrap();
        if path == "/" || state.dirs.contains(path) || state.files.contains_key(path) {
            Ok(())
        } else {
            Err(FsError::NotFound(path.to_owned()))
        }
    }

    async fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let mut state = self.state.lock().unwrap();
        state.mkdir_calls += 1;
        if state.fail_mkdir.contains(path) {
            return Err(FsError::io(path, "permission denied"));
        }
        if !state.parent_exists(path) {
            return Err(FsError::NotFound(path.to_owned()));
        }
        if state.dirs.contains(path) || state.files.contains_key(path) {
            return Err(FsError::io(path, "already exists"));
        }
        state.dirs.insert(path.to_owned());
        Ok(())
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        let mut state = self.state.lock().unwrap();
        state.write_calls += 1;
        if state.fail_write.contains(path) {
            return Err(FsError::io(path, "quota exceeded"));
        }
        if !state.parent_exists(path) {
            return Err(FsError::NotFound(path.to_owned()));
        }
        if state.dirs.contains(path) {
            return Err(FsError::io(path, "is a directory"));
        }
        state.files.insert(path.to_owned(), content.to_owned());
        Ok(())
    }
}

/// In-memory archive for testing. Entries keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArchive {
    entries: Vec<ArchiveEntry>,
    contents: Vec<Option<String>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.entries.push(ArchiveEntry::dir(path, self.entries.len()));
        self.contents.push(None);
        self
    }

    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.entries.push(ArchiveEntry::file(path, self.entries.len()));
        self.contents.push(Some(content.to_owned()));
        self
    }

    /// A file entry whose content cannot be read as text.
    pub fn unreadable(mut self, path: &str) -> Self {
        self.entries.push(ArchiveEntry::file(path, self.entries.len()));
        self.contents.push(None);
        self
    }
}

#[async_trait::async_trait]
impl Archive for InMemoryArchive {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    async fn read_text(&mut self, entry: &ArchiveEntry) -> Result<String, DecodeError> {
        self.contents
            .get(entry.index)
            .cloned()
            .flatten()
            .ok_or_else(|| DecodeError::NotText(entry.relative_path.clone()))
    }
}

/// Decoder that ignores its input and yields a copy of a fixed archive.
pub struct InMemoryDecoder {
    archive: Option<InMemoryArchive>,
}

impl InMemoryDecoder {
    pub fn new(archive: InMemoryArchive) -> Self {
        Self {
            archive: Some(archive),
        }
    }

    /// A decoder that treats every input as corrupt.
    pub fn rejecting() -> Self {
        Self { archive: None }
    }
}

impl ArchiveDecoder for InMemoryDecoder {
    fn decode(&self, _bytes: Vec<u8>) -> Result<Box<dyn Archive>, DecodeError> {
        match &self.archive {
            Some(archive) => Ok(Box::new(archive.clone())),
            None => Err(DecodeError::Corrupt("not an archive".into())),
        }
    }
}

/// Fetcher with canned responses per location. Unknown locations fail
/// with a network error. Every request is recorded.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: HashMap<String, Result<Vec<u8>, u16>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, location: &str, bytes: Vec<u8>) -> Self {
        self.responses.insert(location.to_owned(), Ok(bytes));
        self
    }

    pub fn fail(mut self, location: &str, status: u16) -> Self {
        self.responses.insert(location.to_owned(), Err(status));
        self
    }

    /// Shared log of requested locations, in order.
    pub fn requests(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn get(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(location.to_owned());
        match self.responses.get(location) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(status)) => Err(FetchError::Status {
                location: location.to_owned(),
                status: *status,
            }),
            None => Err(FetchError::Network(format!("connection refused: {location}"))),
        }
    }
}

/// Which legacy operation was invoked, and with which project filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyCall {
    ResetFiles(Option<Vec<String>>),
    CreateFiles,
    ResetTests(Option<Vec<String>>),
}

/// Legacy loader that records calls and writes a single marker file.
#[derive(Default)]
pub struct RecordingLegacyLoader {
    calls: Mutex<Vec<LegacyCall>>,
    fail: bool,
}

/// Path written by [`RecordingLegacyLoader`].
pub const LEGACY_MARKER: &str = "/projects/01/Not.hdl";

impl RecordingLegacyLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<LegacyCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn populate(&self, fs: &dyn FileSystem, call: LegacyCall) -> Result<(), LegacyError> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(LegacyError::Other("built-in files unavailable".into()));
        }
        crate::fs::ensure_dir(fs, "/projects/01").await?;
        fs.write_file(LEGACY_MARKER, "legacy").await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LegacyLoader for RecordingLegacyLoader {
    async fn reset_files(
        &self,
        fs: &dyn FileSystem,
        projects: Option<&[String]>,
    ) -> Result<(), LegacyError> {
        self.populate(fs, LegacyCall::ResetFiles(projects.map(|p| p.to_vec())))
            .await
    }

    async fn create_files(&self, fs: &dyn FileSystem) -> Result<(), LegacyError> {
        self.populate(fs, LegacyCall::CreateFiles).await
    }

    async fn reset_tests(
        &self,
        fs: &dyn FileSystem,
        projects: Option<&[String]>,
    ) -> Result<(), LegacyError> {
        self.populate(fs, LegacyCall::ResetTests(projects.map(|p| p.to_vec())))
            .await
    }
}
