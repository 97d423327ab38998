use std::borrow::Cow;

/// Packaging root every entry of the course archive lives under.
pub const ARCHIVE_ROOT: &str = "projects/";

/// Top-level file shipped in the archive that never reaches the filesystem.
pub const EXCLUDED_FILE: &str = "README.md";

/// Default directory project files are synchronized into.
pub const DEFAULT_BASE_PATH: &str = "/projects";

/// Outcome of normalizing an archive entry path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized<'a> {
    /// Path relative to the base path, e.g. `01/Not.hdl`.
    Relative(Cow<'a, str>),
    /// Root-level item: counted as processed but never written.
    Ignored,
}

/// Strip the packaging root from an archive path.
///
/// Backslash separators are converted to `/` first so Windows-built
/// archives map to the same targets.
pub fn strip_root(raw: &str) -> Cow<'_, str> {
    let path: Cow<'_, str> = if raw.contains('\\') {
        Cow::Owned(raw.replace('\\', "/"))
    } else {
        Cow::Borrowed(raw)
    };

    match path {
        Cow::Borrowed(p) => Cow::Borrowed(p.strip_prefix(ARCHIVE_ROOT).unwrap_or(p)),
        Cow::Owned(p) => match p.strip_prefix(ARCHIVE_ROOT) {
            Some(rest) => Cow::Owned(rest.to_owned()),
            None => Cow::Owned(p),
        },
    }
}

/// Normalize an archive entry path and classify it.
pub fn normalize(raw: &str) -> Normalized<'_> {
    let relative = strip_root(raw);

    if relative == EXCLUDED_FILE || !relative.contains('/') {
        return Normalized::Ignored;
    }

    Normalized::Relative(relative)
}

/// Join a base path and a normalized relative path with `/`.
pub fn target_path(base_path: &str, relative: &str) -> String {
    format!("{}/{}", base_path.trim_end_matches('/'), relative)
}

/// Directory portion of a target path, or `None` for a bare file name.
pub fn parent_dir(target: &str) -> Option<&str> {
    target.rfind('/').map(|idx| &target[..idx])
}

/// Two-digit project id of a path like `projects/05/CPU.hdl` or `05/CPU.hdl`.
pub fn project_id(raw: &str) -> Option<String> {
    let relative = strip_root(raw);
    let (first, _rest) = relative.split_once('/')?;

    if first.len() == 2 && first.bytes().all(|b| b.is_ascii_digit()) {
        Some(first.to_owned())
    } else {
        None
    }
}
