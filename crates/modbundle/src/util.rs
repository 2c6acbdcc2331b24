use cow_utils::CowUtils;
use std::path::{Path, PathBuf};

/// Normalize line endings to LF (\n) for cross-platform consistency
pub fn normalize_line_endings(content: &str) -> String {
    // Replace Windows CRLF (\r\n) and Mac CR (\r) with Unix LF (\n)
    content
        .cow_replace("\r\n", "\n")
        .cow_replace('\r', "\n")
        .into_owned()
}

/// Path of `file` as shown in bundle headers: relative to the parent of `root`, so it starts
/// with the root directory's own name (`TidyNotes/Modules/Auth/LoginView.swift`).
pub fn display_path(root: &Path, file: &Path) -> PathBuf {
    let base = root.parent().unwrap_or(root);
    file.strip_prefix(base).unwrap_or(file).to_path_buf()
}

/// Flatten a relative path into a single file name by joining its components with `_`.
pub fn flatten_relative_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("_")
}

/// Whether the file name of `path` ends with `suffix` (e.g. `.swift`)
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}
