//! Small path helpers shared by the readers.

use std::path::Path;

/// Check if the path is a gzipped file (`.gz` or `.bgz`)
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
#[must_use]
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Check if the path has a SAM (text) extension
#[must_use]
pub fn is_sam_file(path: &Path) -> bool {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sam"))
}
