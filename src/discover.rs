use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Recursively collect `*.json` files under `root`, descending into every
/// subdirectory. Entries are walked in sorted order so batch output is
/// stable across runs. A missing root yields an empty set, not an error.
pub fn collect_prompt_files(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        debug!(root = %root.display(), "prompt root does not exist");
        return Vec::new();
    }
    let files: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".json"))
        .map(|e| e.into_path())
        .collect();
    debug!(root = %root.display(), count = files.len(), "collected prompt files");
    files
}
