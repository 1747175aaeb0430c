//! Shared test utilities for the shufflepic test suite.

use std::fs;
use tempfile::TempDir;

/// Build a throwaway directory tree from a list of relative file paths.
///
/// Parent directories are created as needed; every file gets the same
/// placeholder bytes (the resolver only looks at extensions, never content).
///
/// ```rust
/// let tmp = image_tree(&["cat1.jpg", "album/cat2.png", "notes.txt"]);
/// ```
pub fn image_tree(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for file in files {
        let path = tmp.path().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"fake image").unwrap();
    }
    tmp
}
