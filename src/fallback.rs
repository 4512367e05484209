//! Pre-stored fallback images
//!
//! When generation fails or scores too low, the pipeline substitutes a
//! random image from a library directory maintained outside the pipeline.

use rand::prelude::*;
use std::path::PathBuf;

pub struct FallbackLibrary {
    dir: PathBuf,
}

impl FallbackLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Pick one image uniformly at random. Returns `None` when the directory
    /// is missing or holds no files. The directory is re-read on every call
    /// so images added or removed at runtime are picked up.
    pub fn pick(&self) -> Option<PathBuf> {
        let files = self.entries();
        let mut rng = thread_rng();
        files.choose(&mut rng).cloned()
    }

    fn entries(&self) -> Vec<PathBuf> {
        let Ok(read_dir) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn seed_library(dir: &TempDir, names: &[&str]) {
        for name in names {
            std::fs::write(dir.path().join(name), b"png bytes").unwrap();
        }
    }

    #[test]
    fn test_pick_returns_a_seeded_file() {
        let dir = TempDir::new().unwrap();
        seed_library(&dir, &["a.png", "b.png", "c.png"]);
        let expected: HashSet<PathBuf> = ["a.png", "b.png", "c.png"]
            .iter()
            .map(|name| dir.path().join(name))
            .collect();

        let library = FallbackLibrary::new(dir.path());
        for _ in 0..10 {
            let picked = library.pick().unwrap();
            assert!(expected.contains(&picked));
        }
    }

    #[test]
    fn test_empty_directory_yields_none() {
        let dir = TempDir::new().unwrap();
        let library = FallbackLibrary::new(dir.path());

        assert!(library.pick().is_none());
    }

    #[test]
    fn test_missing_directory_yields_none() {
        let library = FallbackLibrary::new("/nonexistent/fallback-library");

        assert!(library.pick().is_none());
    }

    #[test]
    fn test_subdirectories_are_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let library = FallbackLibrary::new(dir.path());
        assert!(library.pick().is_none());
    }
}
