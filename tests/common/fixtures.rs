//! Test fixture helpers for map buffers and temporary collections.

use std::fs;
use std::path::PathBuf;

use mapc::palette::BUFFER_LEN;
use mapc::paths::CollectorPaths;
use mapc::policy::{DuplicatePolicy, PolicyStore};
use mapc::session::CaptureSession;
use tempfile::TempDir;

/// A buffer where every pixel has the same code.
#[must_use]
pub fn uniform_buffer(code: u8) -> Vec<u8> {
    vec![code; BUFFER_LEN]
}

/// A buffer cycling through every code, so each row looks different.
#[must_use]
pub fn gradient_buffer() -> Vec<u8> {
    (0..BUFFER_LEN).map(|i| (i % 256) as u8).collect()
}

/// Run directory in a temp dir with automatic cleanup.
pub struct TestCollection {
    pub dir: TempDir,
    pub paths: CollectorPaths,
}

impl TestCollection {
    /// # Panics
    ///
    /// Panics if the temp directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let paths = CollectorPaths::new(dir.path());
        Self { dir, paths }
    }

    /// Session with the policy set in memory only.
    #[must_use]
    pub fn session(&self, policy: DuplicatePolicy) -> CaptureSession {
        let store = PolicyStore::in_memory(self.paths.config_file(), policy);
        CaptureSession::new(self.paths.clone(), store)
    }

    /// Session whose policy is loaded from the config file.
    #[must_use]
    pub fn loaded_session(&self) -> CaptureSession {
        let (store, err) = PolicyStore::load(&self.paths.config_file());
        assert!(err.is_none(), "config load failed: {err:?}");
        CaptureSession::new(self.paths.clone(), store)
    }

    /// Raw lines of maps.csv, empty when it does not exist.
    #[must_use]
    pub fn index_lines(&self) -> Vec<String> {
        fs::read_to_string(self.paths.index_file())
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Write a buffer file under the temp dir.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_buffer(&self, name: &str, buffer: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, buffer).expect("Failed to write buffer file");
        path
    }
}
