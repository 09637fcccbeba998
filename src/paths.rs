//! On-disk layout of the collection and run-directory resolution.
//!
//! Everything lives under a single run directory:
//!
//! ```text
//! <run>/map-collector/maps.csv
//! <run>/map-collector/map_<fingerprint>.png
//! <run>/config/map-collector.yml
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

/// Directory holding the index and rasters.
pub const COLLECTION_DIR: &str = "map-collector";
/// Index file name inside [`COLLECTION_DIR`].
pub const INDEX_FILE: &str = "maps.csv";
/// Directory holding the policy config.
pub const CONFIG_DIR: &str = "config";
/// Policy config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "map-collector.yml";

/// Paths derived from one run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorPaths {
    run_dir: PathBuf,
}

impl CollectorPaths {
    pub fn new(run_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_dir: run_dir.into(),
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn collection_dir(&self) -> PathBuf {
        self.run_dir.join(COLLECTION_DIR)
    }

    pub fn index_file(&self) -> PathBuf {
        self.collection_dir().join(INDEX_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.run_dir.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// File name of the raster for a fingerprint.
    pub fn raster_name(fingerprint: &str) -> String {
        format!("map_{fingerprint}.png")
    }

    pub fn raster_file(&self, fingerprint: &str) -> PathBuf {
        self.collection_dir().join(Self::raster_name(fingerprint))
    }
}

/// Resolve the run directory from an explicit path or the platform default.
///
/// Explicit paths get `~` expansion. Without one, the platform's local data
/// directory is used, falling back to the working directory.
pub fn resolve_run_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        let resolved = expand_home(path);
        debug!(
            original = %path.display(),
            resolved = %resolved.display(),
            "Using explicit run directory"
        );
        return resolved;
    }

    let default = dirs::data_local_dir().map_or_else(|| PathBuf::from("."), |d| d.join("mapc"));
    debug!(run_dir = %default.display(), "Using default run directory");
    default
}

/// Expand a leading `~` to the home directory. Other paths pass through.
pub fn expand_home(path: &Path) -> PathBuf {
    trace!(path = %path.display(), "Expanding path");
    let path_str = path.to_string_lossy();
    if path_str != "~" && !path_str.starts_with("~/") {
        return path.to_path_buf();
    }
    let Some(home) = dirs::home_dir() else {
        return path.to_path_buf();
    };
    match path_str.strip_prefix("~/") {
        Some(rest) if !rest.is_empty() => home.join(rest),
        _ => home,
    }
}
