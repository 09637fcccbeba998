//! File-backed artifact source for running outside a game client.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, trace};

use super::{ArtifactSource, HeldArtifact, UNKNOWN_ID};
use crate::error::HeldItemError;

/// A raw buffer file standing in for the held map.
#[derive(Debug, Clone)]
struct HeldFile {
    path: PathBuf,
    id: String,
    name: String,
}

/// Treats a raw 16384-byte dump on disk as the held map.
///
/// Nothing held reports [`HeldItemError::NotAnArtifact`], an unreadable file
/// [`HeldItemError::NotLoaded`], and a disconnected source
/// [`HeldItemError::NoSession`].
#[derive(Debug, Clone)]
pub struct FileArtifactSource {
    held: Option<HeldFile>,
    connected: bool,
}

impl Default for FileArtifactSource {
    fn default() -> Self {
        Self {
            held: None,
            connected: true,
        }
    }
}

impl FileArtifactSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source already holding `path`.
    pub fn holding(path: impl Into<PathBuf>, id: Option<&str>, name: Option<&str>) -> Self {
        let mut source = Self::new();
        source.hold(path, id, name);
        source
    }

    /// Hold a buffer file. The name defaults to the file stem.
    #[instrument(skip_all)]
    pub fn hold(&mut self, path: impl Into<PathBuf>, id: Option<&str>, name: Option<&str>) {
        let path = path.into();
        let name = name
            .filter(|n| !n.trim().is_empty())
            .map_or_else(|| default_name(&path), str::to_string);
        let id = id.unwrap_or(UNKNOWN_ID).to_string();
        debug!(path = %path.display(), %id, %name, "Holding buffer file");
        self.held = Some(HeldFile { path, id, name });
    }

    /// Put the held file away.
    pub fn release(&mut self) {
        trace!("Released held buffer file");
        self.held = None;
    }

    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn set_connected(&mut self, connected: bool) {
        debug!(connected, "Source connection changed");
        self.connected = connected;
    }
}

impl ArtifactSource for FileArtifactSource {
    fn held_artifact(&self) -> Result<HeldArtifact, HeldItemError> {
        if !self.connected {
            return Err(HeldItemError::NoSession);
        }
        let held = self.held.as_ref().ok_or(HeldItemError::NotAnArtifact)?;
        let buffer = fs::read(&held.path).map_err(|e| {
            debug!(path = %held.path.display(), error = %e, "Buffer file unreadable");
            match e.kind() {
                io::ErrorKind::IsADirectory => HeldItemError::NotAnArtifact,
                _ => HeldItemError::NotLoaded,
            }
        })?;
        Ok(HeldArtifact {
            buffer,
            id: held.id.clone(),
            name: held.name.clone(),
        })
    }
}

fn default_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "map".to_string(), |s| s.to_string_lossy().into_owned())
}
