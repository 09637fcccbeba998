//! Append-only flat-file index of saved maps.
//!
//! One entry per line, `name,id,fingerprint`, no header. The format is ad hoc
//! rather than RFC 4180 CSV: names are sanitized by dropping commas and no
//! quoting or escaping is ever applied.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::error::{MapError, Result};

/// One saved map as recorded in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub name: String,
    pub id: String,
    pub fingerprint: String,
}

impl IndexEntry {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            fingerprint: fingerprint.into(),
        }
    }

    /// Parse one index line. Lines with fewer than three fields or an empty
    /// fingerprint are rejected.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut fields = line.split(',');
        let name = fields.next()?;
        let id = fields.next()?;
        let fingerprint = fields.next().filter(|f| !f.is_empty())?;
        Some(Self::new(name, id, fingerprint))
    }

    /// Render the entry as an index line, without the trailing newline.
    pub fn to_line(&self) -> String {
        format!("{},{},{}", sanitize_name(&self.name), self.id, self.fingerprint)
    }
}

/// Strip every comma so the name cannot add fields to its line.
pub fn sanitize_name(name: &str) -> String {
    name.replace(',', "")
}

/// Handle to the index file. The file need not exist yet.
#[derive(Debug, Clone)]
pub struct ArtifactIndex {
    path: PathBuf,
}

impl ArtifactIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// All well-formed entries in file order. A missing file is an empty index.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn entries(&self) -> Result<Vec<IndexEntry>> {
        let Some(contents) = self.read()? else {
            return Ok(Vec::new());
        };
        Ok(contents.lines().filter_map(IndexEntry::parse_line).collect())
    }

    /// First entry recorded with this fingerprint, scanning from the top.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn contains(&self, fingerprint: &str) -> Result<Option<IndexEntry>> {
        let Some(contents) = self.read()? else {
            trace!("Index file absent");
            return Ok(None);
        };
        let found = contents
            .lines()
            .filter_map(IndexEntry::parse_line)
            .find(|entry| entry.fingerprint == fingerprint);
        debug!(found = found.is_some(), "Index lookup");
        Ok(found)
    }

    /// Append one line, creating the file and its directory when absent.
    #[instrument(skip(self, entry), fields(path = %self.path.display(), fingerprint = %entry.fingerprint))]
    pub fn append(&self, entry: &IndexEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| MapError::index_io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MapError::index_io(&self.path, e))?;
        writeln!(file, "{}", entry.to_line()).map_err(|e| MapError::index_io(&self.path, e))?;
        debug!("Appended index entry");
        Ok(())
    }

    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MapError::index_io(&self.path, e)),
        }
    }
}
