//! Capture session: the single-slot pending-save state machine.
//!
//! A session is either idle or holding exactly one save that waits for the
//! user to confirm it. Any new save or check, a host disconnect, or a tick
//! without a player drops the pending save.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{HeldItemError, MapError, Result};
use crate::fingerprint::fingerprint;
use crate::host::{ArtifactSource, HeldArtifact, HostEvent};
use crate::index::{ArtifactIndex, IndexEntry, sanitize_name};
use crate::palette::{self, BUFFER_LEN};
use crate::paths::CollectorPaths;
use crate::policy::{DuplicatePolicy, PolicyStore};

/// A duplicate save held back under the warn policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub fingerprint: String,
    pub name: String,
    pub id: String,
    pub buffer: Vec<u8>,
}

/// Coarse state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    PendingConfirmation,
}

/// A map that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedMap {
    /// Line appended to the index.
    pub entry: IndexEntry,
    /// Raster file name, `map_<fingerprint>.png`.
    pub file_name: String,
    pub path: PathBuf,
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(SavedMap),
    /// Duplicate refused by the deny policy.
    Denied { existing: IndexEntry },
    /// Duplicate parked until confirmed.
    Pending { existing: IndexEntry },
}

/// Result of a check request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Duplicate(IndexEntry),
    NotInCollection,
    /// No index file exists yet.
    NoIndex,
}

/// Result of a confirm request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Saved(SavedMap),
    NothingPending,
}

/// Orchestrates fingerprinting, index lookup, policy, and persistence.
#[derive(Debug)]
pub struct CaptureSession {
    paths: CollectorPaths,
    index: ArtifactIndex,
    policy: PolicyStore,
    pending: Option<PendingSave>,
}

impl CaptureSession {
    pub fn new(paths: CollectorPaths, policy: PolicyStore) -> Self {
        let index = ArtifactIndex::new(paths.index_file());
        Self {
            paths,
            index,
            policy,
            pending: None,
        }
    }

    pub const fn state(&self) -> SessionState {
        if self.pending.is_some() {
            SessionState::PendingConfirmation
        } else {
            SessionState::Idle
        }
    }

    pub const fn pending(&self) -> Option<&PendingSave> {
        self.pending.as_ref()
    }

    pub const fn index(&self) -> &ArtifactIndex {
        &self.index
    }

    pub const fn paths(&self) -> &CollectorPaths {
        &self.paths
    }

    pub const fn policy(&self) -> DuplicatePolicy {
        self.policy.current()
    }

    /// Change the duplicate policy. The value applies even when persisting fails.
    #[instrument(skip(self), fields(config = %self.policy.path().display()))]
    pub fn set_policy(&mut self, policy: DuplicatePolicy) -> Result<()> {
        self.policy.set(policy)
    }

    /// Save the held map, subject to the duplicate policy.
    ///
    /// A blank `override_name` falls back to the held item's name.
    #[instrument(skip(self, source), fields(policy = %self.policy.current()))]
    pub fn save(
        &mut self,
        source: &dyn ArtifactSource,
        override_name: Option<&str>,
    ) -> Result<SaveOutcome> {
        self.clear();

        let held = fetch_held(source)?;
        let fp = fingerprint(&held.buffer);
        let name = override_name
            .filter(|n| !n.trim().is_empty())
            .map_or(held.name, str::to_string);
        debug!(fingerprint = %fp, %name, id = %held.id, "Evaluating save");

        let Some(existing) = self.index.contains(&fp)? else {
            return self
                .persist(&fp, &name, &held.id, &held.buffer)
                .map(SaveOutcome::Saved);
        };

        match self.policy.current() {
            DuplicatePolicy::Deny => {
                info!(fingerprint = %fp, "Duplicate refused");
                Ok(SaveOutcome::Denied { existing })
            }
            DuplicatePolicy::Warn => {
                info!(fingerprint = %fp, "Duplicate held for confirmation");
                self.pending = Some(PendingSave {
                    fingerprint: fp,
                    name,
                    id: held.id,
                    buffer: held.buffer,
                });
                Ok(SaveOutcome::Pending { existing })
            }
            DuplicatePolicy::Allow => {
                debug!(fingerprint = %fp, "Duplicate allowed");
                self.persist(&fp, &name, &held.id, &held.buffer)
                    .map(SaveOutcome::Saved)
            }
        }
    }

    /// Look the held map up without saving it.
    #[instrument(skip(self, source))]
    pub fn check(&mut self, source: &dyn ArtifactSource) -> Result<CheckOutcome> {
        self.clear();

        let held = fetch_held(source)?;
        let fp = fingerprint(&held.buffer);
        if !self.index.exists() {
            return Ok(CheckOutcome::NoIndex);
        }
        Ok(self
            .index
            .contains(&fp)?
            .map_or(CheckOutcome::NotInCollection, CheckOutcome::Duplicate))
    }

    /// Persist the pending save. The slot is emptied even if persisting fails.
    #[instrument(skip(self))]
    pub fn confirm(&mut self) -> Result<ConfirmOutcome> {
        let Some(pending) = self.pending.take() else {
            debug!("Nothing to confirm");
            return Ok(ConfirmOutcome::NothingPending);
        };
        self.persist(&pending.fingerprint, &pending.name, &pending.id, &pending.buffer)
            .map(ConfirmOutcome::Saved)
    }

    /// Drop any pending save.
    pub fn clear(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(fingerprint = %pending.fingerprint, "Pending save discarded");
        }
    }

    /// React to a host lifecycle event.
    pub fn notify(&mut self, event: HostEvent) {
        match event {
            HostEvent::Disconnected | HostEvent::Tick { player_present: false } => self.clear(),
            HostEvent::Tick { player_present: true } => {}
        }
    }

    /// Write the raster, then append the index line.
    ///
    /// A failed append leaves the raster on disk.
    fn persist(&self, fp: &str, name: &str, id: &str, buffer: &[u8]) -> Result<SavedMap> {
        let dir = self.paths.collection_dir();
        fs::create_dir_all(&dir).map_err(|e| MapError::index_io(&dir, e))?;

        let path = self.paths.raster_file(fp);
        palette::write_png(buffer, &path)?;

        let entry = IndexEntry::new(sanitize_name(name), id, fp);
        if let Err(e) = self.index.append(&entry) {
            warn!(path = %path.display(), "Index append failed, raster left in place");
            return Err(e);
        }

        info!(fingerprint = %fp, name = %entry.name, "Saved map");
        Ok(SavedMap {
            entry,
            file_name: CollectorPaths::raster_name(fp),
            path,
        })
    }
}

fn fetch_held(source: &dyn ArtifactSource) -> Result<HeldArtifact> {
    let held = source.held_artifact()?;
    if held.buffer.len() != BUFFER_LEN {
        return Err(HeldItemError::InvalidBuffer {
            actual: held.buffer.len(),
        }
        .into());
    }
    Ok(held)
}
