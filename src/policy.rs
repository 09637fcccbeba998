//! Duplicate policy and its persisted YAML setting.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{MapError, Result};

/// What a save does when the map is already in the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Refuse the save.
    Deny,
    /// Hold the save until it is confirmed.
    #[default]
    Warn,
    /// Save again under the same fingerprint.
    Allow,
}

impl DuplicatePolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deny => "deny",
            Self::Warn => "warn",
            Self::Allow => "allow",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicatePolicy {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "deny" => Ok(Self::Deny),
            "warn" => Ok(Self::Warn),
            "allow" => Ok(Self::Allow),
            _ => Err(MapError::InvalidMode {
                token: s.to_string(),
            }),
        }
    }
}

/// On-disk shape of the config file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PolicyFile {
    #[serde(rename = "duplicateBehaviour", default)]
    duplicate_behaviour: Option<String>,
}

/// In-memory policy backed by a config file.
///
/// The in-memory value always wins: persistence failures are returned to the
/// caller for reporting but never roll the value back.
#[derive(Debug)]
pub struct PolicyStore {
    path: PathBuf,
    current: DuplicatePolicy,
}

impl PolicyStore {
    /// Store holding `current` without touching the file.
    pub fn in_memory(path: impl Into<PathBuf>, current: DuplicatePolicy) -> Self {
        Self {
            path: path.into(),
            current,
        }
    }

    /// Read the persisted policy.
    ///
    /// A missing file, missing key, or unrecognized value yields `Warn`, which
    /// is written back immediately. The second element carries any read or
    /// write failure for the caller to report.
    #[instrument]
    pub fn load(path: &Path) -> (Self, Option<MapError>) {
        match read_policy(path) {
            Ok(Some(policy)) => {
                debug!(%policy, "Loaded duplicate policy");
                (Self::in_memory(path, policy), None)
            }
            Ok(None) => {
                info!("No valid duplicate policy stored, writing default");
                let store = Self::in_memory(path, DuplicatePolicy::default());
                let err = store.persist().err();
                (store, err)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load duplicate policy");
                (Self::in_memory(path, DuplicatePolicy::default()), Some(e))
            }
        }
    }

    pub const fn current(&self) -> DuplicatePolicy {
        self.current
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Switch policy and persist it. The new value applies even if writing fails.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn set(&mut self, policy: DuplicatePolicy) -> Result<()> {
        info!(from = %self.current, to = %policy, "Duplicate policy changed");
        self.current = policy;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| MapError::config_io(parent, e))?;
        }
        let file = PolicyFile {
            duplicate_behaviour: Some(self.current.as_str().to_string()),
        };
        let yaml = serde_yaml::to_string(&file).map_err(|e| MapError::config_io(&self.path, e))?;
        fs::write(&self.path, yaml).map_err(|e| MapError::config_io(&self.path, e))?;
        debug!(policy = %self.current, "Persisted duplicate policy");
        Ok(())
    }
}

/// `Ok(None)` means the file or value is absent or unrecognized.
fn read_policy(path: &Path) -> Result<Option<DuplicatePolicy>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|e| MapError::config_io(path, e))?;
    if contents.trim().is_empty() {
        return Ok(None);
    }
    let file: PolicyFile =
        serde_yaml::from_str(&contents).map_err(|e| MapError::config_io(path, e))?;
    Ok(file
        .duplicate_behaviour
        .and_then(|mode| mode.parse::<DuplicatePolicy>().ok()))
}
