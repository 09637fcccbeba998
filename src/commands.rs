//! Command surface: parses user command lines and reports results as text.
//!
//! Every error is turned into a message here; nothing escapes to the host.

use tracing::{debug, instrument, warn};

use crate::error::MapError;
use crate::host::{ArtifactSource, MessageSink};
use crate::policy::DuplicatePolicy;
use crate::session::{CaptureSession, CheckOutcome, ConfirmOutcome, SaveOutcome, SavedMap};

/// A user command bound to a capture session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `save [name...]`, the rest of the line is the override name.
    Save { name: Option<String> },
    /// `check`
    Check,
    /// `confirm`
    Confirm,
    /// `duplicateBehaviour <deny|warn|allow>`, validated on dispatch.
    DuplicateBehaviour { mode: String },
}

impl Command {
    /// Parse a command line. Returns `None` for anything that is not a command.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));
        match word {
            "save" => Some(Self::Save {
                name: (!rest.is_empty()).then(|| rest.to_string()),
            }),
            "check" => Some(Self::Check),
            "confirm" => Some(Self::Confirm),
            "duplicateBehaviour" => Some(Self::DuplicateBehaviour {
                mode: rest.split_whitespace().next().unwrap_or_default().to_string(),
            }),
            _ => None,
        }
    }
}

/// Run one command and send its result to the user.
#[instrument(skip(session, source, sink))]
pub fn dispatch(
    session: &mut CaptureSession,
    source: &dyn ArtifactSource,
    sink: &dyn MessageSink,
    command: &Command,
) {
    let message = match command {
        Command::Save { name } => session
            .save(source, name.as_deref())
            .map(|outcome| save_message(&outcome)),
        Command::Check => session.check(source).map(|outcome| check_message(&outcome)),
        Command::Confirm => session.confirm().map(|outcome| confirm_message(&outcome)),
        Command::DuplicateBehaviour { mode } => {
            set_policy(session, sink, mode).map(policy_message)
        }
    };

    match message {
        Ok(text) => sink.send(&text),
        Err(e) => {
            debug!(error = %e, "Command failed");
            sink.report(&e);
        }
    }
}

fn set_policy(
    session: &mut CaptureSession,
    sink: &dyn MessageSink,
    mode: &str,
) -> Result<DuplicatePolicy, MapError> {
    let policy: DuplicatePolicy = mode.parse()?;
    if let Err(e) = session.set_policy(policy) {
        warn!(error = %e, "Duplicate policy not persisted");
        sink.report(&e);
    }
    Ok(policy)
}

pub fn save_message(outcome: &SaveOutcome) -> String {
    match outcome {
        SaveOutcome::Saved(saved) => saved_message(saved),
        SaveOutcome::Denied { .. } => "Duplicate detected! Save cancelled.".to_string(),
        SaveOutcome::Pending { .. } => {
            "Duplicate detected! Type \"confirm\" to save.".to_string()
        }
    }
}

pub fn check_message(outcome: &CheckOutcome) -> String {
    match outcome {
        CheckOutcome::Duplicate(entry) => {
            format!("Duplicate of '{}' (id: {})", entry.name, entry.id)
        }
        CheckOutcome::NotInCollection => "This map is not in your collection!".to_string(),
        CheckOutcome::NoIndex => "No map file found.".to_string(),
    }
}

pub fn confirm_message(outcome: &ConfirmOutcome) -> String {
    match outcome {
        ConfirmOutcome::Saved(saved) => saved_message(saved),
        ConfirmOutcome::NothingPending => "No pending save to confirm.".to_string(),
    }
}

pub fn policy_message(policy: DuplicatePolicy) -> String {
    format!("Duplicate behaviour: {policy}")
}

/// User-facing text for a failed command.
pub fn error_message(error: &MapError) -> String {
    match error {
        MapError::HeldItem(_) | MapError::InvalidMode { .. } => error.to_string(),
        MapError::ConfigIo { .. } => format!("Failed to save config: {error}"),
        _ => format!("Error: {error}"),
    }
}

fn saved_message(saved: &SavedMap) -> String {
    format!("Saved map: {}", saved.file_name)
}
