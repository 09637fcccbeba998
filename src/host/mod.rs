//! Boundary to the host that owns the held map and the user's chat.
//!
//! The core never looks at world state directly. It asks an
//! [`ArtifactSource`] for the currently held map and reports back through a
//! [`MessageSink`]; host lifecycle changes arrive as [`HostEvent`]s.

mod file;
pub mod mock;

pub use file::FileArtifactSource;

use crate::commands::error_message;
use crate::error::{HeldItemError, MapError};

/// Raw data of the map currently held by the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldArtifact {
    /// Row-major palette codes, expected to be 128x128 bytes.
    pub buffer: Vec<u8>,
    /// Host identifier of the map.
    pub id: String,
    /// Display name of the held item.
    pub name: String,
}

/// Fallback id when the host cannot name the map.
pub const UNKNOWN_ID: &str = "unknown";

/// Supplies the currently held map.
pub trait ArtifactSource {
    /// Current held map, or why there is none.
    ///
    /// Implementations may hand back a buffer of any length; the capture
    /// session rejects wrong sizes itself.
    fn held_artifact(&self) -> Result<HeldArtifact, HeldItemError>;
}

/// Displays plain text to the user. Delivery failures are swallowed.
pub trait MessageSink {
    fn send(&self, message: &str);

    /// Tell the user a command failed. Sinks that can show more than one
    /// line of text may add the error's suggestion.
    fn report(&self, error: &MapError) {
        self.send(&error_message(error));
    }
}

/// Host lifecycle notifications that can invalidate a pending save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The connection to the game session closed.
    Disconnected,
    /// Per-frame heartbeat.
    Tick { player_present: bool },
}
