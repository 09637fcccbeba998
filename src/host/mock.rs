//! In-memory host collaborators for tests.
//!
//! # Example
//!
//! ```rust
//! use mapc::host::mock::{MockArtifactSource, RecordingSink};
//! use mapc::host::MessageSink;
//!
//! let source = MockArtifactSource::holding(vec![0; 16384], "1", "Blank");
//! let sink = RecordingSink::new();
//! sink.send("hello");
//! assert_eq!(sink.messages(), vec!["hello".to_string()]);
//! # drop(source);
//! ```

use std::cell::RefCell;

use tracing::trace;

use super::{ArtifactSource, HeldArtifact, MessageSink};
use crate::error::HeldItemError;

/// Artifact source whose held map is set directly.
#[derive(Debug, Clone)]
pub struct MockArtifactSource {
    held: RefCell<Result<HeldArtifact, HeldItemError>>,
}

impl Default for MockArtifactSource {
    fn default() -> Self {
        Self::failing(HeldItemError::NotAnArtifact)
    }
}

impl MockArtifactSource {
    pub fn holding(buffer: Vec<u8>, id: &str, name: &str) -> Self {
        Self {
            held: RefCell::new(Ok(HeldArtifact {
                buffer,
                id: id.to_string(),
                name: name.to_string(),
            })),
        }
    }

    pub fn failing(error: HeldItemError) -> Self {
        Self {
            held: RefCell::new(Err(error)),
        }
    }

    /// Swap the held map in place.
    pub fn hold(&self, buffer: Vec<u8>, id: &str, name: &str) {
        trace!(id, name, "Mock holding artifact");
        *self.held.borrow_mut() = Ok(HeldArtifact {
            buffer,
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    pub fn fail_with(&self, error: HeldItemError) {
        *self.held.borrow_mut() = Err(error);
    }
}

impl ArtifactSource for MockArtifactSource {
    fn held_artifact(&self) -> Result<HeldArtifact, HeldItemError> {
        self.held.borrow().clone()
    }
}

/// Sink that keeps every message for later assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: RefCell<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
    }
}

impl MessageSink for RecordingSink {
    fn send(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
