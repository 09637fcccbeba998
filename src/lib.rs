//! Map Collector library - capture palette-indexed map buffers as PNG images
//! with content-hash duplicate detection.
//!
//! # Modules
//!
//! - `palette`: Indexed buffer to RGBA raster decoding
//! - `fingerprint`: SHA-256 content fingerprints
//! - `index`: Append-only `maps.csv` index
//! - `policy`: Duplicate policy and its YAML config
//! - `session`: Pending-save state machine
//! - `commands`: Command parsing and user messages
//! - `host`: Host collaborator traits and implementations
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod fingerprint;
pub mod host;
pub mod index;
pub mod logging;
pub mod output;
pub mod palette;
pub mod paths;
pub mod policy;
pub mod session;
pub mod shell;
