//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::policy::DuplicatePolicy;

/// Map Collector - save map buffers as PNG images with duplicate detection.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "mapc", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "MAPC_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose logging (repeat for more detail)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only log errors)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Directory holding map-collector/ and config/ (supports ~)
    #[arg(long, global = true, env = "MAPC_RUN_DIR", value_name = "DIR")]
    pub run_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Capture ===
    /// Interactive session: hold buffers, save, check, confirm
    Shell,

    /// Save a map buffer file to the collection
    Save(SaveArgs),

    /// Check whether a map buffer file is already collected
    Check(BufferArgs),

    // === Collection ===
    /// List saved maps
    List,

    /// Show or change what happens when saving a duplicate
    #[command(alias = "duplicateBehaviour")]
    DuplicateBehaviour(PolicyArgs),

    // === Utilities ===
    /// Decode a map buffer file to a PNG without touching the collection
    Render(RenderArgs),

    /// Print the fingerprint of a map buffer file
    Fingerprint(BufferArgs),

    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

#[derive(Parser, Debug)]
pub struct BufferArgs {
    /// Raw 16384-byte palette-code buffer
    #[arg(value_name = "BUFFER")]
    pub buffer: PathBuf,
}

#[derive(Parser, Debug)]
pub struct SaveArgs {
    /// Raw 16384-byte palette-code buffer
    #[arg(value_name = "BUFFER")]
    pub buffer: PathBuf,

    /// Map id recorded in the index
    #[arg(long)]
    pub id: Option<String>,

    /// Name to record instead of the buffer's file stem (words are joined)
    #[arg(value_name = "NAME")]
    pub name: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct PolicyArgs {
    /// New behaviour, any case; omit to show the current one
    #[arg(ignore_case = true)]
    pub mode: Option<DuplicatePolicy>,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Raw 16384-byte palette-code buffer
    #[arg(value_name = "BUFFER")]
    pub buffer: PathBuf,

    /// Output PNG path
    #[arg(value_name = "OUT")]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
