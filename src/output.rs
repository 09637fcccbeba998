//! Message sinks for human and robot (JSON) output.

use console::{Term, style};
use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::cli::Cli;
use crate::commands::error_message;
use crate::error::MapError;
use crate::host::MessageSink;
use crate::index::IndexEntry;

/// Prefix shown before every message in human mode.
pub const MESSAGE_PREFIX: &str = "[Map Collector] ";

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// Determines how command output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// JSON output for scripts and agents.
    Robot(RobotFormat),
    /// Prefixed text for people, optionally colored.
    Human { color: bool },
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            let format = if cli.use_compact_json() {
                RobotFormat::JsonCompact
            } else {
                RobotFormat::Json
            };
            Self::Robot(format)
        } else {
            Self::Human {
                color: !cli.no_color && Term::stdout().features().colors_supported(),
            }
        }
    }

    pub const fn is_robot(&self) -> bool {
        matches!(self, Self::Robot(_))
    }
}

#[derive(Serialize)]
struct MessageLine<'a> {
    source: &'static str,
    message: &'a str,
}

#[derive(Serialize)]
struct ErrorLine<'a> {
    source: &'static str,
    error: bool,
    message: &'a str,
    suggestion: Option<&'static str>,
    recoverable: bool,
}

/// Writes user messages to stdout in the selected mode.
#[derive(Debug)]
pub struct ConsoleSink {
    mode: OutputMode,
}

impl ConsoleSink {
    #[instrument]
    pub fn new(mode: OutputMode) -> Self {
        debug!("Creating ConsoleSink");
        Self { mode }
    }

    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Render a message the way `send` prints it.
    pub fn render(&self, message: &str) -> String {
        match self.mode {
            OutputMode::Robot(_) => to_json_line(&MessageLine {
                source: "map-collector",
                message,
            }),
            OutputMode::Human { color: true } => {
                format!("{}{}", style(MESSAGE_PREFIX).yellow().bold(), message)
            }
            OutputMode::Human { color: false } => format!("{MESSAGE_PREFIX}{message}"),
        }
    }

    /// Render a failed command. Robot mode carries the suggestion and
    /// recoverability as fields; human mode adds a `Hint:` line.
    pub fn render_error(&self, error: &MapError) -> String {
        let message = error_message(error);
        match (self.mode, error.suggestion()) {
            (OutputMode::Robot(_), suggestion) => to_json_line(&ErrorLine {
                source: "map-collector",
                error: true,
                message: &message,
                suggestion,
                recoverable: error.is_user_recoverable(),
            }),
            (OutputMode::Human { .. }, Some(hint)) => {
                format!("{}\n{}", self.render(&message), self.hint(hint))
            }
            (OutputMode::Human { .. }, None) => self.render(&message),
        }
    }

    fn hint(&self, hint: &str) -> String {
        match self.mode {
            OutputMode::Human { color: true } => format!("  {}: {hint}", style("Hint").yellow()),
            _ => format!("  Hint: {hint}"),
        }
    }

    /// Print structured data; JSON in robot mode, `human` otherwise.
    pub fn data<T: Serialize + ?Sized>(&self, data: &T, human: impl FnOnce() -> String) {
        match self.mode {
            OutputMode::Robot(RobotFormat::Json) => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputMode::Robot(RobotFormat::JsonCompact) => println!("{}", to_json_line(data)),
            OutputMode::Human { .. } => println!("{}", human()),
        }
    }

    /// Print the index listing.
    pub fn entries(&self, entries: &[IndexEntry]) {
        trace!(count = entries.len(), "Printing index entries");
        self.data(entries, || {
            if entries.is_empty() {
                return "No maps saved yet.".to_string();
            }
            entries
                .iter()
                .map(|e| format!("{}  {}  (id: {})", e.fingerprint, e.name, e.id))
                .collect::<Vec<_>>()
                .join("\n")
        });
    }
}

impl MessageSink for ConsoleSink {
    fn send(&self, message: &str) {
        println!("{}", self.render(message));
    }

    fn report(&self, error: &MapError) {
        debug!(
            error = %error,
            recoverable = error.is_user_recoverable(),
            "Reporting error"
        );
        println!("{}", self.render_error(error));
    }
}

fn to_json_line<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).unwrap_or_default()
}
