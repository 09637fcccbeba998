//! Line-oriented host loop for the `shell` subcommand.
//!
//! Plays the part of the game client: it owns the held buffer file, forwards
//! capture commands to one long-lived [`CaptureSession`], and fires a tick
//! after every line so lifecycle-driven clears behave as they would in-game.

use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;

use tracing::{debug, instrument};

use crate::commands::{self, Command};
use crate::host::{FileArtifactSource, HostEvent, MessageSink};
use crate::session::CaptureSession;

/// Usage text for the `help` line.
pub const HELP: &str = "\
Commands:
  hold <file> [id] [name...]        hold a raw map buffer file
  drop                              stop holding the buffer
  save [name...]                    save the held map
  check                             check the held map against the collection
  confirm                           save the pending duplicate
  duplicateBehaviour <deny|warn|allow>
  disconnect | connect              simulate leaving or joining a session
  help | quit";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellLine {
    Command(Command),
    Hold {
        path: String,
        id: Option<String>,
        name: Option<String>,
    },
    Drop,
    Disconnect,
    Connect,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ShellLine {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if let Some(command) = Command::parse(trimmed) {
            return Self::Command(command);
        }

        let mut words = trimmed.splitn(4, char::is_whitespace).filter(|w| !w.is_empty());
        match words.next().unwrap_or_default() {
            "hold" => match words.next() {
                Some(path) => Self::Hold {
                    path: path.to_string(),
                    id: words.next().map(str::to_string),
                    name: words.next().map(|n| n.trim().to_string()),
                },
                None => Self::Unknown(trimmed.to_string()),
            },
            "drop" => Self::Drop,
            "disconnect" => Self::Disconnect,
            "connect" => Self::Connect,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

/// Interactive host around a capture session.
#[derive(Debug)]
pub struct Shell {
    session: CaptureSession,
    source: FileArtifactSource,
}

impl Shell {
    pub fn new(session: CaptureSession) -> Self {
        Self {
            session,
            source: FileArtifactSource::new(),
        }
    }

    pub const fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Handle one line, then fire the per-line tick.
    #[instrument(skip(self, sink))]
    pub fn execute(&mut self, line: &str, sink: &dyn MessageSink) -> ControlFlow<()> {
        let flow = match ShellLine::parse(line) {
            ShellLine::Command(command) => {
                commands::dispatch(&mut self.session, &self.source, sink, &command);
                ControlFlow::Continue(())
            }
            ShellLine::Hold { path, id, name } => {
                self.source.hold(&path, id.as_deref(), name.as_deref());
                sink.send(&format!("Holding {path}"));
                ControlFlow::Continue(())
            }
            ShellLine::Drop => {
                self.source.release();
                sink.send("Hands empty.");
                ControlFlow::Continue(())
            }
            ShellLine::Disconnect => {
                self.source.set_connected(false);
                self.session.notify(HostEvent::Disconnected);
                sink.send("Disconnected.");
                ControlFlow::Continue(())
            }
            ShellLine::Connect => {
                self.source.set_connected(true);
                sink.send("Connected.");
                ControlFlow::Continue(())
            }
            ShellLine::Help => {
                sink.send(HELP);
                ControlFlow::Continue(())
            }
            ShellLine::Quit => ControlFlow::Break(()),
            ShellLine::Empty => ControlFlow::Continue(()),
            ShellLine::Unknown(text) => {
                debug!(%text, "Unknown shell line");
                sink.send(&format!("Unknown command: {text}. Type \"help\"."));
                ControlFlow::Continue(())
            }
        };

        self.session.notify(HostEvent::Tick {
            player_present: self.source.is_connected(),
        });
        flow
    }

    /// Read lines until `quit` or end of input.
    ///
    /// `prompt` is written before each line when set.
    pub fn run<R: BufRead>(
        &mut self,
        reader: R,
        sink: &dyn MessageSink,
        prompt: Option<&str>,
    ) -> io::Result<()> {
        let show_prompt = || -> io::Result<()> {
            if let Some(p) = prompt {
                let mut stdout = io::stdout().lock();
                stdout.write_all(p.as_bytes())?;
                stdout.flush()?;
            }
            Ok(())
        };

        show_prompt()?;
        for line in reader.lines() {
            if self.execute(&line?, sink).is_break() {
                break;
            }
            show_prompt()?;
        }
        self.session.notify(HostEvent::Disconnected);
        Ok(())
    }
}
