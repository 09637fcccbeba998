//! Map Collector CLI - save map buffers as PNG images with duplicate detection.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use serde::Serialize;
use tracing::debug;

use mapc::cli::{self, Cli, Commands};
use mapc::commands::{self as map_commands, Command};
use mapc::error::MapError;
use mapc::fingerprint::fingerprint;
use mapc::host::{FileArtifactSource, MessageSink};
use mapc::logging::init_logging;
use mapc::output::{ConsoleSink, OutputMode};
use mapc::palette;
use mapc::paths::{CollectorPaths, resolve_run_dir};
use mapc::policy::PolicyStore;
use mapc::session::CaptureSession;
use mapc::shell::Shell;

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.use_json(), cli.verbose, cli.quiet);

    let sink = ConsoleSink::new(OutputMode::from_cli(&cli));
    match run(&cli, &sink) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<MapError>() {
                Some(err) => sink.report(err),
                None => sink.send(&format!("Error: {e:#}")),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, sink: &ConsoleSink) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Shell => cmd_shell(cli, sink),
        Commands::Save(args) => {
            cmd_capture(cli, sink, args.id.as_deref(), &args.buffer, &save_command(args));
            Ok(())
        }
        Commands::Check(args) => {
            cmd_capture(cli, sink, None, &args.buffer, &Command::Check);
            Ok(())
        }
        Commands::List => cmd_list(cli, sink),
        Commands::DuplicateBehaviour(args) => {
            cmd_duplicate_behaviour(cli, sink, args);
            Ok(())
        }
        Commands::Render(args) => cmd_render(sink, args),
        Commands::Fingerprint(args) => cmd_fingerprint(sink, args),
        Commands::Version => {
            cmd_version(sink);
            Ok(())
        }
        Commands::Completions(args) => {
            let mut command = Cli::command();
            clap_complete::generate(args.shell, &mut command, "mapc", &mut io::stdout());
            Ok(())
        }
    }
}

/// Build a session for the configured run directory, reporting config load problems.
fn open_session(cli: &Cli, sink: &dyn MessageSink) -> CaptureSession {
    let paths = CollectorPaths::new(resolve_run_dir(cli.run_dir.as_deref()));
    debug!(run_dir = %paths.run_dir().display(), "Opening capture session");
    let (policy, err) = PolicyStore::load(&paths.config_file());
    if let Some(e) = err {
        sink.send(&format!("Failed to load config: {e}"));
    }
    CaptureSession::new(paths, policy)
}

fn save_command(args: &cli::SaveArgs) -> Command {
    let name = args.name.join(" ");
    Command::Save {
        name: (!name.trim().is_empty()).then_some(name),
    }
}

// === Command Implementations ===

fn cmd_shell(cli: &Cli, sink: &ConsoleSink) -> anyhow::Result<()> {
    let mut shell = Shell::new(open_session(cli, sink));
    let interactive = io::stdin().is_terminal() && !sink.mode().is_robot();
    if interactive {
        sink.send("Type \"help\" for commands.");
    }
    shell
        .run(io::stdin().lock(), sink, interactive.then_some("> "))
        .context("reading commands from stdin")
}

fn cmd_capture(
    cli: &Cli,
    sink: &ConsoleSink,
    id: Option<&str>,
    buffer: &std::path::Path,
    command: &Command,
) {
    let mut session = open_session(cli, sink);
    let source = FileArtifactSource::holding(buffer, id, None);
    map_commands::dispatch(&mut session, &source, sink, command);
}

fn cmd_list(cli: &Cli, sink: &ConsoleSink) -> anyhow::Result<()> {
    let paths = CollectorPaths::new(resolve_run_dir(cli.run_dir.as_deref()));
    let index = mapc::index::ArtifactIndex::new(paths.index_file());
    let entries = index.entries()?;
    sink.entries(&entries);
    Ok(())
}

fn cmd_duplicate_behaviour(cli: &Cli, sink: &ConsoleSink, args: &cli::PolicyArgs) {
    let mut session = open_session(cli, sink);
    match args.mode {
        Some(mode) => {
            let command = Command::DuplicateBehaviour {
                mode: mode.to_string(),
            };
            map_commands::dispatch(&mut session, &FileArtifactSource::new(), sink, &command);
        }
        None => sink.send(&map_commands::policy_message(session.policy())),
    }
}

fn cmd_render(sink: &ConsoleSink, args: &cli::RenderArgs) -> anyhow::Result<()> {
    let buffer = std::fs::read(&args.buffer)
        .with_context(|| format!("reading {}", args.buffer.display()))?;
    palette::write_png(&buffer, &args.output)?;
    sink.send(&format!("Rendered {}", args.output.display()));
    Ok(())
}

#[derive(Serialize)]
struct FingerprintInfo<'a> {
    path: String,
    fingerprint: &'a str,
}

fn cmd_fingerprint(sink: &ConsoleSink, args: &cli::BufferArgs) -> anyhow::Result<()> {
    let buffer = std::fs::read(&args.buffer)
        .with_context(|| format!("reading {}", args.buffer.display()))?;
    let fp = fingerprint(&buffer);
    let info = FingerprintInfo {
        path: args.buffer.display().to_string(),
        fingerprint: &fp,
    };
    sink.data(&info, || fp.clone());
    Ok(())
}

#[derive(Serialize)]
struct VersionInfo {
    version: &'static str,
    git_sha: &'static str,
    build_timestamp: &'static str,
    rustc: &'static str,
    target: &'static str,
}

fn cmd_version(sink: &ConsoleSink) {
    let info = VersionInfo {
        version: build_info::VERSION,
        git_sha: build_info::git_sha(),
        build_timestamp: build_info::build_timestamp(),
        rustc: build_info::rustc_semver(),
        target: build_info::target(),
    };
    sink.data(&info, || {
        format!(
            "mapc {} ({} built {}, rustc {}, {})",
            info.version, info.git_sha, info.build_timestamp, info.rustc, info.target
        )
    });
}
