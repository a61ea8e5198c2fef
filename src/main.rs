mod commands;
mod core;
mod gate;
mod logging;
mod release;
mod trigger;
mod ui;

use clap::{Args, Parser, Subcommand};
use commands::{GateInput, ShipOptions};
use core::error::{ShipError, print_error};
use logging::{LogFormat, LogLevel};
use std::path::PathBuf;

/// Gate, classify and publish releases from annotated version tags
#[derive(Parser)]
#[command(name = "shipgate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Minimum log level (RUST_LOG overrides)
  #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
  log_level: LogLevel,

  /// Log output format
  #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
  log_format: LogFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Setup
  // ============================================================================
  /// Write a starter shipgate.toml
  Init {
    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
  },

  // ============================================================================
  // Inspection
  // ============================================================================
  /// Classify a tag as final, pre-release or not a release
  Classify {
    /// Tag name, e.g. v1.2.0rc3
    tag: String,
    /// Allow the version to appear anywhere in the tag name
    #[arg(long)]
    loose: bool,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Print the release notes of an annotated tag (signature removed)
  Notes {
    /// Tag name
    tag: String,
    /// Write the notes to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Fetch tags from the configured remote first
    #[arg(long)]
    fetch: bool,
  },

  /// Show which stages a triggering event reaches
  Route {
    /// Git ref of the event (refs/tags/v1.0.0, refs/heads/main, ...)
    #[arg(long = "ref")]
    git_ref: String,
    /// Head commit message ([skip ci] / [ci skip] skip the pipeline)
    #[arg(long)]
    message: Option<String>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  // ============================================================================
  // Publish stage
  // ============================================================================
  /// Decide whether the publish stage may run
  Gate {
    #[command(flatten)]
    outcomes: OutcomeArgs,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Run the publish stage for a tag (dry-run unless --apply)
  Ship {
    /// Tag to publish
    #[arg(required_unless_present = "git_ref", conflicts_with = "git_ref")]
    tag: Option<String>,
    /// Derive the tag from the event ref; non-tag refs publish nothing
    #[arg(long = "ref")]
    git_ref: Option<String>,
    /// Head commit message of the event
    #[arg(long, requires = "git_ref")]
    message: Option<String>,
    #[command(flatten)]
    outcomes: OutcomeArgs,
    /// Actually run the publish steps (default: print the plan)
    #[arg(long)]
    apply: bool,
    /// Fetch tags from the configured remote before reading the annotation
    #[arg(long)]
    fetch: bool,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },
}

/// Stage outcomes, from flags, a report file or an orchestrator `needs` file
#[derive(Args)]
struct OutcomeArgs {
  /// Lint outcome (success, failure, skipped, cancelled)
  #[arg(long, required_unless_present_any = ["report", "needs"], conflicts_with_all = ["report", "needs"])]
  lint: Option<String>,

  /// Test cell outcome, repeatable
  #[arg(long = "test", value_name = "CELL=OUTCOME", requires = "lint")]
  tests: Vec<String>,

  /// JSON report: {"lint": "...", "tests": {"<cell>": "..."}}
  #[arg(long, conflicts_with = "needs")]
  report: Option<PathBuf>,

  /// Orchestrator needs context: {"<job>": {"result": "..."}}
  #[arg(long)]
  needs: Option<PathBuf>,
}

impl OutcomeArgs {
  fn into_input(self) -> GateInput {
    match (self.lint, self.report, self.needs) {
      (_, Some(report), _) => GateInput::Report(report),
      (_, _, Some(needs)) => GateInput::Needs(needs),
      (lint, None, None) => GateInput::Flags {
        lint: lint.unwrap_or_default(),
        tests: self.tests,
      },
    }
  }
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  if let Err(err) = logging::init(cli.log_level, cli.log_format) {
    handle_error(err);
  }

  let result = match cli.command {
    Commands::Init { force } => commands::run_init(force),
    Commands::Classify { tag, loose, json } => commands::run_classify(tag, loose, json),
    Commands::Notes { tag, output, fetch } => commands::run_notes(tag, output, fetch),
    Commands::Route { git_ref, message, json } => commands::run_route(git_ref, message, json),
    Commands::Gate { outcomes, json } => commands::run_gate(outcomes.into_input(), json),
    Commands::Ship {
      tag,
      git_ref,
      message,
      outcomes,
      apply,
      fetch,
      json,
    } => commands::run_ship(ShipOptions {
      tag,
      git_ref,
      message,
      input: outcomes.into_input(),
      apply,
      fetch,
      json,
    }),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ShipError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
