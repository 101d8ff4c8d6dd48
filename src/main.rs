mod commands;
mod core;
mod release;

use clap::{Args, Parser, Subcommand};
use core::error::{ResultExt, VersioningError, print_error};
use core::version::BumpRequest;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Environment variable holding the log filter (e.g. `debug`, `svc_versioning=trace`)
const LOG_ENV_VAR: &str = "SVC_VERSIONING_LOG";

/// Bump the project version, record the release, and ship it
#[derive(Parser)]
#[command(name = "svc-versioning")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Use this config file instead of searching for versioning.toml
  #[arg(long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Project directory (default: current directory)
  #[arg(short = 'C', long = "dir", global = true, value_name = "PATH")]
  dir: Option<PathBuf>,

  /// Show debug logs on stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Create a new version and run the release steps
  New(NewArgs),

  /// Print the current version
  Current {
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Write a starter versioning.toml
  InitConfig,
}

#[derive(Args)]
struct NewArgs {
  /// Commit and changelog message (default: "Increase version to <version>")
  commit_message: Option<String>,

  /// Increase the major version
  #[arg(long)]
  major: bool,

  /// Increase the minor version
  #[arg(short, long)]
  minor: bool,

  /// Increase the patch version (the default)
  #[arg(short, long)]
  patch: bool,

  /// Start versioning at 0.0.1, ignoring the current version
  #[arg(short, long)]
  init: bool,

  /// Show the release plan without changing anything
  #[arg(long)]
  dry_run: bool,

  /// Output the plan or the outcome in JSON format
  #[arg(long)]
  json: bool,
}

impl NewArgs {
  fn into_options(self) -> commands::NewOptions {
    commands::NewOptions {
      message: self.commit_message,
      request: BumpRequest {
        major: self.major,
        minor: self.minor,
        patch: self.patch,
        init: self.init,
      },
      dry_run: self.dry_run,
      json: self.json,
    }
  }
}

fn get_styles() -> clap::builder::Styles {
  let yellow = anstyle::Color::Ansi(anstyle::AnsiColor::Yellow);
  let green = anstyle::Color::Ansi(anstyle::AnsiColor::Green);
  let red = anstyle::Color::Ansi(anstyle::AnsiColor::Red);

  clap::builder::Styles::styled()
    .usage(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .header(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .literal(anstyle::Style::new().fg_color(Some(green)))
    .invalid(anstyle::Style::new().bold().fg_color(Some(red)))
    .error(anstyle::Style::new().bold().fg_color(Some(red)))
    .valid(anstyle::Style::new().bold().underline().fg_color(Some(green)))
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Diagnostics go to stderr so stdout stays usable for `--json`
fn init_logging(verbose: bool) {
  let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };

  let _ = tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_ansi(io::stderr().is_terminal())
    .with_target(false)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy(),
    )
    .try_init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let project_dir = match cli.dir {
    Some(dir) => dir,
    None => match std::env::current_dir().context("Failed to get current directory") {
      Ok(dir) => dir,
      Err(e) => handle_error(e),
    },
  };
  tracing::debug!(dir = %project_dir.display(), "project directory");

  let result = match cli.command {
    Commands::New(args) => commands::run_new(&project_dir, cli.config.as_deref(), args.into_options()),
    Commands::Current { json } => commands::run_current(&project_dir, json),
    Commands::InitConfig => commands::run_init_config(&project_dir),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: VersioningError) -> ! {
  if let Some(stage) = err.stage() {
    tracing::debug!(%stage, "release stopped");
  }
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
