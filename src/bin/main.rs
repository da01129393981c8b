use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kaf::interpreter::Outcome;

/// Run a .kaf script
#[derive(Parser, Debug)]
#[command(name = "kafnum", version)]
struct Args {
  /// Path to the script
  script: Option<PathBuf>,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    )
    .with_writer(io::stderr)
    .with_ansi(io::stderr().is_terminal())
    .init();

  let args = Args::parse();
  let Some(script) = args.script else {
    println!("usage kafnum <filename>.kaf");
    return ExitCode::SUCCESS;
  };

  match run(&script) {
    Ok(outcome) => {
      tracing::debug!(?outcome, "done");
      ExitCode::SUCCESS
    }
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(script: &Path) -> anyhow::Result<Outcome> {
  let source = fs::read_to_string(script)
    .with_context(|| format!("failed to read `{}`", script.display()))?;
  let stdout = io::stdout().lock();
  let outcome = kaf::run_source(&source, stdout)?;
  Ok(outcome)
}
