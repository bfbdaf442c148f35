//! CLI entry point for taskflow.

mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Load env files: `~/.taskflow/env` first, then the nearest project `.env`.
/// dotenvy never overrides variables that are already set, so the shell wins
/// over the user file and the user file wins over the project file.
fn load_env_files() {
    if let Some(home) = dirs::home_dir() {
        let user_env = home.join(".taskflow").join("env");
        if user_env.exists() {
            let _ = dotenvy::from_path(&user_env);
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd;
        for _ in 0..32 {
            let env_file = dir.join(".env");
            if env_file.exists() {
                let _ = dotenvy::from_path(&env_file);
                break;
            }
            if let Some(parent) = dir.parent() {
                dir = parent.to_path_buf();
            } else {
                break;
            }
        }
    }
}

/// Tracing goes to stderr so JSON output on stdout stays parseable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    load_env_files();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    output::init(cli.output);

    if let Err(e) = commands::handle(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
