//! Syncgate CLI: the `syncgate` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SYNCGATE_LOG";

fn main() {
    // stdout carries command output; logs go to stderr.
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            policy,
            new,
            old,
            principal,
            json,
        } => commands::check::run(commands::check::Args {
            policy,
            new,
            old,
            principal,
            json,
        }),

        Commands::Compile { acl, out } => commands::compile::run(acl, out),

        Commands::Registry { policy, json } => commands::registry::run(policy, json),
    }
}
