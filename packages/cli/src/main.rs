mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, check, extract, find, rename, thread, ApplyArgs, CheckArgs, ExtractArgs, FindArgs,
    RenameArgs, ThreadArgs,
};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Paren CLI - structural editing for s-expression source
#[derive(Parser, Debug)]
#[command(name = "paren")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./paren.config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log editor activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse files and verify they round-trip unchanged
    Check(CheckArgs),

    /// List occurrences of a symbol or keyword
    Find(FindArgs),

    /// Rename every occurrence of a symbol or keyword in a file
    Rename(RenameArgs),

    /// Bind an expression to a name in the nearest let
    Extract(ExtractArgs),

    /// Rewrite a nested call as a threading pipeline
    Thread(ThreadArgs),

    /// Apply a JSON batch of operations as one edit
    Apply(ApplyArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd, cli.config.as_deref())?;

    match cli.command {
        Command::Check(args) => check(args, &config),
        Command::Find(args) => find(args, &config),
        Command::Rename(args) => rename(args, &config),
        Command::Extract(args) => extract(args, &config),
        Command::Thread(args) => thread(args, &config),
        Command::Apply(args) => apply(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
