use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use paren_editor::{SessionManager, ThreadStyle};
use std::path::PathBuf;

use super::{finish, open, parse_path};

#[derive(Args, Debug)]
pub struct ThreadArgs {
    /// File to edit
    pub file: PathBuf,

    /// Dotted path to the outermost call
    #[arg(short, long)]
    pub path: String,

    /// Thread through the last argument (`->>`)
    #[arg(short, long)]
    pub last: bool,

    /// Write the result back to the file instead of printing it
    #[arg(short, long)]
    pub write: bool,
}

pub fn thread(args: ThreadArgs, config: &Config) -> Result<()> {
    let manager = SessionManager::with_config(config.editor.clone());
    let id = open(&manager, &args.file)?;

    let style = if args.last {
        ThreadStyle::Last
    } else {
        ThreadStyle::First
    };
    manager.goto(&id, &parse_path(&args.path)?)?;
    manager.thread(&id, style)?;
    eprintln!("{} threaded with {}", "✓".green(), style.arrow());

    finish(&manager, &id, args.write)
}
