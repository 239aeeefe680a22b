use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use paren_editor::SessionManager;
use std::path::PathBuf;

use super::{finish, open, parse_path};

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// File to edit
    pub file: PathBuf,

    /// Dotted path to the expression, e.g. `1.3.2`
    #[arg(short, long)]
    pub path: String,

    /// Name for the new binding
    #[arg(short, long)]
    pub name: String,

    /// Write the result back to the file instead of printing it
    #[arg(short, long)]
    pub write: bool,
}

pub fn extract(args: ExtractArgs, config: &Config) -> Result<()> {
    let manager = SessionManager::with_config(config.editor.clone());
    let id = open(&manager, &args.file)?;

    manager.goto(&id, &parse_path(&args.path)?)?;
    let result = manager.extract_to_let(&id, &args.name)?;
    eprintln!(
        "{} bound '{}' at line {}",
        "✓".green(),
        args.name,
        result.location.line
    );

    finish(&manager, &id, args.write)
}
