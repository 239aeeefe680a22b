use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use paren_editor::SessionManager;
use std::path::PathBuf;

use super::{finish, open, MatchArgs};

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Symbol or keyword to rename
    pub query: String,

    /// Replacement text
    pub replacement: String,

    /// File to edit
    pub file: PathBuf,

    #[command(flatten)]
    pub matching: MatchArgs,

    /// Write the result back to the file instead of printing it
    #[arg(short, long)]
    pub write: bool,
}

pub fn rename(args: RenameArgs, config: &Config) -> Result<()> {
    let manager = SessionManager::with_config(config.editor.clone());
    let id = open(&manager, &args.file)?;

    let count = manager.bulk_replace(&id, &args.query, &args.replacement, args.matching.options())?;
    let label = if count == 0 {
        "✗ no occurrences".yellow()
    } else {
        "✓ replaced".green()
    };
    eprintln!("{} {} of '{}'", label, count, args.query);

    finish(&manager, &id, args.write)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("core.clj");
        std::fs::write(&file, "(defn total [xs] (total* xs :total))").unwrap();

        let args = RenameArgs {
            query: "total".to_string(),
            replacement: "sum".to_string(),
            file: file.clone(),
            matching: MatchArgs {
                substring: false,
                ignore_case: false,
            },
            write: true,
        };
        rename(args, &Config::default()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&file).unwrap(),
            "(defn sum [xs] (total* xs :sum))"
        );
    }
}
