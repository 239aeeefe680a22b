use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use paren_editor::{Mutation, SessionManager};
use std::fs;
use std::path::PathBuf;

use super::{finish, open};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// File to edit
    pub file: PathBuf,

    /// JSON file holding an array of operations
    #[arg(short, long)]
    pub ops: PathBuf,

    /// Write the result back to the file instead of printing it
    #[arg(short, long)]
    pub write: bool,
}

pub fn apply(args: ApplyArgs, config: &Config) -> Result<()> {
    let content = fs::read_to_string(&args.ops)
        .with_context(|| format!("Cannot read {}", args.ops.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid operations in {}", args.ops.display()))?;

    let manager = SessionManager::with_config(config.editor.clone());
    let id = open(&manager, &args.file)?;

    let result = manager.apply_all(&id, &mutations)?;
    eprintln!("{} applied {} operations", "✓".green(), mutations.len());
    if let Some(count) = result.replacements {
        eprintln!("   Replacements: {}", count);
    }

    finish(&manager, &id, args.write)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_ops_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("core.clj");
        let ops = dir.path().join("ops.json");
        fs::write(&file, "(defn f [x] (str (inc x)))").unwrap();
        fs::write(
            &ops,
            r#"[{"op": "goto", "path": [0, 3]}, {"op": "thread", "style": "first"}]"#,
        )
        .unwrap();

        let args = ApplyArgs {
            file: file.clone(),
            ops,
            write: true,
        };
        apply(args, &Config::default()).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "(defn f [x] (-> x inc str))");
    }

    #[test]
    fn test_apply_failure_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("core.clj");
        let ops = dir.path().join("ops.json");
        fs::write(&file, "(a b)").unwrap();
        fs::write(
            &ops,
            r#"[{"op": "bulk_replace", "query": "a", "replacement": "z"}, {"op": "navigate", "direction": "up"}]"#,
        )
        .unwrap();

        let args = ApplyArgs {
            file: file.clone(),
            ops,
            write: true,
        };
        assert!(apply(args, &Config::default()).is_err());
        assert_eq!(fs::read_to_string(&file).unwrap(), "(a b)");
    }
}
