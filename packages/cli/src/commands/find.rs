use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use paren_editor::{Match, SessionManager};
use serde::Serialize;
use std::path::PathBuf;

use super::{collect_files, open, MatchArgs};

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Symbol or keyword to look for
    pub query: String,

    /// Files or directories to search
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub matching: MatchArgs,

    /// Print matches as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct FileMatch<'a> {
    file: String,
    #[serde(flatten)]
    found: &'a Match,
}

pub fn find(args: FindArgs, config: &Config) -> Result<()> {
    let manager = SessionManager::with_config(config.editor.clone());
    let files = collect_files(&args.inputs, |path| config.is_source_file(path))?;

    let mut results = Vec::new();
    for file in &files {
        let id = open(&manager, file)?;
        let found = manager.find(&id, &args.query, args.matching.options())?;
        manager.close(&id)?;
        results.push((id, found));
    }

    if args.json {
        let flat: Vec<FileMatch> = results
            .iter()
            .flat_map(|(file, found)| {
                found.iter().map(move |m| FileMatch {
                    file: file.clone(),
                    found: m,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&flat)?);
        return Ok(());
    }

    let mut total = 0;
    for (file, found) in &results {
        for m in found {
            println!(
                "{}:{}:{} {} ({})",
                file.cyan(),
                m.location.line,
                m.location.column,
                m.text.bold(),
                m.kind.name()
            );
        }
        total += found.len();
    }
    eprintln!("   {} matches in {} files", total, files.len());
    Ok(())
}
