use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use paren_parser::{format_error, parse, serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::collect_files;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files or directories to check
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
enum Verdict {
    Ok,
    ParseFailed,
    NotLossless,
}

pub fn check(args: CheckArgs, config: &Config) -> Result<()> {
    let files = collect_files(&args.inputs, |path| config.is_source_file(path))?;

    let mut failed = 0;
    for file in &files {
        match check_file(file)? {
            Verdict::Ok => println!("{} {}", "✓".green(), file.display()),
            Verdict::ParseFailed => {
                println!("{} {}", "✗".red(), file.display());
                failed += 1;
            }
            Verdict::NotLossless => {
                println!("{} {} (round-trip differs)", "✗".red(), file.display());
                failed += 1;
            }
        }
    }

    println!();
    println!("   Files checked: {}", files.len());
    if failed > 0 {
        println!("   {} {}", "Failed:".red(), failed);
        return Err(anyhow!("{} of {} files failed", failed, files.len()));
    }
    Ok(())
}

fn check_file(path: &Path) -> Result<Verdict> {
    let source = fs::read_to_string(path)?;
    match parse(&source) {
        Ok(tree) if serialize(&tree) == source => Ok(Verdict::Ok),
        Ok(_) => Ok(Verdict::NotLossless),
        Err(err) => {
            eprint!("{}", format_error(&source, &path.display().to_string(), &err));
            Ok(Verdict::ParseFailed)
        }
    }
}
