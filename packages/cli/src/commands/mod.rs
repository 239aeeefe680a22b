pub mod apply;
pub mod check;
pub mod extract;
pub mod find;
pub mod rename;
pub mod thread;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use extract::{extract, ExtractArgs};
pub use find::{find, FindArgs};
pub use rename::{rename, RenameArgs};
pub use thread::{thread, ThreadArgs};

use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use paren_editor::{EditorError, MatchOptions, SaveOutcome, SessionManager};
use std::path::{Path, PathBuf};

/// Query flags shared by find and rename
#[derive(Args, Debug, Clone, Copy)]
pub struct MatchArgs {
    /// Match substrings instead of whole names
    #[arg(short, long)]
    pub substring: bool,

    /// Ignore case when matching
    #[arg(short, long)]
    pub ignore_case: bool,
}

impl MatchArgs {
    pub fn options(&self) -> MatchOptions {
        MatchOptions {
            exact_match: !self.substring,
            case_sensitive: !self.ignore_case,
        }
    }
}

/// Open `file` as a session named after its path
pub fn open(manager: &SessionManager, file: &Path) -> Result<String> {
    let id = file.display().to_string();
    let path = file
        .to_str()
        .ok_or_else(|| anyhow!("Path is not valid UTF-8: {}", file.display()))?;

    match manager.create(&id, path, true) {
        Ok(()) => Ok(id),
        Err(EditorError::Parse(err)) => {
            let source = std::fs::read_to_string(file).unwrap_or_default();
            eprint!("{}", paren_parser::format_error(&source, &id, &err));
            Err(anyhow!("Failed to parse {}", file.display()))
        }
        Err(e) => Err(e).with_context(|| format!("Cannot open {}", file.display())),
    }
}

/// Write the session back to its file, or print it to stdout
pub fn finish(manager: &SessionManager, id: &str, write: bool) -> Result<()> {
    if write {
        if let SaveOutcome::WrittenTo(path) = manager.save(id, None)? {
            eprintln!("{} {}", "✓ wrote".green(), path.display());
        }
    } else {
        print!("{}", manager.serialize(id)?);
    }
    Ok(())
}

/// Parse a dotted path such as `1.3.0` into child indices
pub fn parse_path(text: &str) -> Result<Vec<usize>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split('.')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| anyhow!("Invalid path segment '{}' in '{}'", part, text))
        })
        .collect()
}

/// Files given directly, plus source files found under given directories
pub fn collect_files(inputs: &[PathBuf], is_source: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            for entry in walkdir::WalkDir::new(input)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && is_source(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            return Err(anyhow!("Input path does not exist: {}", input.display()));
        }
    }
    Ok(files)
}
