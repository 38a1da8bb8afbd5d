//! Reading and writing a site as a plain directory.
//!
//! File names are relative and at most one directory deep (`index.html`,
//! `css/site.css`). Anything else is refused before touching the disk.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use sitesmith_core::artifact::{INDEX_FILE, SourceFile};
use sitesmith_core::conversation::ConversationTurn;
use tracing::debug;

const SITE_EXTENSIONS: [&str; 6] = ["html", "htm", "css", "js", "mjs", "json"];

/// Rejects names that could escape the site directory.
pub fn check_file_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("file name is empty");
    }
    if name.starts_with('/') || name.contains('\\') || name.contains(':') {
        bail!("file name '{name}' must be a relative path");
    }
    let segments: Vec<&str> = name.split('/').collect();
    if segments.iter().any(|segment| matches!(*segment, "" | "." | "..")) {
        bail!("file name '{name}' contains an empty, '.' or '..' segment");
    }
    if segments.len() > 2 {
        bail!("file name '{name}' is nested more than one directory deep");
    }
    Ok(())
}

/// Reads the site files in `dir` and its immediate subdirectories.
///
/// `index.html` comes first; the rest are sorted by name.
pub fn read_site(dir: &Path) -> Result<Vec<SourceFile>> {
    let mut names = Vec::new();
    for entry in read_entries(dir)? {
        let (path, name) = entry;
        if path.is_dir() {
            for (child, child_name) in read_entries(&path)? {
                if child.is_file() && is_site_file(&child_name) {
                    names.push(format!("{name}/{child_name}"));
                }
            }
        } else if is_site_file(&name) {
            names.push(name);
        }
    }

    names.sort_by(|a, b| (a != INDEX_FILE).cmp(&(b != INDEX_FILE)).then(a.cmp(b)));

    let files = names
        .into_iter()
        .map(|name| {
            let path = dir.join(&name);
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(SourceFile::inferred(name, content))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(dir = %dir.display(), count = files.len(), "Read site directory");
    Ok(files)
}

/// Writes `files` under `dir`, removing files listed in `previous` that the new set dropped.
pub fn write_site(dir: &Path, files: &[SourceFile], previous: &[SourceFile]) -> Result<()> {
    for file in files {
        check_file_name(&file.name)?;
    }

    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    for file in files {
        let path = dir.join(&file.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let kept: HashSet<&str> = files.iter().map(|file| file.name.as_str()).collect();
    for stale in previous.iter().filter(|file| !kept.contains(file.name.as_str())) {
        let path = dir.join(&stale.name);
        debug!(file = %stale.name, "Removing file dropped by refinement");
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Loads a JSON conversation history; no file means no history.
pub fn load_history(path: Option<&Path>) -> Result<Vec<ConversationTurn>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of conversation turns", path.display()))
}

fn read_entries(dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        entries.push((entry.path(), name));
    }
    Ok(entries)
}

fn is_site_file(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| SITE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
