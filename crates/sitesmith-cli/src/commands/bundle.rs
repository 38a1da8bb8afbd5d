use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use sitesmith_core::artifact::bundle_entry;

use super::files::read_site;

pub fn run(dir: &Path, entry: &str, out: Option<&Path>) -> Result<()> {
    let files = read_site(dir)?;
    let html = bundle_entry(&files, entry);

    match out {
        Some(path) => {
            fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}
