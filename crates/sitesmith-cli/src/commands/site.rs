use std::path::Path;

use anyhow::{Result, bail};
use sitesmith_core::artifact::{ArtifactSet, Locale};
use tracing::warn;

use super::Context;
use super::files::{read_site, write_site};

pub async fn generate(context: &Context, prompt: &str, locale: Option<Locale>, out: &Path) -> Result<()> {
    let service = context.service().await?;
    let site = service.generate_site(prompt, locale).await?;

    write_site(out, &site.files, &[])?;
    report(&site, out);
    Ok(())
}

pub async fn refine(context: &Context, dir: &Path, prompt: &str, locale: Option<Locale>) -> Result<()> {
    let current = read_site(dir)?;
    if current.is_empty() {
        bail!("{} contains no site files to refine", dir.display());
    }

    let service = context.service().await?;
    let site = service.refine_site(&current, prompt, locale).await?;

    write_site(dir, &site.files, &current)?;
    report(&site, dir);
    Ok(())
}

fn report(site: &ArtifactSet, dir: &Path) {
    if site.index().is_none() {
        warn!("The model did not return index.html; the preview will show a placeholder");
    }
    for file in &site.files {
        println!("{:<4} {}", file.kind.as_str(), dir.join(&file.name).display());
    }
    println!("{} file(s), language: {}", site.files.len(), site.locale);
}
