use std::path::Path;

use anyhow::Result;
use sitesmith_core::artifact::Locale;

use super::Context;
use super::files::load_history;

pub async fn chat(context: &Context, message: &str, history: Option<&Path>) -> Result<()> {
    let history = load_history(history)?;
    let service = context.service().await?;

    let reply = service.chat(message, &history).await?;
    println!("{reply}");
    Ok(())
}

pub async fn tutor(
    context: &Context,
    message: &str,
    history: Option<&Path>,
    locale: Option<Locale>,
) -> Result<()> {
    let history = load_history(history)?;
    let service = context.service().await?;

    let reply = service.tutor(message, &history, locale).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
