use anyhow::Result;

use super::Context;

pub fn run(context: &Context) -> Result<()> {
    let config = context.paths().ensure_config_file()?;
    let secret = context.paths().ensure_secret_file()?;

    println!("Config: {}", config.display());
    println!("Secret: {}", secret.display());
    println!("Add your Gemini API key to the secret file, or set GEMINI_API_KEY.");
    Ok(())
}
