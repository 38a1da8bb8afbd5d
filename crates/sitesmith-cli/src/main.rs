use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sitesmith_core::SitesmithError;
use sitesmith_core::artifact::{INDEX_FILE, Locale};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "sitesmith")]
#[command(about = "Sitesmith CLI - generate, refine, and preview websites from a prompt", long_about = None)]
struct Cli {
    /// Show debug logs (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration directory [default: platform config dir]/sitesmith
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Use this model instead of the configured candidates (repeatable, tried in order)
    #[arg(long = "model", global = true, value_name = "MODEL")]
    models: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write config.toml and secret.json templates
    Init,
    /// Generate a new site from a prompt
    Generate {
        #[arg(short, long)]
        prompt: String,
        #[arg(short, long, value_parser = parse_locale)]
        locale: Option<Locale>,
        /// Directory to write the generated files into
        #[arg(short, long, value_name = "DIR")]
        out: PathBuf,
    },
    /// Apply an instruction to the site in a directory
    Refine {
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,
        #[arg(short, long)]
        prompt: String,
        #[arg(short, long, value_parser = parse_locale)]
        locale: Option<Locale>,
    },
    /// Ask the assistant a question
    Chat {
        #[arg(short, long)]
        message: String,
        /// JSON array of {"speaker"|"role", "text"} turns
        #[arg(long, value_name = "FILE")]
        history: Option<PathBuf>,
    },
    /// Ask the tutor for a lesson; prints {chatResponse, boardContent}
    Tutor {
        #[arg(short, long)]
        message: String,
        #[arg(long, value_name = "FILE")]
        history: Option<PathBuf>,
        #[arg(short, long, value_parser = parse_locale)]
        locale: Option<Locale>,
    },
    /// Inline a site's styles and scripts into one previewable HTML document
    Bundle {
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,
        #[arg(long, default_value = INDEX_FILE)]
        entry: String,
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn parse_locale(tag: &str) -> std::result::Result<Locale, String> {
    Locale::parse(tag).ok_or_else(|| format!("unsupported locale '{tag}' (expected id, tet, en, or pt)"))
}

fn default_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let context = Context::new(cli.config_dir, cli.models);

    match cli.command {
        Commands::Init => commands::init::run(&context)?,
        Commands::Generate {
            prompt,
            locale,
            out,
        } => commands::site::generate(&context, &prompt, locale, &out).await?,
        Commands::Refine {
            dir,
            prompt,
            locale,
        } => commands::site::refine(&context, &dir, &prompt, locale).await?,
        Commands::Chat { message, history } => {
            commands::conversation::chat(&context, &message, history.as_deref()).await?
        }
        Commands::Tutor {
            message,
            history,
            locale,
        } => commands::conversation::tutor(&context, &message, history.as_deref(), locale).await?,
        Commands::Bundle { dir, entry, out } => {
            commands::bundle::run(&dir, &entry, out.as_deref())?
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if let Some(error) = err.downcast_ref::<SitesmithError>() {
                eprintln!("Hint: {}", error.remediation_hint());
            }
            ExitCode::FAILURE
        }
    }
}
