mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use locale_sync_phrase::{PhraseClient, PhraseClientConfig};
use tracing_subscriber::EnvFilter;

use crate::commands::upload::UploadArgs;
use crate::config::{ConfigError, PhraseConfig};

#[derive(Parser)]
#[command(name = "locale-sync")]
#[command(about = "Synchronize locale files with a Phrase project")]
struct Cli {
    /// Configuration file (defaults to ./.phrase.yml, then ~/.phrase.yml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download locale files for every configured pull target
    Pull {
        /// Print per-file and per-request diagnostics to stderr
        #[arg(long, short)]
        verbose: bool,
    },
    /// Upload every local file matched by the configured push sources
    Push {
        /// Print per-file and per-request diagnostics to stderr
        #[arg(long, short)]
        verbose: bool,
    },
    /// List the locales of a project
    Locales {
        /// Project to list (defaults to the configured project_id)
        #[arg(long)]
        project_id: Option<String>,
    },
    /// Upload a single locale file
    Upload {
        /// File to upload
        file: PathBuf,
        /// Project to upload into (defaults to the configured project_id)
        #[arg(long)]
        project_id: Option<String>,
        /// Locale the file belongs to
        #[arg(long)]
        locale_id: Option<String>,
        /// File format (defaults to the configured file_format)
        #[arg(long)]
        file_format: Option<String>,
        /// Comma-separated tags to attach to uploaded keys
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Overwrite existing translations
        #[arg(long)]
        update_translations: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Client for commands that act with the top-level credentials.
fn default_client(config: &PhraseConfig, env_token: Option<String>) -> Result<PhraseClient> {
    Ok(PhraseClient::new(PhraseClientConfig {
        access_token: config.default_access_token(env_token)?,
        host: config.host.clone(),
    }))
}

fn project_id(explicit: Option<String>, config: &PhraseConfig) -> Result<String> {
    explicit
        .or_else(|| config.defaults(None).project_id)
        .ok_or_else(|| ConfigError::MissingDefaultProjectId.into())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    // `locales` and `upload` can run from flags and the environment alone.
    let loaded =
        config::load_optional(cli.config.as_deref()).context("could not load configuration")?;

    match cli.command {
        Command::Pull { verbose } => {
            let config = loaded.ok_or(ConfigError::NotFound)?;
            let targets = config.pull_targets(config::env_token())?;
            commands::pull::run(&targets, config.host.as_deref(), verbose).await
        }
        Command::Push { verbose } => {
            let config = loaded.ok_or(ConfigError::NotFound)?;
            let sources = config.push_sources(config::env_token())?;
            commands::push::run(&sources, config.host.as_deref(), verbose).await
        }
        Command::Locales { project_id: explicit } => {
            let config = loaded.unwrap_or_default();
            let project_id = project_id(explicit, &config)?;
            let client = default_client(&config, config::env_token())?;
            commands::locales::run(&client, &project_id).await
        }
        Command::Upload {
            file,
            project_id: explicit,
            locale_id,
            file_format,
            tags,
            update_translations,
        } => {
            let config = loaded.unwrap_or_default();
            let project_id = project_id(explicit, &config)?;
            let client = default_client(&config, config::env_token())?;
            let args = UploadArgs {
                locale_id,
                file_format: file_format.or_else(|| config.defaults(None).file_format),
                tags,
                update_translations,
            };
            commands::upload::run(&client, &project_id, &file, args).await
        }
    }
}
