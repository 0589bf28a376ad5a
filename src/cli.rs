use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::config::Settings;
use crate::core::MatchError;
use crate::models::{ErrorResponse, MatchRequest, NormalizeResponse, SearchRequest};
use crate::services::{LlmError, NormalizationError};

#[derive(Parser, Debug)]
#[command(name = "skillswap-match")]
#[command(about = "Normalize hobbies and rank skill-swap matches", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to config/default.toml and config/local.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Use the built-in synonym table instead of the completion service.
    #[arg(long, global = true)]
    pub offline: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize raw hobby names into canonical tags.
    Normalize(NormalizeArgs),
    /// Rank a candidate pool against the current user.
    Match(PoolArgs),
    /// Find candidates who can teach one hobby.
    Search(SearchArgs),
}

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Raw hobby names.
    #[arg(required = true)]
    pub hobbies: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PoolArgs {
    /// JSON file with `currentUser` and `candidates` (`-` reads stdin).
    #[arg(long)]
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// JSON file with `currentUser`, `candidates` and optionally `hobby`.
    #[arg(long)]
    pub input: PathBuf,
    /// Hobby to search for; overrides `hobby` in the input file.
    #[arg(long)]
    pub hobby: Option<String>,
}

/// Errors surfaced by the command-line front end
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Match(#[from] MatchError),
}

impl CliError {
    pub fn error_response(&self) -> ErrorResponse {
        let (error, status_code) = match self {
            CliError::Io { .. } => ("Failed to read input", 400),
            CliError::Json(_) => ("Invalid JSON", 400),
            CliError::Validation(_) => ("Validation failed", 400),
            CliError::Config(_) => ("Configuration error", 500),
            CliError::Llm(_) => ("Completion service unavailable", 502),
            CliError::Normalization(_) => ("Failed to normalize hobbies", 502),
            CliError::Match(_) => ("Failed to compute matches", 502),
        };

        ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
            status_code,
        }
    }
}

/// Load settings for a CLI invocation
pub fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    Ok(settings)
}

/// Execute a command and return its JSON output
pub async fn run(cli: Cli, settings: &Settings) -> Result<String, CliError> {
    let matcher = crate::build_matcher(settings, cli.offline)?;

    match cli.command {
        Commands::Normalize(args) => {
            let hobbies = matcher.normalize_hobby_list(&args.hobbies).await?;
            to_json(&NormalizeResponse { hobbies })
        }
        Commands::Match(args) => {
            let request: MatchRequest = read_json(&args.input)?;
            request.validate_all()?;

            let response = matcher
                .compute_matches(&request.current_user, &request.candidates)
                .await?;
            to_json(&response)
        }
        Commands::Search(args) => {
            let mut request: SearchRequest = read_json(&args.input)?;
            request.validate_all()?;
            if let Some(hobby) = args.hobby {
                request.hobby = hobby;
            }

            let response = matcher
                .search_teachers(&request.pool.current_user, &request.pool.candidates, &request.hobby)
                .await?;
            to_json(&response)
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let io_err = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };

    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(io_err)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(io_err)?
    };

    tracing::debug!("Read {} bytes of input from {}", text.len(), path.display());

    Ok(serde_json::from_str(&text)?)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}
