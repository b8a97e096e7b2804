use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_SYSTEM_PROMPT_PATH: &str = "system_prompt.txt";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_API_HOSTNAME: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;
const DEFAULT_LANGUAGE: &str = "Python";
const DEFAULT_UPLOAD_EXTENSION: &str = "py";

/// Errors that stop the process from starting.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API key not found. Set API_KEY in the environment or a .env file")]
    MissingCredential,

    #[error("System prompt file {} not found: {source}", path.display())]
    MissingInstruction {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: String, value: String },

    #[error("Failed to read .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// An API credential that never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_key: Secret,
    pub system_instruction: String,
    pub model: String,
    pub api_hostname: String,
    pub request_timeout: Duration,
    // Idle sessions older than this are discarded
    pub session_ttl: Duration,
    pub language: String,
    pub upload_extension: String,
}

impl AppConfig {
    /// Load the config from the process environment. Reads `.env`
    /// first when one exists in the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        check_env_file(dotenvy::dotenv())?;
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup. The
    /// credential is checked before anything else is read.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingCredential)?;

        let system_prompt_path = PathBuf::from(
            lookup("REVIEWER_SYSTEM_PROMPT_PATH")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT_PATH.to_string()),
        );
        let system_instruction = fs::read_to_string(&system_prompt_path).map_err(|source| {
            ConfigError::MissingInstruction {
                path: system_prompt_path.clone(),
                source,
            }
        })?;

        let request_timeout = duration_secs(
            &lookup,
            "REVIEWER_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let session_ttl =
            duration_secs(&lookup, "REVIEWER_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;

        let model = lookup("REVIEWER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_hostname =
            lookup("REVIEWER_API_HOST").unwrap_or_else(|| DEFAULT_API_HOSTNAME.to_string());
        let language =
            lookup("REVIEWER_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let upload_extension = lookup("REVIEWER_UPLOAD_EXTENSION")
            .map(|ext| ext.trim_start_matches('.').to_string())
            .unwrap_or_else(|| DEFAULT_UPLOAD_EXTENSION.to_string());

        Ok(Self {
            api_key: Secret::new(&api_key),
            system_instruction,
            model,
            api_hostname,
            request_timeout,
            session_ttl,
            language,
            upload_extension,
        })
    }
}

/// A missing `.env` is fine. One that exists but can't be read or
/// parsed is not.
fn check_env_file(result: Result<PathBuf, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::EnvFile(e)),
    }
}

fn duration_secs<F>(lookup: &F, name: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(Duration::from_secs(default));
    };
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::Invalid {
            name: name.to_string(),
            value,
        })
}
