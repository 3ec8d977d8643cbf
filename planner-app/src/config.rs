/// Configuration management for the planner application
///
/// Loads configuration from the environment (after reading `.env` if one is
/// present) into a type-safe struct. Missing required keys are fatal.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string; overrides the `DB_*` keys
/// - `DB_HOST`, `DB_NAME`, `DB_USER`: required unless `DATABASE_URL` is set
/// - `DB_PORT`: default 5432
/// - `DB_PASSWORD`: default empty
/// - `DB_MAX_CONNECTIONS`: default 10
/// - `GOOGLE_API_KEY`: API key for the chat assistant (required)
/// - `AI_MODEL`: default `gemini-2.5-flash-lite`
/// - `AI_ENDPOINT`: default `https://generativelanguage.googleapis.com/v1beta`
/// - `QUERY_TIMEOUT_SECS`: per view query, default 30
///
/// # Example
///
/// ```no_run
/// use planner_app::config::Config;
///
/// # fn example() -> Result<(), planner_app::config::ConfigError> {
/// let config = Config::from_env()?;
/// println!("Chat model: {}", config.chat.model);
/// # Ok(())
/// # }
/// ```

use reqwest::Url;
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Configuration error, fatal at startup
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Chat assistant configuration
    pub chat: ChatConfig,

    /// How long a view waits for one store call
    pub query_timeout: Duration,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Chat assistant configuration
#[derive(Clone)]
pub struct ChatConfig {
    /// Base URL of the generative language API
    pub endpoint: String,

    pub model: String,

    /// Secret; never printed
    pub api_key: String,
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a variable
    /// has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let url = match get("DATABASE_URL") {
            Some(url) => url,
            None => {
                let port = parse_or("DB_PORT", get("DB_PORT"), DEFAULT_DB_PORT)?;
                database_url(
                    &require("DB_HOST")?,
                    port,
                    &require("DB_NAME")?,
                    &require("DB_USER")?,
                    &get("DB_PASSWORD").unwrap_or_default(),
                )?
            }
        };

        let max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            get("DB_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        let api_key = require("GOOGLE_API_KEY")?;
        let model = get("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string());
        let endpoint = get("AI_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_AI_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = parse_or(
            "QUERY_TIMEOUT_SECS",
            get("QUERY_TIMEOUT_SECS"),
            DEFAULT_QUERY_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "QUERY_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database: DatabaseConfig {
                url,
                max_connections,
            },
            chat: ChatConfig {
                endpoint,
                model,
                api_key,
            },
            query_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}

/// Builds a `postgresql://` URL with percent-encoded credentials
fn database_url(
    host: &str,
    port: u16,
    name: &str,
    user: &str,
    password: &str,
) -> Result<String, ConfigError> {
    let invalid_host = || ConfigError::Invalid {
        key: "DB_HOST",
        value: host.to_string(),
    };

    let mut url = Url::parse(&format!("postgresql://{}:{}", host, port)).map_err(|_| invalid_host())?;
    url.set_username(user).map_err(|_| invalid_host())?;
    if !password.is_empty() {
        url.set_password(Some(password)).map_err(|_| invalid_host())?;
    }
    url.set_path(name);

    Ok(url.to_string())
}
