//! Runtime configuration, read from `HELPDESK_*` environment variables with
//! defaults for everything.

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

use crate::workflow::TransitionPolicy;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5050;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    /// Explicit database file. `None` means `.helpdesk/helpdesk.db` found by
    /// walking up from the working directory.
    pub database_path: Option<PathBuf>,
    pub workflow: WorkflowConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to let in-flight requests finish after a shutdown signal.
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    pub transition_policy: TransitionPolicy,
    /// Issue a CSAT survey when a ticket enters RESOLVED.
    pub survey_on_resolve: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            shutdown_timeout: 10,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            transition_policy: TransitionPolicy::Permissive,
            survey_on_resolve: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database_path: None,
            workflow: WorkflowConfig::default(),
            log: LogConfig {
                format: LogFormat::default(),
            },
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when a variable is set to a value that does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, so tests need not touch the
    /// real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("HELPDESK_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("HELPDESK_PORT must be a port number, got '{}'", raw))?,
            None => defaults.server.port,
        };

        let shutdown_timeout = match var("HELPDESK_SHUTDOWN_TIMEOUT") {
            Some(raw) => raw.trim().parse().with_context(|| {
                format!("HELPDESK_SHUTDOWN_TIMEOUT must be seconds, got '{}'", raw)
            })?,
            None => defaults.server.shutdown_timeout,
        };

        let transition_policy = match var("HELPDESK_TRANSITION_POLICY") {
            Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
            None => defaults.workflow.transition_policy,
        };

        let survey_on_resolve = match var("HELPDESK_SURVEY_ON_RESOLVE") {
            Some(raw) => parse_bool("HELPDESK_SURVEY_ON_RESOLVE", &raw)?,
            None => defaults.workflow.survey_on_resolve,
        };

        let format = match var("HELPDESK_LOG_FORMAT").as_deref().map(str::trim) {
            None => defaults.log.format,
            Some(raw) if raw.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) => bail!("HELPDESK_LOG_FORMAT must be 'pretty' or 'json', got '{}'", raw),
        };

        Ok(Config {
            server: ServerConfig {
                host: var("HELPDESK_HOST").unwrap_or(defaults.server.host),
                port,
                shutdown_timeout,
            },
            database_path: var("HELPDESK_DB").map(PathBuf::from),
            workflow: WorkflowConfig {
                transition_policy,
                survey_on_resolve,
            },
            log: LogConfig { format },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{} must be true or false, got '{}'", key, raw),
    }
}
