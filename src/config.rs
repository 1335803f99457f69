//! Runtime configuration from the environment.

use crate::error::{DashboardError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_PATHS: &str = "Sales data - Filtered,Sales data";
pub const DEFAULT_TABLE: &str = "sales";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where the transaction table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Candidate files, tried in order; the first readable one wins.
    Files(Vec<PathBuf>),
    Sqlite { path: PathBuf, table: String },
    /// Deterministic generated rows.
    Sample { rows: usize },
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::Files(paths) => {
                let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                format!("files [{}]", names.join(", "))
            }
            DataSource::Sqlite { path, table } => {
                format!("sqlite {} (table {})", path.display(), table)
            }
            DataSource::Sample { rows } => format!("sample data ({} rows)", rows),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub source: DataSource,
    /// Serve generated sample rows instead of an empty dataset when the
    /// configured source cannot be read.
    pub sample_fallback: bool,
    /// Attach debug detail to metric error envelopes.
    pub debug_errors: bool,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            source: DataSource::Files(split_paths(DEFAULT_DATA_PATHS)),
            sample_fallback: false,
            debug_errors: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

fn split_paths(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(DashboardError::Config(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        DashboardError::Config(format!("{} must be a number, got '{}'", name, raw))
    })
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Source precedence: SQLite when
    /// `SALES_DB_PATH` is set, then sample rows when `SALES_SAMPLE_ROWS` is
    /// set, then the candidate file list.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("SALES_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("SALES_PORT").or_else(|| lookup("PORT")) {
            config.port = parse_number("SALES_PORT", &port)?;
        }

        config.source = if let Some(path) = lookup("SALES_DB_PATH") {
            DataSource::Sqlite {
                path: PathBuf::from(path),
                table: lookup("SALES_DB_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            }
        } else if let Some(rows) = lookup("SALES_SAMPLE_ROWS") {
            DataSource::Sample {
                rows: parse_number("SALES_SAMPLE_ROWS", &rows)?,
            }
        } else {
            let raw = lookup("SALES_DATA_PATH").unwrap_or_else(|| DEFAULT_DATA_PATHS.to_string());
            let paths = split_paths(&raw);
            if paths.is_empty() {
                return Err(DashboardError::Config(
                    "SALES_DATA_PATH lists no files".to_string(),
                ));
            }
            DataSource::Files(paths)
        };

        if let Some(raw) = lookup("SALES_SAMPLE_FALLBACK") {
            config.sample_fallback = parse_flag("SALES_SAMPLE_FALLBACK", &raw)?;
        }
        if let Some(raw) = lookup("SALES_DEBUG_ERRORS") {
            config.debug_errors = parse_flag("SALES_DEBUG_ERRORS", &raw)?;
        }
        if let Some(raw) = lookup("SALES_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_number("SALES_REQUEST_TIMEOUT_SECS", &raw)?;
            config.request_timeout = Duration::from_secs(secs.max(1));
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
