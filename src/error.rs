use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("No data available")]
    NoData,

    #[error("{0}")]
    EmptyResult(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Load error: {0}")]
    Load(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),
}

impl DashboardError {
    /// Expected outcomes that are reported to the caller verbatim.
    pub fn is_expected(&self) -> bool {
        matches!(self, DashboardError::NoData | DashboardError::EmptyResult(_))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
