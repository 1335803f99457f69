//! Command-line flags shared by both binaries.

use crate::config::{AppConfig, DataSource};
use clap::Args;
use std::path::PathBuf;

/// Data source overrides. Flags beat the environment; `--sqlite` beats
/// `--sample`, which beats `--data`.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Dataset file (CSV, TSV or Parquet). Repeat to give fallbacks.
    #[arg(short, long = "data", value_name = "PATH")]
    pub data: Vec<PathBuf>,

    /// SQLite database holding the transaction table
    #[arg(long, value_name = "DB")]
    pub sqlite: Option<PathBuf>,

    /// Table to read from the SQLite database
    #[arg(long, value_name = "TABLE", default_value = crate::config::DEFAULT_TABLE)]
    pub table: String,

    /// Use N generated sample rows instead of a real source
    #[arg(long, value_name = "N")]
    pub sample: Option<usize>,

    /// Fall back to generated sample rows when the source cannot be read
    #[arg(long)]
    pub sample_fallback: bool,
}

impl SourceArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.sqlite {
            config.source = DataSource::Sqlite {
                path: path.clone(),
                table: self.table.clone(),
            };
        } else if let Some(rows) = self.sample {
            config.source = DataSource::Sample { rows };
        } else if !self.data.is_empty() {
            config.source = DataSource::Files(self.data.clone());
        }
        if self.sample_fallback {
            config.sample_fallback = true;
        }
    }
}
