//! Dataset loaders
//!
//! Each source implements [`DatasetLoader`]. Startup goes through
//! [`load_or_fallback`], which never fails: an unreadable source leaves the
//! server running with an empty dataset, or with generated sample rows when
//! the fallback is enabled.

pub mod file;
pub mod sample;
pub mod sqlite;

use crate::config::DataSource;
use crate::dataset::Dataset;
use crate::error::Result;
use tracing::{info, warn};

pub use file::FileLoader;
pub use sample::{SampleLoader, DEFAULT_SAMPLE_ROWS};
pub use sqlite::SqliteLoader;

pub trait DatasetLoader: Send + Sync {
    /// Short human-readable description of the source, for logs.
    fn describe(&self) -> String;

    fn load(&self) -> Result<Dataset>;
}

pub fn from_source(source: &DataSource) -> Box<dyn DatasetLoader> {
    match source {
        DataSource::Files(paths) => Box::new(FileLoader::new(paths.clone())),
        DataSource::Sqlite { path, table } => Box::new(SqliteLoader::new(path, table)),
        DataSource::Sample { rows } => Box::new(SampleLoader::new(*rows)),
    }
}

pub fn load_or_fallback(loader: &dyn DatasetLoader, sample_fallback: bool) -> Dataset {
    info!("📂 Loading dataset from {}", loader.describe());
    match loader.load() {
        Ok(dataset) => {
            info!("✅ Loaded {} transactions", dataset.len());
            dataset
        }
        Err(err) => {
            warn!("⚠️  Could not load dataset from {}: {}", loader.describe(), err);
            if sample_fallback {
                let sample = SampleLoader::new(DEFAULT_SAMPLE_ROWS);
                match sample.load() {
                    Ok(dataset) => {
                        warn!("Serving {} generated sample transactions", dataset.len());
                        return dataset;
                    }
                    Err(err) => warn!("Sample data generation failed: {}", err),
                }
            }
            warn!("Serving an empty dataset; every metric will report no data");
            Dataset::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;

    struct Broken;

    impl DatasetLoader for Broken {
        fn describe(&self) -> String {
            "broken".to_string()
        }

        fn load(&self) -> Result<Dataset> {
            Err(DashboardError::Load("nothing here".to_string()))
        }
    }

    #[test]
    fn test_failure_leaves_dataset_empty() {
        assert!(load_or_fallback(&Broken, false).is_empty());
    }

    #[test]
    fn test_failure_with_sample_fallback() {
        let dataset = load_or_fallback(&Broken, true);
        assert_eq!(dataset.len(), DEFAULT_SAMPLE_ROWS);
    }

    #[test]
    fn test_from_source_describes_loader() {
        let loader = from_source(&DataSource::Sample { rows: 3 });
        assert!(loader.describe().contains("3"));
        assert_eq!(loader.load().unwrap().len(), 3);
    }
}
