use super::DatasetLoader;
use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Delimited(u8),
    Parquet,
}

/// Reads the first existing file among the candidates.
///
/// `.parquet` files are scanned as Parquet, `.csv` as comma-separated and
/// `.tsv`/`.txt` as tab-separated. Anything else (the exported dataset has
/// no extension) is sniffed: a tab in the header line means tab-separated.
#[derive(Debug, Clone)]
pub struct FileLoader {
    candidates: Vec<PathBuf>,
}

impl FileLoader {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self::new(vec![path.into()])
    }

    fn detect_format(path: &Path) -> Result<Format> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match extension.as_deref() {
            Some("parquet") => Ok(Format::Parquet),
            Some("csv") => Ok(Format::Delimited(b',')),
            Some("tsv") | Some("txt") => Ok(Format::Delimited(b'\t')),
            _ => {
                let mut header = String::new();
                BufReader::new(File::open(path)?).read_line(&mut header)?;
                let separator = if header.contains('\t') { b'\t' } else { b',' };
                Ok(Format::Delimited(separator))
            }
        }
    }

    fn read(path: &Path) -> Result<Dataset> {
        let format = Self::detect_format(path)?;
        debug!("Reading {} as {:?}", path.display(), format);

        let raw = match format {
            Format::Parquet => {
                LazyFrame::scan_parquet(path, ScanArgsParquet::default())?.collect()?
            }
            Format::Delimited(separator) => LazyCsvReader::new(path)
                .with_has_header(true)
                .with_separator(separator)
                .with_infer_schema_length(None)
                .finish()?
                .collect()?,
        };

        info!(
            "📄 Read {} rows, {} columns from {}",
            raw.height(),
            raw.width(),
            path.display()
        );
        Dataset::from_frame(raw)
    }
}

impl DatasetLoader for FileLoader {
    fn describe(&self) -> String {
        let names: Vec<String> = self
            .candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        format!("files [{}]", names.join(", "))
    }

    fn load(&self) -> Result<Dataset> {
        let mut failures = Vec::new();
        for path in &self.candidates {
            if !path.is_file() {
                debug!("Skipping missing candidate {}", path.display());
                failures.push(format!("{}: not found", path.display()));
                continue;
            }
            match Self::read(path) {
                Ok(dataset) => return Ok(dataset),
                Err(err) => failures.push(format!("{}: {}", path.display(), err)),
            }
        }

        Err(DashboardError::Load(if failures.is_empty() {
            "no candidate files configured".to_string()
        } else {
            failures.join("; ")
        }))
    }
}
