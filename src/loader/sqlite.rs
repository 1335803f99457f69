use super::DatasetLoader;
use crate::dataset::{normalize_header, Dataset, Transaction};
use crate::error::{DashboardError, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Reads the whole transaction table from a SQLite database, opened
/// read-only.
#[derive(Debug, Clone)]
pub struct SqliteLoader {
    path: PathBuf,
    table: String,
}

impl SqliteLoader {
    pub fn new(path: impl AsRef<Path>, table: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            table: table.into(),
        }
    }

    fn validate_table(&self) -> Result<&str> {
        let valid = !self.table.is_empty()
            && self
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(&self.table)
        } else {
            Err(DashboardError::Config(format!(
                "invalid table name '{}'",
                self.table
            )))
        }
    }
}

fn as_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

fn as_number(value: ValueRef<'_>) -> f64 {
    match value {
        ValueRef::Integer(v) => v as f64,
        ValueRef::Real(v) => v,
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0.0),
        ValueRef::Null | ValueRef::Blob(_) => 0.0,
    }
}

fn as_int(value: ValueRef<'_>) -> Option<i32> {
    match value {
        ValueRef::Integer(v) => i32::try_from(v).ok(),
        ValueRef::Real(v) => Some(v as i32),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok()?.trim().parse().ok(),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

impl DatasetLoader for SqliteLoader {
    fn describe(&self) -> String {
        format!("sqlite {} (table {})", self.path.display(), self.table)
    }

    fn load(&self) -> Result<Dataset> {
        let table = self.validate_table()?;
        if !self.path.is_file() {
            return Err(DashboardError::Load(format!(
                "database not found: {}",
                self.path.display()
            )));
        }

        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM {}", table))?;

        let positions: HashMap<String, usize> = stmt
            .column_names()
            .iter()
            .enumerate()
            .map(|(i, name)| (normalize_header(name), i))
            .collect();
        let index = |name: &str| -> Result<usize> {
            positions.get(name).copied().ok_or_else(|| {
                DashboardError::Schema(format!("table '{}' has no column '{}'", table, name))
            })
        };

        let year = index("year")?;
        let month = index("month")?;
        let supplier = index("supplier")?;
        let item_code = index("item_code")?;
        let item_description = index("item_description")?;
        let item_type = index("item_type")?;
        let retail_sales = index("retail_sales")?;
        let retail_transfers = index("retail_transfers")?;
        let warehouse_sales = index("warehouse_sales")?;

        let mut transactions = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let period = (as_int(row.get_ref(year)?), as_int(row.get_ref(month)?));
            let (Some(y), Some(m)) = period else {
                continue;
            };
            transactions.push(Transaction {
                year: y,
                month: m,
                supplier: as_text(row.get_ref(supplier)?),
                item_code: as_text(row.get_ref(item_code)?),
                item_description: as_text(row.get_ref(item_description)?),
                item_type: as_text(row.get_ref(item_type)?),
                retail_sales: as_number(row.get_ref(retail_sales)?),
                retail_transfers: as_number(row.get_ref(retail_transfers)?),
                warehouse_sales: as_number(row.get_ref(warehouse_sales)?),
            });
        }

        info!("🗄️  Read {} rows from table {}", transactions.len(), table);
        Dataset::from_transactions(&transactions)
    }
}
