//! Transaction dataset
//!
//! A read-only table of sales transactions backed by a polars `DataFrame`
//! with a fixed, canonical schema. Loaders hand the engine a `Dataset`; the
//! engine only ever derives new frames from it.

use crate::error::{DashboardError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const SUPPLIER: &str = "supplier";
pub const ITEM_CODE: &str = "item_code";
pub const ITEM_DESCRIPTION: &str = "item_description";
pub const ITEM_TYPE: &str = "item_type";
pub const RETAIL_SALES: &str = "retail_sales";
pub const RETAIL_TRANSFERS: &str = "retail_transfers";
pub const WAREHOUSE_SALES: &str = "warehouse_sales";

/// One row of the source table: a (period, item, supplier) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub year: i32,
    pub month: i32,
    pub supplier: String,
    pub item_code: String,
    pub item_description: String,
    pub item_type: String,
    pub retail_sales: f64,
    pub retail_transfers: f64,
    pub warehouse_sales: f64,
}

/// Categorical columns usable as grouping keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Year,
    Month,
    Supplier,
    ItemCode,
    ItemDescription,
    ItemType,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Year,
        Dimension::Month,
        Dimension::Supplier,
        Dimension::ItemCode,
        Dimension::ItemDescription,
        Dimension::ItemType,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Dimension::Year => YEAR,
            Dimension::Month => MONTH,
            Dimension::Supplier => SUPPLIER,
            Dimension::ItemCode => ITEM_CODE,
            Dimension::ItemDescription => ITEM_DESCRIPTION,
            Dimension::ItemType => ITEM_TYPE,
        }
    }

    /// Year and month are stored as `Int32`, everything else as text.
    pub fn is_numeric(self) -> bool {
        matches!(self, Dimension::Year | Dimension::Month)
    }
}

/// Numeric quantities that can be reduced. `TotalVolume` is derived as the
/// sum of the three stored streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    RetailSales,
    RetailTransfers,
    WarehouseSales,
    TotalVolume,
}

impl Measure {
    /// The three stored revenue streams, in reporting order.
    pub const STREAMS: [Measure; 3] = [
        Measure::RetailSales,
        Measure::RetailTransfers,
        Measure::WarehouseSales,
    ];

    pub fn column(self) -> Option<&'static str> {
        match self {
            Measure::RetailSales => Some(RETAIL_SALES),
            Measure::RetailTransfers => Some(RETAIL_TRANSFERS),
            Measure::WarehouseSales => Some(WAREHOUSE_SALES),
            Measure::TotalVolume => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Measure::RetailSales => "Retail Sales",
            Measure::RetailTransfers => "Retail Transfers",
            Measure::WarehouseSales => "Warehouse Sales",
            Measure::TotalVolume => "Total Volume",
        }
    }

    /// Row-level expression producing this measure.
    pub fn expr(self) -> Expr {
        match self.column() {
            Some(name) => col(name),
            None => col(RETAIL_SALES) + col(RETAIL_TRANSFERS) + col(WAREHOUSE_SALES),
        }
    }
}

/// A reporting month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    pub year: i32,
    pub month: i32,
}

impl Period {
    pub fn new(year: i32, month: i32) -> Self {
        Self { year, month }
    }

    /// The month before this one; January wraps to December of the prior year.
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// Same month, one year earlier.
    pub fn year_earlier(self) -> Self {
        Self::new(self.year - 1, self.month)
    }

    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Map a source header onto the canonical snake_case form:
/// `"RETAIL SALES"` and `"Retail-Sales"` both become `retail_sales`.
pub fn normalize_header(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    /// A dataset with the canonical schema and no rows.
    pub fn empty() -> Self {
        Self::from_transactions(&[]).unwrap_or_else(|_| Self {
            frame: DataFrame::empty(),
        })
    }

    pub fn from_transactions(rows: &[Transaction]) -> Result<Self> {
        let frame = DataFrame::new(vec![
            Series::new(YEAR, rows.iter().map(|r| r.year).collect::<Vec<i32>>()),
            Series::new(MONTH, rows.iter().map(|r| r.month).collect::<Vec<i32>>()),
            Series::new(
                SUPPLIER,
                rows.iter().map(|r| r.supplier.as_str()).collect::<Vec<&str>>(),
            ),
            Series::new(
                ITEM_CODE,
                rows.iter().map(|r| r.item_code.as_str()).collect::<Vec<&str>>(),
            ),
            Series::new(
                ITEM_DESCRIPTION,
                rows.iter()
                    .map(|r| r.item_description.as_str())
                    .collect::<Vec<&str>>(),
            ),
            Series::new(
                ITEM_TYPE,
                rows.iter().map(|r| r.item_type.as_str()).collect::<Vec<&str>>(),
            ),
            Series::new(
                RETAIL_SALES,
                rows.iter().map(|r| r.retail_sales).collect::<Vec<f64>>(),
            ),
            Series::new(
                RETAIL_TRANSFERS,
                rows.iter().map(|r| r.retail_transfers).collect::<Vec<f64>>(),
            ),
            Series::new(
                WAREHOUSE_SALES,
                rows.iter().map(|r| r.warehouse_sales).collect::<Vec<f64>>(),
            ),
        ])?;

        Ok(Self { frame })
    }

    /// Build a dataset from an arbitrary source frame.
    ///
    /// Headers are matched through [`normalize_header`]. Numeric columns are
    /// cast to `Float64` with nulls and unparseable values read as 0, text
    /// columns are cast to strings with nulls read as `""` (a missing key that
    /// grouping skips), and rows without a year or month are dropped.
    pub fn from_frame(raw: DataFrame) -> Result<Self> {
        let names: Vec<String> = raw
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let find = |canonical: &str| -> Result<String> {
            names
                .iter()
                .find(|name| normalize_header(name) == canonical)
                .cloned()
                .ok_or_else(|| {
                    DashboardError::Schema(format!(
                        "missing column '{}' (available: {:?})",
                        canonical, names
                    ))
                })
        };

        let mut exprs = Vec::with_capacity(9);
        for dimension in Dimension::ALL {
            let source = find(dimension.column())?;
            let expr = if dimension.is_numeric() {
                col(&source).cast(DataType::Int32)
            } else {
                col(&source).cast(DataType::String).fill_null(lit(""))
            };
            exprs.push(expr.alias(dimension.column()));
        }
        for measure in Measure::STREAMS {
            if let Some(name) = measure.column() {
                let source = find(name)?;
                exprs.push(
                    col(&source)
                        .cast(DataType::Float64)
                        .fill_null(lit(0.0))
                        .alias(name),
                );
            }
        }

        let frame = raw
            .lazy()
            .select(exprs)
            .filter(col(YEAR).is_not_null().and(col(MONTH).is_not_null()))
            .collect()?;

        Ok(Self { frame })
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Sum of a measure over every row.
    pub fn total(&self, measure: Measure) -> Result<f64> {
        match measure.column() {
            Some(name) => Ok(self.frame.column(name)?.f64()?.sum().unwrap_or(0.0)),
            None => {
                let mut total = 0.0;
                for stream in Measure::STREAMS {
                    total += self.total(stream)?;
                }
                Ok(total)
            }
        }
    }

    /// Distinct non-missing values of a dimension.
    pub fn distinct_count(&self, dimension: Dimension) -> Result<usize> {
        let column = self.frame.column(dimension.column())?;
        if dimension.is_numeric() {
            return Ok(column.drop_nulls().n_unique()?);
        }
        let distinct: HashSet<&str> = column
            .str()?
            .into_iter()
            .flatten()
            .filter(|value| !value.is_empty())
            .collect();
        Ok(distinct.len())
    }

    /// The rows belonging to a single period; possibly empty.
    pub fn period_slice(&self, period: Period) -> Result<Dataset> {
        let frame = self
            .lazy()
            .filter(
                col(YEAR)
                    .eq(lit(period.year))
                    .and(col(MONTH).eq(lit(period.month))),
            )
            .collect()?;
        Ok(Self { frame })
    }

    /// The period of every row, in row order.
    pub fn row_periods(&self) -> Result<Vec<Period>> {
        let years = self.frame.column(YEAR)?.i32()?;
        let months = self.frame.column(MONTH)?.i32()?;
        Ok(years
            .into_iter()
            .zip(months.into_iter())
            .filter_map(|(year, month)| Some(Period::new(year?, month?)))
            .collect())
    }

    /// Distinct periods present, ascending.
    pub fn periods(&self) -> Result<Vec<Period>> {
        let distinct: BTreeSet<Period> = self.row_periods()?.into_iter().collect();
        Ok(distinct.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, month: i32, supplier: &str, sales: f64) -> Transaction {
        Transaction {
            year,
            month,
            supplier: supplier.to_string(),
            item_code: "100".to_string(),
            item_description: "Test item".to_string(),
            item_type: "WINE".to_string(),
            retail_sales: sales,
            retail_transfers: 1.0,
            warehouse_sales: 2.0,
        }
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("RETAIL SALES"), "retail_sales");
        assert_eq!(normalize_header(" Item-Code "), "item_code");
        assert_eq!(normalize_header("year"), "year");
    }

    #[test]
    fn test_previous_period_wraps_january() {
        assert_eq!(Period::new(2024, 1).previous(), Period::new(2023, 12));
        assert_eq!(Period::new(2024, 7).previous(), Period::new(2024, 6));
        assert_eq!(Period::new(2024, 3).to_string(), "2024-03");
    }

    #[test]
    fn test_empty_dataset_has_canonical_schema() {
        let dataset = Dataset::empty();
        assert!(dataset.is_empty());
        assert_eq!(dataset.column_names().len(), 9);
        assert_eq!(dataset.total(Measure::TotalVolume).unwrap(), 0.0);
    }

    #[test]
    fn test_totals_and_distinct_counts() {
        let dataset = Dataset::from_transactions(&[
            row(2024, 1, "A", 10.0),
            row(2024, 2, "B", 5.0),
            row(2024, 2, "A", 1.0),
        ])
        .unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.total(Measure::RetailSales).unwrap(), 16.0);
        assert_eq!(dataset.total(Measure::TotalVolume).unwrap(), 16.0 + 3.0 + 6.0);
        assert_eq!(dataset.distinct_count(Dimension::Supplier).unwrap(), 2);
        assert_eq!(
            dataset.periods().unwrap(),
            vec![Period::new(2024, 1), Period::new(2024, 2)]
        );

        let february = dataset.period_slice(Period::new(2024, 2)).unwrap();
        assert_eq!(february.len(), 2);
        assert_eq!(february.total(Measure::RetailSales).unwrap(), 6.0);

        let missing = dataset.period_slice(Period::new(2023, 12)).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_from_frame_normalizes_source_headers() {
        let raw = df! [
            "YEAR" => [2024i64, 2024],
            "MONTH" => [1i64, 2],
            "SUPPLIER" => ["A", "B"],
            "ITEM CODE" => [100i64, 200],
            "ITEM DESCRIPTION" => ["Red", "White"],
            "ITEM TYPE" => ["WINE", "WINE"],
            "RETAIL SALES" => [1.5, 2.5],
            "RETAIL TRANSFERS" => [0.0, 1.0],
            "WAREHOUSE SALES" => [3.0, 4.0]
        ]
        .unwrap();

        let dataset = Dataset::from_frame(raw).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.total(Measure::WarehouseSales).unwrap(), 7.0);
        assert_eq!(dataset.distinct_count(Dimension::ItemCode).unwrap(), 2);
        assert!(dataset.column_names().contains(&ITEM_CODE.to_string()));
    }

    #[test]
    fn test_from_frame_null_text_keys_are_not_groups() {
        let raw = df! [
            "YEAR" => [2024i64, 2024, 2024],
            "MONTH" => [1i64, 1, 1],
            "SUPPLIER" => [Some("A"), None, Some("B")],
            "ITEM CODE" => [Some(100i64), None, Some(200)],
            "ITEM DESCRIPTION" => [Some("Red"), None, Some("Lager")],
            "ITEM TYPE" => [Some("WINE"), None, Some("BEER")],
            "RETAIL SALES" => [10.0, 500.0, 5.0],
            "RETAIL TRANSFERS" => [0.0, 0.0, 0.0],
            "WAREHOUSE SALES" => [0.0, 0.0, 0.0]
        ]
        .unwrap();

        let dataset = Dataset::from_frame(raw).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.total(Measure::RetailSales).unwrap(), 515.0);
        assert_eq!(dataset.distinct_count(Dimension::Supplier).unwrap(), 2);
        assert_eq!(dataset.distinct_count(Dimension::ItemType).unwrap(), 2);
        assert_eq!(dataset.distinct_count(Dimension::ItemCode).unwrap(), 2);

        let snapshot = crate::engine::kpi::kpi_snapshot(&dataset).unwrap();
        assert_eq!(snapshot.top_supplier, "A");
        assert_eq!(snapshot.total_suppliers, 2);

        let mix = crate::engine::revenue::sales_mix(&dataset).unwrap();
        assert_eq!(mix.item_types, vec!["WINE", "BEER"]);
        assert_eq!(mix.top_contributor, "WINE");

        let suppliers = crate::engine::ranking::sales_per_supplier(&dataset).unwrap();
        assert_eq!(suppliers.best_supplier, "A");
    }

    #[test]
    fn test_from_frame_reports_missing_columns() {
        let raw = df! [
            "YEAR" => [2024i64],
            "MONTH" => [1i64]
        ]
        .unwrap();

        match Dataset::from_frame(raw) {
            Err(DashboardError::Schema(message)) => assert!(message.contains("supplier")),
            other => panic!("expected schema error, got {:?}", other.map(|d| d.len())),
        }
    }
}
