//! Grouping & reduction primitives shared by every metric.

use crate::dataset::{Dataset, Dimension, Measure, Period};
use crate::error::{DashboardError, Result};
use polars::prelude::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Mean,
    Max,
    Count,
}

/// A reduction applied to one measure within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    pub measure: Measure,
    pub reduction: Reduction,
}

impl Aggregate {
    pub fn sum(measure: Measure) -> Self {
        Self {
            measure,
            reduction: Reduction::Sum,
        }
    }

    pub fn mean(measure: Measure) -> Self {
        Self {
            measure,
            reduction: Reduction::Mean,
        }
    }

    pub fn max(measure: Measure) -> Self {
        Self {
            measure,
            reduction: Reduction::Max,
        }
    }

    pub fn count(measure: Measure) -> Self {
        Self {
            measure,
            reduction: Reduction::Count,
        }
    }

    fn expr(&self, alias: &str) -> Expr {
        let base = self.measure.expr();
        let reduced = match self.reduction {
            Reduction::Sum => base.sum(),
            Reduction::Mean => base.mean(),
            Reduction::Max => base.max(),
            Reduction::Count => base.count().cast(DataType::Float64),
        };
        reduced.alias(alias)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Int(i32),
    Text(String),
}

impl KeyValue {
    pub fn as_int(&self) -> i32 {
        match self {
            KeyValue::Int(v) => *v,
            KeyValue::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, KeyValue::Text(s) if s.is_empty())
    }

    pub fn as_text(&self) -> &str {
        match self {
            KeyValue::Int(_) => "",
            KeyValue::Text(s) => s,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Int(v) => write!(f, "{}", v),
            KeyValue::Text(s) => f.write_str(s),
        }
    }
}

/// One group produced by [`group_reduce`]: key values in the order the
/// dimensions were requested, reduced values in the order of the aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: Vec<KeyValue>,
    pub values: Vec<f64>,
}

impl Group {
    pub fn text(&self, index: usize) -> &str {
        self.key.get(index).map(KeyValue::as_text).unwrap_or("")
    }

    pub fn int(&self, index: usize) -> i32 {
        self.key.get(index).map(KeyValue::as_int).unwrap_or(0)
    }

    pub fn value(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    /// Interpret keys `index` and `index + 1` as (year, month).
    pub fn period(&self, index: usize) -> Period {
        Period::new(self.int(index), self.int(index + 1))
    }
}

/// Group the dataset by `keys` and reduce each group with `aggregates`.
///
/// Groups come back in order of first occurrence in the dataset. Callers
/// sort explicitly (and stably) whenever order matters. A group whose text
/// key is missing (stored as `""`) is dropped.
pub fn group_reduce(
    dataset: &Dataset,
    keys: &[Dimension],
    aggregates: &[Aggregate],
) -> Result<Vec<Group>> {
    if dataset.is_empty() {
        return Ok(Vec::new());
    }

    let by: Vec<Expr> = keys.iter().map(|d| col(d.column())).collect();
    let aliases: Vec<String> = (0..aggregates.len())
        .map(|i| format!("__agg_{}", i))
        .collect();
    let aggs: Vec<Expr> = aggregates
        .iter()
        .zip(&aliases)
        .map(|(aggregate, alias)| aggregate.expr(alias))
        .collect();

    let grouped = dataset.lazy().group_by_stable(by).agg(aggs).collect()?;

    let mut key_columns: Vec<Vec<KeyValue>> = Vec::with_capacity(keys.len());
    for dimension in keys {
        let series = grouped.column(dimension.column())?;
        let column: Vec<KeyValue> = if dimension.is_numeric() {
            series
                .i32()?
                .into_iter()
                .map(|v| KeyValue::Int(v.unwrap_or(0)))
                .collect()
        } else {
            series
                .str()?
                .into_iter()
                .map(|v| KeyValue::Text(v.unwrap_or("").to_string()))
                .collect()
        };
        key_columns.push(column);
    }

    let mut value_columns: Vec<Vec<f64>> = Vec::with_capacity(aliases.len());
    for alias in &aliases {
        let column: Vec<f64> = grouped
            .column(alias)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();
        value_columns.push(column);
    }

    Ok((0..grouped.height())
        .map(|row| Group {
            key: key_columns.iter().map(|c| c[row].clone()).collect(),
            values: value_columns.iter().map(|c| c[row]).collect(),
        })
        .filter(|group| !group.key.iter().any(KeyValue::is_missing))
        .collect())
}

/// Sum-only form of [`group_reduce`].
pub fn group_sum(
    dataset: &Dataset,
    keys: &[Dimension],
    measures: &[Measure],
) -> Result<Vec<Group>> {
    let aggregates: Vec<Aggregate> = measures.iter().copied().map(Aggregate::sum).collect();
    group_reduce(dataset, keys, &aggregates)
}

/// Summed measures for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTotals {
    pub period: Period,
    pub values: Vec<f64>,
}

impl PeriodTotals {
    pub fn value(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(0.0)
    }
}

/// Sum `measures` per (year, month), in chronological order.
pub fn period_totals(dataset: &Dataset, measures: &[Measure]) -> Result<Vec<PeriodTotals>> {
    let keys = [Dimension::Year, Dimension::Month];
    let mut totals: Vec<PeriodTotals> = group_sum(dataset, &keys, measures)?
        .into_iter()
        .map(|group| PeriodTotals {
            period: group.period(0),
            values: group.values,
        })
        .collect();
    totals.sort_by_key(|t| t.period);
    Ok(totals)
}

/// The maximum year present, then the maximum month within that year.
/// `None` when the dataset is empty.
pub fn latest_period(dataset: &Dataset) -> Result<Option<Period>> {
    Ok(dataset.row_periods()?.into_iter().max())
}

/// Every metric rejects an empty dataset the same way.
pub fn ensure_data(dataset: &Dataset) -> Result<()> {
    if dataset.is_empty() {
        return Err(DashboardError::NoData);
    }
    Ok(())
}

/// `numerator / denominator`, defined as exactly 0 when the denominator is 0.
pub fn zero_safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// `part` as a percentage of `whole`; 0 when `whole` is 0.
pub fn share(part: f64, whole: f64) -> f64 {
    zero_safe_ratio(part, whole) * 100.0
}

/// Percentage change from `previous` to `current`; 0 when `previous` is 0.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    zero_safe_ratio(current - previous, previous) * 100.0
}

pub fn mean(values: &[f64]) -> f64 {
    zero_safe_ratio(values.iter().sum(), values.len() as f64)
}

/// Stable descending sort: ties keep their incoming order.
pub fn sort_descending<T>(items: &mut [T], key: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
}

/// Index of the first maximum, so ties resolve to the earliest entry.
pub fn first_max_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        match best {
            Some(b) if *v <= values[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Index of the first minimum.
pub fn first_min_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        match best {
            Some(b) if *v >= values[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Cut `text` to its first `width` characters, appending `"..."` when
/// anything was removed.
pub fn truncate_text(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// `"{code} - {description}"` with the description truncated to `width`.
pub fn truncate_label(code: &str, description: &str, width: usize) -> String {
    format!("{} - {}", code, truncate_text(description, width))
}
