//! Month-over-month growth.

use super::bands::GROWTH;
use super::primitives::{ensure_data, mean, percent_change, period_totals};
use crate::dataset::{Dataset, Measure};
use crate::error::{DashboardError, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which monthly total growth is measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthBasis {
    Retail,
    #[default]
    Total,
}

impl GrowthBasis {
    pub fn measure(self) -> Measure {
        match self {
            GrowthBasis::Retail => Measure::RetailSales,
            GrowthBasis::Total => Measure::TotalVolume,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GrowthBasis::Retail => "retail",
            GrowthBasis::Total => "total",
        }
    }
}

impl fmt::Display for GrowthBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrowthBasis {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "retail" => Ok(GrowthBasis::Retail),
            "total" => Ok(GrowthBasis::Total),
            other => Err(DashboardError::Config(format!(
                "unknown growth basis '{}' (expected retail or total)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthOverMonthGrowth {
    pub periods: Vec<String>,
    pub years: Vec<i32>,
    pub months: Vec<i32>,
    pub total_sales: Vec<f64>,
    pub previous_month_sales: Vec<f64>,
    pub growth_amounts: Vec<f64>,
    pub growth_percentages: Vec<f64>,
    pub growth_categories: Vec<&'static str>,
    pub average_growth_rate: f64,
    pub latest_growth_rate: f64,
    pub max_growth_rate: f64,
    pub min_growth_rate: f64,
    pub growth_consistency: f64,
    pub positive_growth_months: usize,
    pub total_comparison_months: usize,
    pub trend_direction: &'static str,
    pub latest_trend: &'static str,
    pub basis: GrowthBasis,
}

/// Growth of each period against the one before it in the data. The
/// earliest period only serves as a baseline.
pub fn month_over_month_growth(
    dataset: &Dataset,
    basis: GrowthBasis,
) -> Result<MonthOverMonthGrowth> {
    ensure_data(dataset)?;

    let totals = period_totals(dataset, &[basis.measure()])?;
    let steps: Vec<_> = totals
        .iter()
        .tuple_windows()
        .map(|(previous, current)| (current.period, current.value(0), previous.value(0)))
        .collect();

    if steps.is_empty() {
        return Err(DashboardError::EmptyResult(
            "Insufficient data for growth calculation".to_string(),
        ));
    }

    let percentages: Vec<f64> = steps
        .iter()
        .map(|(_, current, previous)| percent_change(*current, *previous))
        .collect();
    let average = mean(&percentages);
    let latest = percentages.last().copied().unwrap_or(0.0);
    let positive = percentages.iter().filter(|p| **p > 0.0).count();

    Ok(MonthOverMonthGrowth {
        periods: steps.iter().map(|s| s.0.label()).collect(),
        years: steps.iter().map(|s| s.0.year).collect(),
        months: steps.iter().map(|s| s.0.month).collect(),
        total_sales: steps.iter().map(|s| s.1).collect(),
        previous_month_sales: steps.iter().map(|s| s.2).collect(),
        growth_amounts: steps.iter().map(|s| s.1 - s.2).collect(),
        growth_categories: percentages.iter().map(|p| GROWTH.label(*p)).collect(),
        average_growth_rate: average,
        latest_growth_rate: latest,
        max_growth_rate: percentages.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min_growth_rate: percentages.iter().copied().fold(f64::INFINITY, f64::min),
        growth_consistency: positive as f64 / percentages.len() as f64 * 100.0,
        positive_growth_months: positive,
        total_comparison_months: percentages.len(),
        trend_direction: if average > 0.0 { "Positive" } else { "Negative" },
        latest_trend: GROWTH.label(latest),
        growth_percentages: percentages,
        basis,
    })
}
