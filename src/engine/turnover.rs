//! Inventory turnover proxies.
//!
//! There is no stock-on-hand data, so turnover is approximated two ways:
//! retail sales over warehouse sales ([`inventory_turnover_rate`]) and the
//! average monthly movement of every stream ([`inventory_movement`]).

use super::bands::{Bound, MOVEMENT, TURNOVER};
use super::primitives::{
    ensure_data, group_sum, period_totals, share, sort_descending, zero_safe_ratio,
};
use crate::dataset::{Dataset, Dimension, Measure};
use crate::error::Result;
use serde::Serialize;

/// Rate a category must reach to count as efficient.
const EFFICIENT_TIER: &str = "Good";

#[derive(Debug, Clone, Serialize)]
pub struct Benchmark {
    pub label: &'static str,
    pub threshold: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemTypeTurnover {
    pub item_types: Vec<String>,
    pub retail_sales: Vec<f64>,
    pub warehouse_sales: Vec<f64>,
    pub turnover_rates: Vec<f64>,
    pub performance_categories: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EfficiencyMetrics {
    pub efficient_categories: usize,
    pub total_categories: usize,
    pub efficiency_percentage: f64,
    pub best_performing_category: String,
    pub best_turnover_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryTurnover {
    pub turnover_rate: f64,
    pub total_retail_sales: f64,
    pub total_warehouse_sales: f64,
    pub performance_category: &'static str,
    pub performance_color: &'static str,
    pub benchmarks: Vec<Benchmark>,
    pub item_type_analysis: ItemTypeTurnover,
    pub efficiency_metrics: EfficiencyMetrics,
}

fn benchmarks() -> Vec<Benchmark> {
    TURNOVER
        .bands()
        .iter()
        .filter_map(|band| match band.bound {
            Bound::AtLeast(threshold) => Some(Benchmark {
                label: band.label,
                threshold,
                color: band.color.unwrap_or("#9E9E9E"),
            }),
            _ => None,
        })
        .collect()
}

pub fn inventory_turnover_rate(dataset: &Dataset) -> Result<InventoryTurnover> {
    ensure_data(dataset)?;

    let retail = dataset.total(Measure::RetailSales)?;
    let warehouse = dataset.total(Measure::WarehouseSales)?;
    let rate = zero_safe_ratio(retail, warehouse);

    let groups = group_sum(
        dataset,
        &[Dimension::ItemType],
        &[Measure::RetailSales, Measure::WarehouseSales],
    )?;
    let mut rows: Vec<(String, f64, f64, f64)> = groups
        .iter()
        .map(|g| {
            (
                g.text(0).to_string(),
                g.value(0),
                g.value(1),
                zero_safe_ratio(g.value(0), g.value(1)),
            )
        })
        .collect();
    sort_descending(&mut rows, |row| row.3);

    let efficient = rows
        .iter()
        .filter(|row| TURNOVER.reaches(row.3, EFFICIENT_TIER))
        .count();

    Ok(InventoryTurnover {
        turnover_rate: rate,
        total_retail_sales: retail,
        total_warehouse_sales: warehouse,
        performance_category: TURNOVER.label(rate),
        performance_color: TURNOVER.color(rate),
        benchmarks: benchmarks(),
        efficiency_metrics: EfficiencyMetrics {
            efficient_categories: efficient,
            total_categories: rows.len(),
            efficiency_percentage: share(efficient as f64, rows.len() as f64),
            best_performing_category: rows
                .first()
                .map(|row| row.0.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            best_turnover_rate: rows.first().map(|row| row.3).unwrap_or(0.0),
        },
        item_type_analysis: ItemTypeTurnover {
            item_types: rows.iter().map(|r| r.0.clone()).collect(),
            retail_sales: rows.iter().map(|r| r.1).collect(),
            warehouse_sales: rows.iter().map(|r| r.2).collect(),
            performance_categories: rows.iter().map(|r| TURNOVER.label(r.3)).collect(),
            turnover_rates: rows.into_iter().map(|r| r.3).collect(),
        },
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryMovement {
    pub item_types: Vec<String>,
    pub total_movements: Vec<f64>,
    pub monthly_avg_movements: Vec<f64>,
    pub turnover_ratings: Vec<&'static str>,
    pub retail_sales: Vec<f64>,
    pub retail_transfers: Vec<f64>,
    pub warehouse_sales: Vec<f64>,
    pub monthly_periods: Vec<String>,
    pub monthly_turnovers: Vec<f64>,
    pub total_turnover: f64,
    pub average_monthly_turnover: f64,
    pub unique_months_analyzed: usize,
    pub top_turnover_category: String,
    pub lowest_turnover_category: String,
    pub high_turnover_categories: usize,
    pub total_categories: usize,
}

pub fn inventory_movement(dataset: &Dataset) -> Result<InventoryMovement> {
    ensure_data(dataset)?;

    let monthly = period_totals(dataset, &[Measure::TotalVolume])?;
    let months = monthly.len() as f64;

    let mut groups = group_sum(dataset, &[Dimension::ItemType], &Measure::STREAMS)?;
    let movement = |values: &[f64]| -> f64 { values.iter().sum() };
    sort_descending(&mut groups, |g| movement(&g.values));

    let totals: Vec<f64> = groups.iter().map(|g| movement(&g.values)).collect();
    let averages: Vec<f64> = totals.iter().map(|t| zero_safe_ratio(*t, months)).collect();
    let ratings: Vec<&'static str> = averages.iter().map(|a| MOVEMENT.label(*a)).collect();
    let total_turnover: f64 = totals.iter().sum();

    let name_at = |index: Option<usize>| {
        index
            .and_then(|i| groups.get(i))
            .map(|g| g.text(0).to_string())
            .unwrap_or_else(|| "N/A".to_string())
    };

    Ok(InventoryMovement {
        item_types: groups.iter().map(|g| g.text(0).to_string()).collect(),
        retail_sales: groups.iter().map(|g| g.value(0)).collect(),
        retail_transfers: groups.iter().map(|g| g.value(1)).collect(),
        warehouse_sales: groups.iter().map(|g| g.value(2)).collect(),
        monthly_periods: monthly.iter().map(|t| t.period.label()).collect(),
        monthly_turnovers: monthly.iter().map(|t| t.value(0)).collect(),
        total_turnover,
        average_monthly_turnover: zero_safe_ratio(total_turnover, months),
        unique_months_analyzed: monthly.len(),
        top_turnover_category: name_at(Some(0)),
        lowest_turnover_category: name_at(groups.len().checked_sub(1)),
        high_turnover_categories: ratings.iter().filter(|r| **r == "High Turnover").count(),
        total_categories: groups.len(),
        total_movements: totals,
        monthly_avg_movements: averages,
        turnover_ratings: ratings,
    })
}
