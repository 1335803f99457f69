//! Current-vs-previous month KPI snapshot.

use super::primitives::{first_max_index, group_sum, latest_period, percent_change};
use crate::dataset::{Dataset, Dimension, Measure};
use crate::error::{DashboardError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PeriodSnapshot {
    /// `"YYYY-MM"`
    pub name: String,
    /// Retail sales, warehouse sales
    pub values: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiSnapshot {
    pub labels: [&'static str; 2],
    pub current_month: PeriodSnapshot,
    pub previous_month: PeriodSnapshot,
    pub current_retail_sales: f64,
    pub current_warehouse_sales: f64,
    pub previous_retail_sales: f64,
    pub previous_warehouse_sales: f64,
    pub retail_change_percent: f64,
    pub warehouse_change_percent: f64,
    pub total_sales_current: f64,
    pub total_sales_previous: f64,
    pub total_change_percent: f64,
    pub top_supplier: String,
    pub total_suppliers: usize,
    pub total_items: usize,
}

pub fn kpi_snapshot(dataset: &Dataset) -> Result<KpiSnapshot> {
    let latest = latest_period(dataset)?.ok_or(DashboardError::NoData)?;
    let previous = latest.previous();

    let current_rows = dataset.period_slice(latest)?;
    let previous_rows = dataset.period_slice(previous)?;

    let current_retail = current_rows.total(Measure::RetailSales)?;
    let current_warehouse = current_rows.total(Measure::WarehouseSales)?;
    let previous_retail = previous_rows.total(Measure::RetailSales)?;
    let previous_warehouse = previous_rows.total(Measure::WarehouseSales)?;

    let total_current = current_retail + current_warehouse;
    let total_previous = previous_retail + previous_warehouse;

    // Ranked over the whole dataset, not just the latest month
    let suppliers = group_sum(dataset, &[Dimension::Supplier], &[Measure::RetailSales])?;
    let sales: Vec<f64> = suppliers.iter().map(|g| g.value(0)).collect();
    let top_supplier = first_max_index(&sales)
        .map(|i| suppliers[i].text(0).to_string())
        .unwrap_or_else(|| "N/A".to_string());

    Ok(KpiSnapshot {
        labels: ["Retail Sales", "Warehouse Sales"],
        current_month: PeriodSnapshot {
            name: latest.label(),
            values: [current_retail, current_warehouse],
        },
        previous_month: PeriodSnapshot {
            name: previous.label(),
            values: [previous_retail, previous_warehouse],
        },
        current_retail_sales: current_retail,
        current_warehouse_sales: current_warehouse,
        previous_retail_sales: previous_retail,
        previous_warehouse_sales: previous_warehouse,
        retail_change_percent: percent_change(current_retail, previous_retail),
        warehouse_change_percent: percent_change(current_warehouse, previous_warehouse),
        total_sales_current: total_current,
        total_sales_previous: total_previous,
        total_change_percent: percent_change(total_current, total_previous),
        top_supplier,
        total_suppliers: dataset.distinct_count(Dimension::Supplier)?,
        total_items: dataset.distinct_count(Dimension::ItemCode)?,
    })
}
