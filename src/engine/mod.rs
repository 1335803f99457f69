//! Aggregation engine
//!
//! Every dashboard metric is a pure function from `&Dataset` to a
//! serializable report. [`compute`] dispatches on [`Metric`] and
//! [`respond`] wraps the outcome in the envelope the dashboard expects:
//! either the report itself or `{ "error": ..., "details"?: ... }`.

pub mod bands;
pub mod growth;
pub mod kpi;
pub mod primitives;
pub mod ranking;
pub mod ratio;
pub mod revenue;
pub mod trends;
pub mod turnover;

use crate::dataset::{Dataset, Measure};
use crate::error::{DashboardError, Result};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, warn};

pub use growth::GrowthBasis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    KpiData,
    OverallSalesPerformance,
    SalesByItemType,
    SupplierPerformance,
    SalesMix,
    TopSellingItems,
    SalesTransferRatio,
    TransferEfficiency,
    MonthOverMonthGrowth,
    InventoryTurnoverRate,
    InventoryMovement,
    SalesPerSupplier,
    TopItemsByTransfers,
    SalesSeasonality,
    MonthlyRetailSales,
    MonthlyWarehouseSales,
    MonthlyTransfers,
    MonthlyTotalVolume,
    YearlySalesTrend,
    SeasonalAnalysis,
    ItemTypeTrends,
}

impl Metric {
    pub const ALL: [Metric; 21] = [
        Metric::KpiData,
        Metric::OverallSalesPerformance,
        Metric::SalesByItemType,
        Metric::SupplierPerformance,
        Metric::SalesMix,
        Metric::TopSellingItems,
        Metric::SalesTransferRatio,
        Metric::TransferEfficiency,
        Metric::MonthOverMonthGrowth,
        Metric::InventoryTurnoverRate,
        Metric::InventoryMovement,
        Metric::SalesPerSupplier,
        Metric::TopItemsByTransfers,
        Metric::SalesSeasonality,
        Metric::MonthlyRetailSales,
        Metric::MonthlyWarehouseSales,
        Metric::MonthlyTransfers,
        Metric::MonthlyTotalVolume,
        Metric::YearlySalesTrend,
        Metric::SeasonalAnalysis,
        Metric::ItemTypeTrends,
    ];

    /// URL path segment and CLI name.
    pub fn slug(self) -> &'static str {
        match self {
            Metric::KpiData => "kpi_data",
            Metric::OverallSalesPerformance => "overall_sales_performance",
            Metric::SalesByItemType => "sales_by_item_type",
            Metric::SupplierPerformance => "supplier_performance",
            Metric::SalesMix => "sales_mix",
            Metric::TopSellingItems => "top_selling_items",
            Metric::SalesTransferRatio => "sales_transfer_ratio",
            Metric::TransferEfficiency => "transfer_efficiency",
            Metric::MonthOverMonthGrowth => "month_over_month_growth",
            Metric::InventoryTurnoverRate => "inventory_turnover_rate",
            Metric::InventoryMovement => "inventory_movement",
            Metric::SalesPerSupplier => "sales_per_supplier",
            Metric::TopItemsByTransfers => "top_items_by_transfers",
            Metric::SalesSeasonality => "sales_seasonality",
            Metric::MonthlyRetailSales => "monthly_retail_sales",
            Metric::MonthlyWarehouseSales => "monthly_warehouse_sales",
            Metric::MonthlyTransfers => "monthly_transfers",
            Metric::MonthlyTotalVolume => "monthly_total_volume",
            Metric::YearlySalesTrend => "yearly_sales_trend",
            Metric::SeasonalAnalysis => "seasonal_analysis",
            Metric::ItemTypeTrends => "item_type_trends",
        }
    }

    /// Human-readable name used in error messages.
    pub fn title(self) -> &'static str {
        match self {
            Metric::KpiData => "KPI data",
            Metric::OverallSalesPerformance => "overall sales performance",
            Metric::SalesByItemType => "sales by item type",
            Metric::SupplierPerformance => "supplier performance",
            Metric::SalesMix => "sales mix",
            Metric::TopSellingItems => "top selling items",
            Metric::SalesTransferRatio => "sales transfer ratio",
            Metric::TransferEfficiency => "transfer efficiency",
            Metric::MonthOverMonthGrowth => "month-over-month growth",
            Metric::InventoryTurnoverRate => "inventory turnover rate",
            Metric::InventoryMovement => "inventory movement",
            Metric::SalesPerSupplier => "sales per supplier",
            Metric::TopItemsByTransfers => "top items by transfers",
            Metric::SalesSeasonality => "sales seasonality",
            Metric::MonthlyRetailSales => "monthly retail sales",
            Metric::MonthlyWarehouseSales => "monthly warehouse sales",
            Metric::MonthlyTransfers => "monthly transfers",
            Metric::MonthlyTotalVolume => "monthly total volume",
            Metric::YearlySalesTrend => "yearly sales trend",
            Metric::SeasonalAnalysis => "seasonal analysis",
            Metric::ItemTypeTrends => "item type trends",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Metric> {
        Metric::ALL.iter().copied().find(|m| m.slug() == slug)
    }
}

/// Per-request knobs that change how a metric is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricOptions {
    pub growth_basis: GrowthBasis,
}

fn to_value<T: Serialize>(report: Result<T>) -> Result<Value> {
    Ok(serde_json::to_value(report?)?)
}

/// Compute one metric over the dataset.
pub fn compute(metric: Metric, dataset: &Dataset, options: &MetricOptions) -> Result<Value> {
    match metric {
        Metric::KpiData => to_value(kpi::kpi_snapshot(dataset)),
        Metric::OverallSalesPerformance => to_value(revenue::overall_performance(dataset)),
        Metric::SalesByItemType => to_value(revenue::sales_by_item_type(dataset)),
        Metric::SupplierPerformance => to_value(revenue::supplier_performance(dataset)),
        Metric::SalesMix => to_value(revenue::sales_mix(dataset)),
        Metric::TopSellingItems => to_value(ranking::top_selling_items(dataset)),
        Metric::SalesTransferRatio => to_value(ratio::sales_transfer_ratio(dataset)),
        Metric::TransferEfficiency => to_value(ratio::transfer_efficiency(dataset)),
        Metric::MonthOverMonthGrowth => {
            to_value(growth::month_over_month_growth(dataset, options.growth_basis))
        }
        Metric::InventoryTurnoverRate => to_value(turnover::inventory_turnover_rate(dataset)),
        Metric::InventoryMovement => to_value(turnover::inventory_movement(dataset)),
        Metric::SalesPerSupplier => to_value(ranking::sales_per_supplier(dataset)),
        Metric::TopItemsByTransfers => to_value(ranking::top_items_by_transfers(dataset)),
        Metric::SalesSeasonality => to_value(trends::sales_seasonality(dataset)),
        Metric::MonthlyRetailSales => {
            to_value(trends::monthly_series(dataset, Measure::RetailSales))
        }
        Metric::MonthlyWarehouseSales => {
            to_value(trends::monthly_series(dataset, Measure::WarehouseSales))
        }
        Metric::MonthlyTransfers => {
            to_value(trends::monthly_series(dataset, Measure::RetailTransfers))
        }
        Metric::MonthlyTotalVolume => {
            to_value(trends::monthly_series(dataset, Measure::TotalVolume))
        }
        Metric::YearlySalesTrend => to_value(trends::yearly_sales_trend(dataset)),
        Metric::SeasonalAnalysis => to_value(trends::seasonal_analysis(dataset)),
        Metric::ItemTypeTrends => to_value(trends::item_type_trends(dataset)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Build the envelope for a failed metric. Expected outcomes (no data,
    /// empty result) pass their message through untouched and never carry
    /// details.
    pub fn from_error(metric: Metric, err: &DashboardError, debug_errors: bool) -> Self {
        if err.is_expected() {
            return Self::new(err.to_string());
        }
        Self {
            error: format!("Error calculating {}: {}", metric.title(), err),
            details: debug_errors.then(|| format!("{:?}", err)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricResponse {
    Success(Value),
    Failure(ErrorBody),
}

impl MetricResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, MetricResponse::Failure(_))
    }

    pub fn into_value(self) -> Value {
        match self {
            MetricResponse::Success(value) => value,
            MetricResponse::Failure(body) => serde_json::to_value(&body)
                .unwrap_or_else(|_| serde_json::json!({ "error": body.error })),
        }
    }
}

/// [`compute`] plus error envelope and logging.
pub fn respond(
    metric: Metric,
    dataset: &Dataset,
    options: &MetricOptions,
    debug_errors: bool,
) -> MetricResponse {
    let started = Instant::now();
    match compute(metric, dataset, options) {
        Ok(value) => {
            debug!(
                metric = metric.slug(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "metric computed"
            );
            MetricResponse::Success(value)
        }
        Err(err) => {
            if err.is_expected() {
                debug!(metric = metric.slug(), "{}", err);
            } else {
                warn!(metric = metric.slug(), error = %err, "metric failed");
            }
            MetricResponse::Failure(ErrorBody::from_error(metric, &err, debug_errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_slug(metric.slug()), Some(metric));
        }
        assert_eq!(Metric::from_slug("profit_margin"), None);
    }

    #[test]
    fn test_empty_dataset_envelope() {
        let dataset = Dataset::empty();
        for metric in Metric::ALL {
            let response = respond(metric, &dataset, &MetricOptions::default(), true);
            assert!(response.is_error(), "{} should fail", metric.slug());
            assert_eq!(
                response.into_value(),
                serde_json::json!({ "error": "No data available" })
            );
        }
    }

    #[test]
    fn test_unexpected_errors_are_prefixed() {
        let err = DashboardError::Computation("column mismatch".to_string());
        let body = ErrorBody::from_error(Metric::SalesMix, &err, false);
        assert_eq!(
            body.error,
            "Error calculating sales mix: Computation error: column mismatch"
        );
        assert!(body.details.is_none());

        let body = ErrorBody::from_error(Metric::SalesMix, &err, true);
        assert!(body.details.unwrap().contains("Computation"));
    }
}
