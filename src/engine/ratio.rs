//! Sales versus transfers.

use super::bands::{TRANSFER_EFFICIENCY, TRANSFER_RATIO};
use super::primitives::{
    ensure_data, group_sum, period_totals, share, sort_descending, zero_safe_ratio,
};
use crate::dataset::{Dataset, Dimension, Measure};
use crate::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SalesTransferRatio {
    pub item_types: Vec<String>,
    pub retail_sales: Vec<f64>,
    pub retail_transfers: Vec<f64>,
    pub transfer_ratios: Vec<f64>,
    pub efficiency_categories: Vec<&'static str>,
}

/// Retail sales over retail transfers per item type, highest ratio first.
pub fn sales_transfer_ratio(dataset: &Dataset) -> Result<SalesTransferRatio> {
    ensure_data(dataset)?;

    let groups = group_sum(
        dataset,
        &[Dimension::ItemType],
        &[Measure::RetailSales, Measure::RetailTransfers],
    )?;
    let mut rows: Vec<(String, f64, f64, f64)> = groups
        .iter()
        .map(|g| {
            let (sales, transfers) = (g.value(0), g.value(1));
            (g.text(0).to_string(), sales, transfers, zero_safe_ratio(sales, transfers))
        })
        .collect();
    sort_descending(&mut rows, |row| row.3);

    Ok(SalesTransferRatio {
        item_types: rows.iter().map(|r| r.0.clone()).collect(),
        retail_sales: rows.iter().map(|r| r.1).collect(),
        retail_transfers: rows.iter().map(|r| r.2).collect(),
        transfer_ratios: rows.iter().map(|r| r.3).collect(),
        efficiency_categories: rows.iter().map(|r| TRANSFER_RATIO.label(r.3)).collect(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferEfficiency {
    pub overall_transfer_ratio: f64,
    pub total_retail_sales: f64,
    pub total_retail_transfers: f64,
    pub total_retail_activity: f64,
    pub monthly_periods: Vec<String>,
    pub monthly_ratios: Vec<f64>,
    pub monthly_retail_sales: Vec<f64>,
    pub monthly_retail_transfers: Vec<f64>,
    pub efficiency_levels: Vec<&'static str>,
    pub efficiency_rating: &'static str,
    pub trend: &'static str,
}

/// Transfers as a share of retail activity (sales plus transfers), overall
/// and per month.
pub fn transfer_efficiency(dataset: &Dataset) -> Result<TransferEfficiency> {
    ensure_data(dataset)?;

    let total_sales = dataset.total(Measure::RetailSales)?;
    let total_transfers = dataset.total(Measure::RetailTransfers)?;
    let total_activity = total_sales + total_transfers;
    let overall = share(total_transfers, total_activity);

    let monthly = period_totals(dataset, &[Measure::RetailSales, Measure::RetailTransfers])?;
    let ratios: Vec<f64> = monthly
        .iter()
        .map(|t| share(t.value(1), t.value(0) + t.value(1)))
        .collect();

    let trend = match (ratios.first(), ratios.last()) {
        (Some(first), Some(last)) if ratios.len() > 1 && last > first => "Increasing",
        _ => "Decreasing",
    };

    Ok(TransferEfficiency {
        overall_transfer_ratio: overall,
        total_retail_sales: total_sales,
        total_retail_transfers: total_transfers,
        total_retail_activity: total_activity,
        monthly_periods: monthly.iter().map(|t| t.period.label()).collect(),
        monthly_retail_sales: monthly.iter().map(|t| t.value(0)).collect(),
        monthly_retail_transfers: monthly.iter().map(|t| t.value(1)).collect(),
        efficiency_levels: ratios.iter().map(|r| TRANSFER_EFFICIENCY.label(*r)).collect(),
        monthly_ratios: ratios,
        efficiency_rating: TRANSFER_EFFICIENCY.label(overall),
        trend,
    })
}
