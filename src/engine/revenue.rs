//! Revenue mix across streams and item types.

use super::bands::CONTRIBUTION;
use super::primitives::{ensure_data, group_sum, share, sort_descending};
use crate::dataset::{Dataset, Dimension, Measure};
use crate::error::Result;
use serde::Serialize;

const SUPPLIER_CHART_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct RevenueStream {
    pub name: &'static str,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueSummary {
    pub total_retail_sales: f64,
    pub total_retail_transfers: f64,
    pub total_warehouse_sales: f64,
    pub grand_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallPerformance {
    pub revenue_streams: Vec<&'static str>,
    pub total_amounts: Vec<f64>,
    pub percentages: Vec<f64>,
    pub grand_total: f64,
    pub streams: Vec<RevenueStream>,
    pub summary: RevenueSummary,
}

/// Totals for retail sales, retail transfers and warehouse sales, always in
/// that order, with each stream's share of the grand total.
pub fn overall_performance(dataset: &Dataset) -> Result<OverallPerformance> {
    ensure_data(dataset)?;

    let mut amounts = Vec::with_capacity(Measure::STREAMS.len());
    for measure in Measure::STREAMS {
        amounts.push(dataset.total(measure)?);
    }
    let grand_total: f64 = amounts.iter().sum();

    let streams: Vec<RevenueStream> = Measure::STREAMS
        .iter()
        .zip(&amounts)
        .map(|(measure, amount)| RevenueStream {
            name: measure.label(),
            amount: *amount,
            percentage: share(*amount, grand_total),
        })
        .collect();

    Ok(OverallPerformance {
        revenue_streams: streams.iter().map(|s| s.name).collect(),
        total_amounts: amounts.clone(),
        percentages: streams.iter().map(|s| s.percentage).collect(),
        grand_total,
        summary: RevenueSummary {
            total_retail_sales: amounts[0],
            total_retail_transfers: amounts[1],
            total_warehouse_sales: amounts[2],
            grand_total,
        },
        streams,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemTypeSales {
    pub item_types: Vec<String>,
    pub retail_sales: Vec<f64>,
    pub retail_transfers: Vec<f64>,
    pub warehouse_sales: Vec<f64>,
    pub total_sales: Vec<f64>,
}

pub fn sales_by_item_type(dataset: &Dataset) -> Result<ItemTypeSales> {
    ensure_data(dataset)?;

    let mut groups = group_sum(dataset, &[Dimension::ItemType], &Measure::STREAMS)?;
    sort_descending(&mut groups, |g| g.values.iter().sum());

    Ok(ItemTypeSales {
        item_types: groups.iter().map(|g| g.text(0).to_string()).collect(),
        retail_sales: groups.iter().map(|g| g.value(0)).collect(),
        retail_transfers: groups.iter().map(|g| g.value(1)).collect(),
        warehouse_sales: groups.iter().map(|g| g.value(2)).collect(),
        total_sales: groups.iter().map(|g| g.values.iter().sum()).collect(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierPerformance {
    pub suppliers: Vec<String>,
    pub retail_sales: Vec<f64>,
    pub warehouse_sales: Vec<f64>,
    pub total_suppliers: usize,
}

/// Retail and warehouse sales for the first suppliers in name order.
pub fn supplier_performance(dataset: &Dataset) -> Result<SupplierPerformance> {
    ensure_data(dataset)?;

    let measures = [Measure::RetailSales, Measure::WarehouseSales];
    let mut groups = group_sum(dataset, &[Dimension::Supplier], &measures)?;
    let total_suppliers = groups.len();
    groups.sort_by(|a, b| a.text(0).cmp(b.text(0)));
    groups.truncate(SUPPLIER_CHART_LIMIT);

    Ok(SupplierPerformance {
        suppliers: groups.iter().map(|g| g.text(0).to_string()).collect(),
        retail_sales: groups.iter().map(|g| g.value(0)).collect(),
        warehouse_sales: groups.iter().map(|g| g.value(1)).collect(),
        total_suppliers,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesMix {
    pub item_types: Vec<String>,
    pub retail_sales: Vec<f64>,
    pub percentages: Vec<f64>,
    pub categories: Vec<&'static str>,
    pub total_retail_sales: f64,
    pub top_contributor: String,
    pub top_percentage: f64,
}

/// Retail sales per item type, largest first, each tagged with its
/// contribution class.
pub fn sales_mix(dataset: &Dataset) -> Result<SalesMix> {
    ensure_data(dataset)?;

    let mut groups = group_sum(dataset, &[Dimension::ItemType], &[Measure::RetailSales])?;
    sort_descending(&mut groups, |g| g.value(0));

    let total: f64 = groups.iter().map(|g| g.value(0)).sum();
    let percentages: Vec<f64> = groups.iter().map(|g| share(g.value(0), total)).collect();

    Ok(SalesMix {
        item_types: groups.iter().map(|g| g.text(0).to_string()).collect(),
        retail_sales: groups.iter().map(|g| g.value(0)).collect(),
        categories: percentages.iter().map(|p| CONTRIBUTION.label(*p)).collect(),
        total_retail_sales: total,
        top_contributor: groups
            .first()
            .map(|g| g.text(0).to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        top_percentage: percentages.first().copied().unwrap_or(0.0),
        percentages,
    })
}
