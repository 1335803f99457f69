//! Item and supplier rankings.
//!
//! Chart-facing lists (`top_selling_items`, `top_items_by_transfers`) are
//! emitted in reversed rank order so horizontal bar charts draw rank 1 on
//! top; every record still carries its 1-based rank.

use super::bands::{LOGISTICS, PARTNERSHIP, PERFORMANCE_TIER, SUPPLIER_DIVERSITY};
use super::primitives::{
    ensure_data, group_sum, share, sort_descending, truncate_label, truncate_text, Group,
};
use crate::dataset::{Dataset, Dimension, Measure};
use crate::error::{DashboardError, Result};
use serde::Serialize;

pub const TOP_SELLING_LIMIT: usize = 10;
pub const TOP_TRANSFER_LIMIT: usize = 15;

const SELLING_LABEL_WIDTH: usize = 25;
const TRANSFER_LABEL_WIDTH: usize = 20;
const SUPPLIER_NAME_WIDTH: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct RankedItem {
    pub rank: usize,
    pub item_code: String,
    pub item_description: String,
    pub display_label: String,
    pub retail_sales: f64,
    pub performance_tier: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopSellingItems {
    pub items: Vec<RankedItem>,
    pub item_codes: Vec<String>,
    pub display_labels: Vec<String>,
    pub item_descriptions: Vec<String>,
    pub retail_sales: Vec<f64>,
    pub ranks: Vec<usize>,
    pub performance_tiers: Vec<&'static str>,
    pub top_10_total: f64,
    pub top_10_percentage: f64,
    pub total_retail_sales: f64,
    pub best_item: String,
    pub best_sales: f64,
}

/// Keep groups whose value at `index` is strictly positive, ranked
/// descending with ties in first-occurrence order.
fn ranked_positive(mut groups: Vec<Group>, index: usize) -> Vec<Group> {
    groups.retain(|g| g.value(index) > 0.0);
    sort_descending(&mut groups, |g| g.value(index));
    groups
}

pub fn top_selling_items(dataset: &Dataset) -> Result<TopSellingItems> {
    ensure_data(dataset)?;

    let groups = group_sum(
        dataset,
        &[Dimension::ItemCode, Dimension::ItemDescription],
        &[Measure::RetailSales],
    )?;
    let mut ranked = ranked_positive(groups, 0);
    if ranked.is_empty() {
        return Err(DashboardError::EmptyResult(
            "No items with sales data found".to_string(),
        ));
    }
    ranked.truncate(TOP_SELLING_LIMIT);

    let mut items: Vec<RankedItem> = ranked
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let rank = i + 1;
            RankedItem {
                rank,
                item_code: g.text(0).to_string(),
                item_description: g.text(1).to_string(),
                display_label: truncate_label(g.text(0), g.text(1), SELLING_LABEL_WIDTH),
                retail_sales: g.value(0),
                performance_tier: PERFORMANCE_TIER.label(rank as f64),
            }
        })
        .collect();

    let total_retail_sales = dataset.total(Measure::RetailSales)?;
    let top_10_total: f64 = items.iter().map(|item| item.retail_sales).sum();
    let best_item = items[0].item_code.clone();
    let best_sales = items[0].retail_sales;

    items.reverse();

    Ok(TopSellingItems {
        item_codes: items.iter().map(|i| i.item_code.clone()).collect(),
        display_labels: items.iter().map(|i| i.display_label.clone()).collect(),
        item_descriptions: items.iter().map(|i| i.item_description.clone()).collect(),
        retail_sales: items.iter().map(|i| i.retail_sales).collect(),
        ranks: items.iter().map(|i| i.rank).collect(),
        performance_tiers: items.iter().map(|i| i.performance_tier).collect(),
        items,
        top_10_total,
        top_10_percentage: share(top_10_total, total_retail_sales),
        total_retail_sales,
        best_item,
        best_sales,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierShare {
    pub rank: usize,
    pub supplier: String,
    pub display_name: String,
    pub retail_sales: f64,
    pub market_share: f64,
    pub partnership_tier: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierCount {
    pub tier: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierRanking {
    pub suppliers: Vec<SupplierShare>,
    pub total_sales: f64,
    pub total_suppliers: usize,
    pub average_sales_per_supplier: f64,
    pub top_5_contribution: f64,
    pub top_5_percentage: f64,
    pub top_5_suppliers: Vec<String>,
    pub top_10_market_share: f64,
    pub major_partners: usize,
    pub key_partners: usize,
    pub tier_counts: Vec<TierCount>,
    pub supplier_diversity: &'static str,
    pub best_supplier: String,
    pub best_supplier_sales: f64,
    pub best_supplier_share: f64,
}

pub fn sales_per_supplier(dataset: &Dataset) -> Result<SupplierRanking> {
    ensure_data(dataset)?;

    let groups = group_sum(dataset, &[Dimension::Supplier], &[Measure::RetailSales])?;
    let ranked = ranked_positive(groups, 0);
    if ranked.is_empty() {
        return Err(DashboardError::EmptyResult(
            "No suppliers with sales data found".to_string(),
        ));
    }

    let total_sales: f64 = ranked.iter().map(|g| g.value(0)).sum();
    let suppliers: Vec<SupplierShare> = ranked
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let market_share = share(g.value(0), total_sales);
            let band = PARTNERSHIP.classify(market_share);
            SupplierShare {
                rank: i + 1,
                supplier: g.text(0).to_string(),
                display_name: truncate_text(g.text(0), SUPPLIER_NAME_WIDTH),
                retail_sales: g.value(0),
                market_share,
                partnership_tier: band.label,
                color: PARTNERSHIP.color(market_share),
            }
        })
        .collect();

    let count_tier = |tier: &str| {
        suppliers
            .iter()
            .filter(|s| s.partnership_tier == tier)
            .count()
    };
    let tier_counts: Vec<TierCount> = PARTNERSHIP
        .labels()
        .map(|tier| TierCount { tier, count: count_tier(tier) })
        .collect();

    let top_5: Vec<&SupplierShare> = suppliers.iter().take(5).collect();
    let top_5_contribution: f64 = top_5.iter().map(|s| s.retail_sales).sum();
    let top_10_market_share: f64 = suppliers.iter().take(10).map(|s| s.market_share).sum();
    let total_suppliers = suppliers.len();
    let best = &suppliers[0];

    Ok(SupplierRanking {
        total_sales,
        total_suppliers,
        average_sales_per_supplier: total_sales / total_suppliers as f64,
        top_5_percentage: top_5.iter().map(|s| s.market_share).sum(),
        top_5_suppliers: top_5.iter().map(|s| s.supplier.clone()).collect(),
        top_5_contribution,
        top_10_market_share,
        major_partners: count_tier("Major Partner"),
        key_partners: count_tier("Key Partner"),
        supplier_diversity: SUPPLIER_DIVERSITY.label(total_suppliers as f64),
        best_supplier: best.supplier.clone(),
        best_supplier_sales: best.retail_sales,
        best_supplier_share: best.market_share,
        tier_counts,
        suppliers,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferItem {
    pub rank: usize,
    pub item_code: String,
    pub item_description: String,
    pub item_type: String,
    pub display_label: String,
    pub retail_transfers: f64,
    pub retail_sales: f64,
    pub transfer_efficiency: f64,
    pub logistics_performance: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopTransferItems {
    pub items: Vec<TransferItem>,
    pub item_codes: Vec<String>,
    pub display_labels: Vec<String>,
    pub item_descriptions: Vec<String>,
    pub item_types: Vec<String>,
    pub retail_transfers: Vec<f64>,
    pub retail_sales: Vec<f64>,
    pub transfer_efficiencies: Vec<f64>,
    pub logistics_performances: Vec<&'static str>,
    pub total_retail_transfers: f64,
    pub top_15_transfers_total: f64,
    pub top_15_percentage: f64,
    pub top_transfer_item: String,
    pub top_transfer_amount: f64,
    pub transfer_focused_items: usize,
    pub total_transfer_items: usize,
    pub dominant_transfer_type: String,
}

pub fn top_items_by_transfers(dataset: &Dataset) -> Result<TopTransferItems> {
    ensure_data(dataset)?;

    let groups = group_sum(
        dataset,
        &[Dimension::ItemCode, Dimension::ItemDescription, Dimension::ItemType],
        &[Measure::RetailTransfers, Measure::RetailSales],
    )?;
    let mut ranked = ranked_positive(groups, 0);
    if ranked.is_empty() {
        return Err(DashboardError::EmptyResult(
            "No items with retail transfers found".to_string(),
        ));
    }
    let total_transfer_items = ranked.len();
    ranked.truncate(TOP_TRANSFER_LIMIT);

    let mut items: Vec<TransferItem> = ranked
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let transfers = g.value(0);
            let sales = g.value(1);
            let efficiency = share(transfers, sales + transfers);
            TransferItem {
                rank: i + 1,
                item_code: g.text(0).to_string(),
                item_description: g.text(1).to_string(),
                item_type: g.text(2).to_string(),
                display_label: truncate_label(g.text(0), g.text(1), TRANSFER_LABEL_WIDTH),
                retail_transfers: transfers,
                retail_sales: sales,
                transfer_efficiency: efficiency,
                logistics_performance: LOGISTICS.label(efficiency),
            }
        })
        .collect();

    // Summed transfers per item type within the top list; first type wins ties
    let mut by_type: Vec<(String, f64)> = Vec::new();
    for item in &items {
        match by_type.iter_mut().find(|(t, _)| *t == item.item_type) {
            Some(entry) => entry.1 += item.retail_transfers,
            None => by_type.push((item.item_type.clone(), item.retail_transfers)),
        }
    }
    sort_descending(&mut by_type, |entry| entry.1);

    let total_retail_transfers = dataset.total(Measure::RetailTransfers)?;
    let top_15_transfers_total: f64 = items.iter().map(|i| i.retail_transfers).sum();
    let transfer_focused_items = items
        .iter()
        .filter(|i| LOGISTICS.reaches(i.transfer_efficiency, "Moderate Transfer Focus"))
        .count();
    let top_transfer_item = items[0].item_code.clone();
    let top_transfer_amount = items[0].retail_transfers;

    items.reverse();

    Ok(TopTransferItems {
        item_codes: items.iter().map(|i| i.item_code.clone()).collect(),
        display_labels: items.iter().map(|i| i.display_label.clone()).collect(),
        item_descriptions: items.iter().map(|i| i.item_description.clone()).collect(),
        item_types: items.iter().map(|i| i.item_type.clone()).collect(),
        retail_transfers: items.iter().map(|i| i.retail_transfers).collect(),
        retail_sales: items.iter().map(|i| i.retail_sales).collect(),
        transfer_efficiencies: items.iter().map(|i| i.transfer_efficiency).collect(),
        logistics_performances: items.iter().map(|i| i.logistics_performance).collect(),
        items,
        total_retail_transfers,
        top_15_transfers_total,
        top_15_percentage: share(top_15_transfers_total, total_retail_transfers),
        top_transfer_item,
        top_transfer_amount,
        transfer_focused_items,
        total_transfer_items,
        dominant_transfer_type: by_type
            .into_iter()
            .next()
            .map(|(t, _)| t)
            .unwrap_or_else(|| "N/A".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Transaction;

    fn item(code: &str, supplier: &str, sales: f64, transfers: f64) -> Transaction {
        Transaction {
            year: 2024,
            month: 1,
            supplier: supplier.to_string(),
            item_code: code.to_string(),
            item_description: format!("Description of {}", code),
            item_type: if code.starts_with('W') { "WINE" } else { "BEER" }.to_string(),
            retail_sales: sales,
            retail_transfers: transfers,
            warehouse_sales: 0.0,
        }
    }

    #[test]
    fn test_top_selling_drops_non_positive_and_caps_at_ten() {
        let mut rows: Vec<Transaction> = (0..12)
            .map(|i| item(&format!("B{:02}", i), "S", (i + 1) as f64, 0.0))
            .collect();
        rows.push(item("B99", "S", 0.0, 0.0));
        rows.push(item("B98", "S", -4.0, 0.0));
        let dataset = Dataset::from_transactions(&rows).unwrap();

        let report = top_selling_items(&dataset).unwrap();
        assert_eq!(report.items.len(), 10);
        assert_eq!(report.ranks, (1..=10).rev().collect::<Vec<_>>());
        assert_eq!(report.best_item, "B11");
        assert_eq!(report.best_sales, 12.0);
        assert_eq!(report.item_codes.last().unwrap(), "B11");
        assert_eq!(report.performance_tiers[9], "Star Performer");
        assert_eq!(report.performance_tiers[0], "Good Performer");
        assert_eq!(report.top_10_total, (3..=12).sum::<i32>() as f64);
    }

    #[test]
    fn test_top_selling_with_nothing_positive() {
        let dataset = Dataset::from_transactions(&[item("B1", "S", 0.0, 3.0)]).unwrap();
        match top_selling_items(&dataset) {
            Err(DashboardError::EmptyResult(message)) => {
                assert_eq!(message, "No items with sales data found")
            }
            other => panic!("unexpected: {:?}", other.map(|r| r.items.len())),
        }
    }

    #[test]
    fn test_supplier_tiers_and_concentration() {
        let dataset = Dataset::from_transactions(&[
            item("B1", "ALPHA", 60.0, 0.0),
            item("B2", "BETA", 25.0, 0.0),
            item("B3", "GAMMA", 10.0, 0.0),
            item("B4", "A VERY LONG SUPPLIER NAME LLC", 5.0, 0.0),
            item("B5", "NOTHING", 0.0, 0.0),
        ])
        .unwrap();

        let report = sales_per_supplier(&dataset).unwrap();
        assert_eq!(report.total_suppliers, 4);
        assert_eq!(report.total_sales, 100.0);
        assert_eq!(report.major_partners, 2);
        assert_eq!(report.key_partners, 1);
        assert_eq!(report.best_supplier, "ALPHA");
        assert_eq!(report.suppliers[3].display_name, "A VERY LONG SUPPLIER...");
        assert_eq!(report.suppliers[3].partnership_tier, "Important Partner");
        assert_eq!(report.supplier_diversity, "Low");
        assert!((report.top_5_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_transfer_ranking_dominant_type() {
        let dataset = Dataset::from_transactions(&[
            item("W1", "S", 10.0, 30.0),
            item("B1", "S", 90.0, 10.0),
            item("B2", "S", 10.0, 10.0),
            item("W2", "S", 10.0, 0.0),
        ])
        .unwrap();

        let report = top_items_by_transfers(&dataset).unwrap();
        assert_eq!(report.total_transfer_items, 3);
        assert_eq!(report.top_transfer_item, "W1");
        // WINE 30 vs BEER 20
        assert_eq!(report.dominant_transfer_type, "WINE");
        assert_eq!(report.item_codes, vec!["B2", "B1", "W1"]);
        assert_eq!(report.logistics_performances[2], "High Transfer Focus");
        assert_eq!(report.logistics_performances[1], "Sales Focus");
        assert_eq!(report.transfer_focused_items, 2);
        assert!((report.top_15_percentage - 100.0).abs() < 1e-9);
    }
}
