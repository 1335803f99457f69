//! Time series and seasonality for the trend charts.

use super::bands::SEASONAL_PERFORMANCE;
use super::primitives::{
    ensure_data, first_max_index, first_min_index, group_reduce, group_sum, mean,
    percent_change, period_totals, share, Aggregate,
};
use crate::dataset::{Dataset, Dimension, Measure, Period};
use crate::error::Result;
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct MonthlySeries {
    pub name: &'static str,
    pub periods: Vec<String>,
    pub values: Vec<f64>,
    pub total: f64,
}

/// One measure summed per period, oldest first.
pub fn monthly_series(dataset: &Dataset, measure: Measure) -> Result<MonthlySeries> {
    ensure_data(dataset)?;

    let totals = period_totals(dataset, &[measure])?;
    let values: Vec<f64> = totals.iter().map(|t| t.value(0)).collect();
    Ok(MonthlySeries {
        name: measure.label(),
        periods: totals.iter().map(|t| t.period.label()).collect(),
        total: values.iter().sum(),
        values,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct YearlyTrend {
    pub years: Vec<i32>,
    pub retail_sales: Vec<f64>,
}

pub fn yearly_sales_trend(dataset: &Dataset) -> Result<YearlyTrend> {
    ensure_data(dataset)?;

    let mut groups = group_sum(dataset, &[Dimension::Year], &[Measure::RetailSales])?;
    groups.sort_by_key(|g| g.int(0));
    Ok(YearlyTrend {
        years: groups.iter().map(|g| g.int(0)).collect(),
        retail_sales: groups.iter().map(|g| g.value(0)).collect(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonalPattern {
    pub months: Vec<i32>,
    pub average_sales: Vec<f64>,
    pub max_sales: Vec<f64>,
    pub transactions: Vec<usize>,
    pub peak_month: Option<i32>,
}

/// Per-row retail sales statistics for each calendar month, pooled across
/// years.
pub fn seasonal_analysis(dataset: &Dataset) -> Result<SeasonalPattern> {
    ensure_data(dataset)?;

    let mut groups = group_reduce(
        dataset,
        &[Dimension::Month],
        &[
            Aggregate::mean(Measure::RetailSales),
            Aggregate::max(Measure::RetailSales),
            Aggregate::count(Measure::RetailSales),
        ],
    )?;
    groups.sort_by_key(|g| g.int(0));

    let averages: Vec<f64> = groups.iter().map(|g| g.value(0)).collect();
    Ok(SeasonalPattern {
        months: groups.iter().map(|g| g.int(0)).collect(),
        max_sales: groups.iter().map(|g| g.value(1)).collect(),
        transactions: groups.iter().map(|g| g.value(2) as usize).collect(),
        peak_month: first_max_index(&averages).map(|i| groups[i].int(0)),
        average_sales: averages,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemTypeSeries {
    pub item_type: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemTypeTrends {
    pub periods: Vec<String>,
    pub series: Vec<ItemTypeSeries>,
}

/// Retail sales per (period, item type). Periods with no sales for a type
/// read as 0 so every series lines up with `periods`.
pub fn item_type_trends(dataset: &Dataset) -> Result<ItemTypeTrends> {
    ensure_data(dataset)?;

    let periods = dataset.periods()?;
    let groups = group_sum(
        dataset,
        &[Dimension::Year, Dimension::Month, Dimension::ItemType],
        &[Measure::RetailSales],
    )?;

    let mut cells: HashMap<(Period, &str), f64> = HashMap::with_capacity(groups.len());
    for group in &groups {
        cells.insert((group.period(0), group.text(2)), group.value(0));
    }

    let series = groups
        .iter()
        .map(|g| g.text(2))
        .sorted()
        .dedup()
        .map(|item_type| ItemTypeSeries {
            item_type: item_type.to_string(),
            values: periods
                .iter()
                .map(|p| cells.get(&(*p, item_type)).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect();

    Ok(ItemTypeTrends {
        periods: periods.iter().map(|p| p.label()).collect(),
        series,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelContribution {
    pub channel: &'static str,
    pub total: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesSeasonality {
    pub periods: Vec<String>,
    pub retail_sales: Vec<f64>,
    pub retail_transfers: Vec<f64>,
    pub warehouse_sales: Vec<f64>,
    pub total_sales: Vec<f64>,
    pub average_monthly_sales: f64,
    pub peak_period: String,
    pub peak_sales: f64,
    pub valley_period: String,
    pub valley_sales: f64,
    pub seasonality_index: f64,
    pub seasonal_performance: &'static str,
    pub trend: &'static str,
    pub year_over_year_growth: f64,
    pub channel_contributions: Vec<ChannelContribution>,
    pub months_analyzed: usize,
}

pub fn sales_seasonality(dataset: &Dataset) -> Result<SalesSeasonality> {
    ensure_data(dataset)?;

    let monthly = period_totals(dataset, &Measure::STREAMS)?;
    let totals: Vec<f64> = monthly.iter().map(|t| t.values.iter().sum()).collect();
    let average = mean(&totals);

    let label_at = |index: Option<usize>| {
        index
            .map(|i| (monthly[i].period.label(), totals[i]))
            .unwrap_or_else(|| ("N/A".to_string(), 0.0))
    };
    let (peak_period, peak_sales) = label_at(first_max_index(&totals));
    let (valley_period, valley_sales) = label_at(first_min_index(&totals));

    let latest = totals.last().copied().unwrap_or(0.0);
    let trend = match totals.len() {
        0 | 1 => "Stable",
        n if latest > totals[n - 2] => "Upward",
        _ => "Downward",
    };

    let year_over_year_growth = match monthly.last() {
        Some(last) => {
            let target = last.period.year_earlier();
            monthly
                .iter()
                .position(|t| t.period == target)
                .map(|i| percent_change(latest, totals[i]))
                .unwrap_or(0.0)
        }
        None => 0.0,
    };

    let grand_total: f64 = totals.iter().sum();
    let channel_contributions = Measure::STREAMS
        .iter()
        .enumerate()
        .map(|(i, measure)| {
            let total: f64 = monthly.iter().map(|t| t.value(i)).sum();
            ChannelContribution {
                channel: measure.label(),
                total,
                percentage: share(total, grand_total),
            }
        })
        .collect();

    Ok(SalesSeasonality {
        periods: monthly.iter().map(|t| t.period.label()).collect(),
        retail_sales: monthly.iter().map(|t| t.value(0)).collect(),
        retail_transfers: monthly.iter().map(|t| t.value(1)).collect(),
        warehouse_sales: monthly.iter().map(|t| t.value(2)).collect(),
        average_monthly_sales: average,
        seasonality_index: share(peak_sales - valley_sales, average),
        seasonal_performance: SEASONAL_PERFORMANCE.label(share(latest, average)),
        peak_period,
        peak_sales,
        valley_period,
        valley_sales,
        trend,
        year_over_year_growth,
        channel_contributions,
        months_analyzed: monthly.len(),
        total_sales: totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Transaction;

    fn row(year: i32, month: i32, item_type: &str, retail: f64, warehouse: f64) -> Transaction {
        Transaction {
            year,
            month,
            supplier: "S".to_string(),
            item_code: "1".to_string(),
            item_description: "D".to_string(),
            item_type: item_type.to_string(),
            retail_sales: retail,
            retail_transfers: 0.0,
            warehouse_sales: warehouse,
        }
    }

    fn two_years() -> Dataset {
        Dataset::from_transactions(&[
            row(2024, 3, "WINE", 100.0, 0.0),
            row(2023, 3, "BEER", 50.0, 0.0),
            row(2024, 2, "BEER", 20.0, 10.0),
            row(2024, 3, "BEER", 20.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_monthly_series_is_chronological() {
        let series = monthly_series(&two_years(), Measure::TotalVolume).unwrap();
        assert_eq!(series.periods, vec!["2023-03", "2024-02", "2024-03"]);
        assert_eq!(series.values, vec![50.0, 30.0, 120.0]);
        assert_eq!(series.total, 200.0);
        assert_eq!(series.name, "Total Volume");
    }

    #[test]
    fn test_yearly_and_seasonal() {
        let yearly = yearly_sales_trend(&two_years()).unwrap();
        assert_eq!(yearly.years, vec![2023, 2024]);
        assert_eq!(yearly.retail_sales, vec![50.0, 140.0]);

        let seasonal = seasonal_analysis(&two_years()).unwrap();
        assert_eq!(seasonal.months, vec![2, 3]);
        assert_eq!(seasonal.transactions, vec![1, 3]);
        assert_eq!(seasonal.max_sales, vec![20.0, 100.0]);
        assert_eq!(seasonal.peak_month, Some(3));
    }

    #[test]
    fn test_item_type_trends_fill_gaps() {
        let trends = item_type_trends(&two_years()).unwrap();
        assert_eq!(trends.periods, vec!["2023-03", "2024-02", "2024-03"]);
        assert_eq!(trends.series[0].item_type, "BEER");
        assert_eq!(trends.series[0].values, vec![50.0, 20.0, 20.0]);
        assert_eq!(trends.series[1].item_type, "WINE");
        assert_eq!(trends.series[1].values, vec![0.0, 0.0, 100.0]);
    }

    #[test]
    fn test_seasonality_summary() {
        let report = sales_seasonality(&two_years()).unwrap();
        assert_eq!(report.total_sales, vec![50.0, 30.0, 120.0]);
        assert_eq!(report.average_monthly_sales, 200.0 / 3.0);
        assert_eq!(report.peak_period, "2024-03");
        assert_eq!(report.valley_period, "2024-02");
        assert_eq!(report.trend, "Upward");
        assert_eq!(report.seasonal_performance, "Peak Season");
        assert_eq!(report.year_over_year_growth, 140.0);
        assert_eq!(report.months_analyzed, 3);
        assert_eq!(report.channel_contributions[2].total, 10.0);
    }

    #[test]
    fn test_seasonality_single_period_is_stable() {
        let dataset = Dataset::from_transactions(&[row(2024, 1, "WINE", 5.0, 5.0)]).unwrap();
        let report = sales_seasonality(&dataset).unwrap();
        assert_eq!(report.trend, "Stable");
        assert_eq!(report.year_over_year_growth, 0.0);
        assert_eq!(report.seasonality_index, 0.0);
        assert_eq!(report.seasonal_performance, "Normal Season");
    }
}
