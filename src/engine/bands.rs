//! Threshold ladders
//!
//! Every categorical label the dashboard shows (contribution class, partner
//! tier, growth band, ...) comes from a [`Ladder`]: an ordered list of bands
//! evaluated top-down, where the first band whose bound admits the value wins.
//! Each ladder ends with a catch-all band, so classification is total.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Exactly(f64),
    Above(f64),
    AtLeast(f64),
    AtMost(f64),
    Any,
}

impl Bound {
    pub fn admits(self, value: f64) -> bool {
        match self {
            Bound::Exactly(x) => value == x,
            Bound::Above(x) => value > x,
            Bound::AtLeast(x) => value >= x,
            Bound::AtMost(x) => value <= x,
            Bound::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub bound: Bound,
    pub label: &'static str,
    pub color: Option<&'static str>,
}

static UNCLASSIFIED: Band = Band {
    bound: Bound::Any,
    label: "Unclassified",
    color: None,
};

#[derive(Debug, Clone, Copy)]
pub struct Ladder {
    bands: &'static [Band],
}

impl Ladder {
    pub const fn new(bands: &'static [Band]) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &'static [Band] {
        self.bands
    }

    pub fn classify(&self, value: f64) -> &'static Band {
        let bands = self.bands;
        bands
            .iter()
            .find(|band| band.bound.admits(value))
            .or(bands.last())
            .unwrap_or(&UNCLASSIFIED)
    }

    pub fn label(&self, value: f64) -> &'static str {
        self.classify(value).label
    }

    pub fn color(&self, value: f64) -> &'static str {
        self.classify(value).color.unwrap_or("#9E9E9E")
    }

    /// Index of the band a value falls in; 0 is the top of the ladder.
    pub fn position(&self, value: f64) -> usize {
        let bands = self.bands;
        bands
            .iter()
            .position(|band| band.bound.admits(value))
            .unwrap_or(bands.len().saturating_sub(1))
    }

    pub fn position_of(&self, label: &str) -> Option<usize> {
        self.bands.iter().position(|band| band.label == label)
    }

    /// True when `value` lands in the band named `label` or any band above it.
    pub fn reaches(&self, value: f64, label: &str) -> bool {
        match self.position_of(label) {
            Some(limit) => self.position(value) <= limit,
            None => false,
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.bands.iter().map(|band| band.label)
    }
}

/// Share of total retail sales held by an item type.
pub const CONTRIBUTION: Ladder = Ladder::new(&[
    Band { bound: Bound::AtLeast(10.0), label: "Major Contributor", color: None },
    Band { bound: Bound::AtLeast(5.0), label: "Moderate Contributor", color: None },
    Band { bound: Bound::Any, label: "Minor Contributor", color: None },
]);

/// Rank of an item within the top-selling list.
pub const PERFORMANCE_TIER: Ladder = Ladder::new(&[
    Band { bound: Bound::AtMost(3.0), label: "Star Performer", color: None },
    Band { bound: Bound::AtMost(6.0), label: "Strong Performer", color: None },
    Band { bound: Bound::Any, label: "Good Performer", color: None },
]);

/// Retail sales divided by retail transfers.
pub const TRANSFER_RATIO: Ladder = Ladder::new(&[
    Band { bound: Bound::Exactly(0.0), label: "No Transfers", color: None },
    Band { bound: Bound::Above(1.2), label: "High Sales/Low Transfers", color: None },
    Band { bound: Bound::AtLeast(0.8), label: "Efficient", color: None },
    Band { bound: Bound::Any, label: "Low Sales/High Transfers", color: None },
]);

/// Transfers as a percentage of total retail activity, per month.
pub const TRANSFER_EFFICIENCY: Ladder = Ladder::new(&[
    Band { bound: Bound::AtLeast(25.0), label: "High Efficiency", color: None },
    Band { bound: Bound::AtLeast(15.0), label: "Moderate Efficiency", color: None },
    Band { bound: Bound::AtLeast(5.0), label: "Low Efficiency", color: None },
    Band { bound: Bound::Any, label: "Very Low Efficiency", color: None },
]);

/// Month-over-month growth percentage.
pub const GROWTH: Ladder = Ladder::new(&[
    Band { bound: Bound::Above(10.0), label: "High Growth", color: None },
    Band { bound: Bound::AtLeast(5.0), label: "Moderate Growth", color: None },
    Band { bound: Bound::AtLeast(-5.0), label: "Stable", color: None },
    Band { bound: Bound::AtLeast(-10.0), label: "Moderate Decline", color: None },
    Band { bound: Bound::Any, label: "Significant Decline", color: None },
]);

/// Retail sales divided by warehouse sales.
pub const TURNOVER: Ladder = Ladder::new(&[
    Band { bound: Bound::AtLeast(5.0), label: "Excellent", color: Some("#4CAF50") },
    Band { bound: Bound::AtLeast(3.0), label: "Good", color: Some("#8BC34A") },
    Band { bound: Bound::AtLeast(1.5), label: "Average", color: Some("#FFC107") },
    Band { bound: Bound::AtLeast(0.5), label: "Poor", color: Some("#FF9800") },
    Band { bound: Bound::Any, label: "Critical", color: Some("#F44336") },
]);

/// Average monthly movement (all streams) per item type.
pub const MOVEMENT: Ladder = Ladder::new(&[
    Band { bound: Bound::AtLeast(50_000.0), label: "High Turnover", color: None },
    Band { bound: Bound::AtLeast(20_000.0), label: "Moderate Turnover", color: None },
    Band { bound: Bound::AtLeast(5_000.0), label: "Low Turnover", color: None },
    Band { bound: Bound::Any, label: "Very Low Turnover", color: None },
]);

/// Supplier market share.
pub const PARTNERSHIP: Ladder = Ladder::new(&[
    Band { bound: Bound::AtLeast(20.0), label: "Major Partner", color: Some("#1976D2") },
    Band { bound: Bound::AtLeast(10.0), label: "Key Partner", color: Some("#2196F3") },
    Band { bound: Bound::AtLeast(5.0), label: "Important Partner", color: Some("#4CAF50") },
    Band { bound: Bound::AtLeast(1.0), label: "Regular Partner", color: Some("#FF9800") },
    Band { bound: Bound::Any, label: "Minor Partner", color: Some("#9E9E9E") },
]);

/// Number of suppliers with positive sales.
pub const SUPPLIER_DIVERSITY: Ladder = Ladder::new(&[
    Band { bound: Bound::AtLeast(20.0), label: "High", color: None },
    Band { bound: Bound::AtLeast(10.0), label: "Moderate", color: None },
    Band { bound: Bound::Any, label: "Low", color: None },
]);

/// Transfers as a percentage of an item's retail activity.
pub const LOGISTICS: Ladder = Ladder::new(&[
    Band { bound: Bound::AtLeast(50.0), label: "High Transfer Focus", color: None },
    Band { bound: Bound::AtLeast(30.0), label: "Moderate Transfer Focus", color: None },
    Band { bound: Bound::AtLeast(15.0), label: "Balanced Distribution", color: None },
    Band { bound: Bound::AtLeast(5.0), label: "Sales Focus", color: None },
    Band { bound: Bound::Any, label: "Minimal Transfers", color: None },
]);

/// Latest month's total as a percentage of the monthly average.
pub const SEASONAL_PERFORMANCE: Ladder = Ladder::new(&[
    Band { bound: Bound::AtLeast(110.0), label: "Peak Season", color: None },
    Band { bound: Bound::AtLeast(90.0), label: "Normal Season", color: None },
    Band { bound: Bound::Any, label: "Low Season", color: None },
]);

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ladder; 11] = [
        CONTRIBUTION,
        PERFORMANCE_TIER,
        TRANSFER_RATIO,
        TRANSFER_EFFICIENCY,
        GROWTH,
        TURNOVER,
        MOVEMENT,
        PARTNERSHIP,
        SUPPLIER_DIVERSITY,
        LOGISTICS,
        SEASONAL_PERFORMANCE,
    ];

    #[test]
    fn test_every_ladder_ends_with_catch_all() {
        for ladder in ALL {
            let last = ladder.bands().last().unwrap();
            assert_eq!(last.bound, Bound::Any);
            // NaN and infinities still land somewhere
            assert_eq!(ladder.label(f64::NAN), last.label);
            ladder.label(f64::INFINITY);
            ladder.label(f64::NEG_INFINITY);
        }
    }

    #[test]
    fn test_contribution_thresholds_are_inclusive() {
        assert_eq!(CONTRIBUTION.label(10.0), "Major Contributor");
        assert_eq!(CONTRIBUTION.label(9.999), "Moderate Contributor");
        assert_eq!(CONTRIBUTION.label(5.0), "Moderate Contributor");
        assert_eq!(CONTRIBUTION.label(4.99), "Minor Contributor");
        assert_eq!(CONTRIBUTION.label(0.0), "Minor Contributor");
    }

    #[test]
    fn test_performance_tier_by_rank() {
        let tiers: Vec<&str> = (1..=10).map(|rank| PERFORMANCE_TIER.label(rank as f64)).collect();
        assert_eq!(&tiers[..3], &["Star Performer"; 3]);
        assert_eq!(&tiers[3..6], &["Strong Performer"; 3]);
        assert_eq!(&tiers[6..], &["Good Performer"; 4]);
    }

    #[test]
    fn test_transfer_ratio_categories() {
        assert_eq!(TRANSFER_RATIO.label(0.0), "No Transfers");
        assert_eq!(TRANSFER_RATIO.label(0.8), "Efficient");
        assert_eq!(TRANSFER_RATIO.label(1.0), "Efficient");
        assert_eq!(TRANSFER_RATIO.label(1.2), "Efficient");
        assert_eq!(TRANSFER_RATIO.label(1.21), "High Sales/Low Transfers");
        assert_eq!(TRANSFER_RATIO.label(0.5), "Low Sales/High Transfers");
    }

    #[test]
    fn test_growth_band_edges() {
        assert_eq!(GROWTH.label(10.5), "High Growth");
        assert_eq!(GROWTH.label(10.0), "Moderate Growth");
        assert_eq!(GROWTH.label(5.0), "Moderate Growth");
        assert_eq!(GROWTH.label(4.9), "Stable");
        assert_eq!(GROWTH.label(-5.0), "Stable");
        assert_eq!(GROWTH.label(-5.1), "Moderate Decline");
        assert_eq!(GROWTH.label(-10.0), "Moderate Decline");
        assert_eq!(GROWTH.label(-10.1), "Significant Decline");
    }

    #[test]
    fn test_turnover_colors_and_reach() {
        assert_eq!(TURNOVER.classify(6.0).label, "Excellent");
        assert_eq!(TURNOVER.color(6.0), "#4CAF50");
        assert_eq!(TURNOVER.color(0.1), "#F44336");
        assert!(TURNOVER.reaches(3.0, "Good"));
        assert!(TURNOVER.reaches(7.0, "Good"));
        assert!(!TURNOVER.reaches(2.9, "Good"));
        assert!(!TURNOVER.reaches(7.0, "Missing"));
    }

    #[test]
    fn test_partnership_tiers() {
        assert_eq!(PARTNERSHIP.label(20.0), "Major Partner");
        assert_eq!(PARTNERSHIP.label(10.0), "Key Partner");
        assert_eq!(PARTNERSHIP.label(5.0), "Important Partner");
        assert_eq!(PARTNERSHIP.label(1.0), "Regular Partner");
        assert_eq!(PARTNERSHIP.label(0.99), "Minor Partner");
        assert_eq!(PARTNERSHIP.color(0.5), "#9E9E9E");
    }

    #[test]
    fn test_positions_follow_band_order() {
        assert_eq!(LOGISTICS.position(60.0), 0);
        assert_eq!(LOGISTICS.position(1.0), 4);
        assert_eq!(LOGISTICS.position_of("Sales Focus"), Some(3));
        assert_eq!(MOVEMENT.labels().count(), 4);
    }
}
