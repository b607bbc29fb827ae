use serde::{Deserialize, Serialize};

/// Aggregate performance over a list of operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Number of operations the summary covers
    pub total_operations: usize,

    /// Sum of profit (0 for an empty list)
    pub total_profit: f64,

    /// Operations with strictly positive profit
    pub win_count: usize,

    /// Operations with zero or negative profit
    pub loss_count: usize,

    /// win_count / total_operations × 100, unrounded (0 for an empty list)
    pub win_rate: f64,

    /// Mean ROI in percent; only present for forex summaries
    pub average_roi: Option<f64>,
}

impl PerformanceSummary {
    /// Total profit with two decimals, e.g. `"-12.50"`.
    #[must_use]
    pub fn total_profit_display(&self) -> String {
        format!("{:.2}", self.total_profit)
    }

    /// Average ROI with two decimals and a percent sign, e.g. `"166.67%"`.
    #[must_use]
    pub fn average_roi_display(&self) -> Option<String> {
        self.average_roi.map(|roi| format!("{roi:.2}%"))
    }

    /// Win rate rounded to a whole percent, e.g. `"67%"`. Halves round up
    /// (`12.5` shows as `"13%"`).
    #[must_use]
    pub fn win_rate_display(&self) -> String {
        format!("{:.0}%", self.win_rate.round())
    }
}
