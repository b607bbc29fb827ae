use crate::models::analytics::PerformanceSummary;
use crate::models::forex::ForexOperation;
use crate::models::operation::TradeRecord;

/// Summary statistics over an operation list.
///
/// Pure business logic, recomputed from the list on every call; nothing is
/// cached. A profit of exactly zero counts as a loss.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Sum of profit, 0 for an empty list.
    pub fn total_profit<T: TradeRecord>(&self, operations: &[T]) -> f64 {
        operations.iter().map(TradeRecord::profit).sum()
    }

    /// Mean ROI in percent, 0 for an empty list.
    pub fn average_roi(&self, operations: &[ForexOperation]) -> f64 {
        if operations.is_empty() {
            return 0.0;
        }
        operations.iter().map(|op| op.roi).sum::<f64>() / operations.len() as f64
    }

    /// Operations with strictly positive profit.
    pub fn win_count<T: TradeRecord>(&self, operations: &[T]) -> usize {
        operations.iter().filter(|op| op.profit() > 0.0).count()
    }

    /// Operations with zero or negative profit.
    pub fn loss_count<T: TradeRecord>(&self, operations: &[T]) -> usize {
        operations.len() - self.win_count(operations)
    }

    /// Percentage of winning operations, 0 for an empty list.
    pub fn win_rate<T: TradeRecord>(&self, operations: &[T]) -> f64 {
        if operations.is_empty() {
            return 0.0;
        }
        self.win_count(operations) as f64 / operations.len() as f64 * 100.0
    }

    /// Summary without ROI (stocks, or a mixed list).
    pub fn summarize<T: TradeRecord>(&self, operations: &[T]) -> PerformanceSummary {
        let win_count = self.win_count(operations);
        PerformanceSummary {
            total_operations: operations.len(),
            total_profit: self.total_profit(operations),
            win_count,
            loss_count: operations.len() - win_count,
            win_rate: self.win_rate(operations),
            average_roi: None,
        }
    }

    /// Summary including the average ROI.
    pub fn summarize_forex(&self, operations: &[ForexOperation]) -> PerformanceSummary {
        PerformanceSummary {
            average_roi: Some(self.average_roi(operations)),
            ..self.summarize(operations)
        }
    }
}
