use crate::models::chart::{ProfitPoint, WinLossBreakdown};
use crate::models::operation::TradeRecord;

use super::analytics_service::AnalyticsService;

/// Generates chart-ready series from an operation list.
///
/// The core computes all the numbers; the front end only renders.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartService {
    analytics_service: AnalyticsService,
}

impl ChartService {
    pub fn new() -> Self {
        Self {
            analytics_service: AnalyticsService::new(),
        }
    }

    /// Accumulated profit curve: one point per operation, in list order,
    /// each carrying the running sum of profit up to and including it.
    pub fn accumulated_profit<T: TradeRecord>(&self, operations: &[T]) -> Vec<ProfitPoint> {
        let mut accumulated = 0.0;
        operations
            .iter()
            .enumerate()
            .map(|(index, op)| {
                accumulated += op.profit();
                ProfitPoint {
                    operation_id: op.id().clone(),
                    label: op.chart_label(index),
                    profit: op.profit(),
                    accumulated,
                }
            })
            .collect()
    }

    /// Wins versus losses for a pie chart.
    pub fn win_loss<T: TradeRecord>(&self, operations: &[T]) -> WinLossBreakdown {
        WinLossBreakdown {
            wins: self.analytics_service.win_count(operations),
            losses: self.analytics_service.loss_count(operations),
        }
    }
}
