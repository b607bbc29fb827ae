use serde::{Deserialize, Serialize};

use super::operation::OperationId;

/// One point of the accumulated profit curve.
///
/// The core generates these; the front end just renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitPoint {
    /// Operation this point belongs to
    pub operation_id: OperationId,

    /// Axis label (date for stocks, `Op n (pair)` for forex)
    pub label: String,

    /// Profit of this operation alone
    pub profit: f64,

    /// Running sum of profit up to and including this operation
    pub accumulated: f64,
}

/// Win/loss split for pie charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLossBreakdown {
    pub wins: usize,
    pub losses: usize,
}
