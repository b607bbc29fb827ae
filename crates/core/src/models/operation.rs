use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::forex::ForexOperation;
use super::stock::StockOperation;

/// Server-assigned identifier of a stored operation.
///
/// The backend hands out UUID strings at insert time; the client never
/// invents one for a record it intends to keep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for OperationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The two instrument classes an operation can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentClass {
    /// Equities, sized in whole shares
    Stock,
    /// Currency pairs, sized in lots
    Forex,
}

impl std::fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentClass::Stock => write!(f, "Stock"),
            InstrumentClass::Forex => write!(f, "Forex"),
        }
    }
}

/// Read access shared by every persisted operation, whatever its class.
/// Aggregations and chart series are written against this trait.
pub trait TradeRecord {
    fn id(&self) -> &OperationId;

    /// Free-text instrument identifier (stock name or currency pair).
    fn symbol(&self) -> &str;

    fn date(&self) -> NaiveDate;

    /// Realized profit, fixed at creation time.
    fn profit(&self) -> f64;

    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Label used for the `index`-th point (zero-based) of a chart series.
    fn chart_label(&self, index: usize) -> String;
}

/// A logged operation of either class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Stock(StockOperation),
    Forex(ForexOperation),
}

impl Operation {
    #[must_use]
    pub fn class(&self) -> InstrumentClass {
        match self {
            Operation::Stock(_) => InstrumentClass::Stock,
            Operation::Forex(_) => InstrumentClass::Forex,
        }
    }

    /// ROI is only tracked for forex operations.
    #[must_use]
    pub fn roi(&self) -> Option<f64> {
        match self {
            Operation::Stock(_) => None,
            Operation::Forex(op) => Some(op.roi),
        }
    }
}

impl TradeRecord for Operation {
    fn id(&self) -> &OperationId {
        match self {
            Operation::Stock(op) => op.id(),
            Operation::Forex(op) => op.id(),
        }
    }

    fn symbol(&self) -> &str {
        match self {
            Operation::Stock(op) => op.symbol(),
            Operation::Forex(op) => op.symbol(),
        }
    }

    fn date(&self) -> NaiveDate {
        match self {
            Operation::Stock(op) => op.date,
            Operation::Forex(op) => op.date,
        }
    }

    fn profit(&self) -> f64 {
        match self {
            Operation::Stock(op) => op.profit,
            Operation::Forex(op) => op.profit,
        }
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Operation::Stock(op) => op.created_at,
            Operation::Forex(op) => op.created_at,
        }
    }

    fn chart_label(&self, index: usize) -> String {
        match self {
            Operation::Stock(op) => op.chart_label(index),
            Operation::Forex(op) => op.chart_label(index),
        }
    }
}

impl From<StockOperation> for Operation {
    fn from(op: StockOperation) -> Self {
        Operation::Stock(op)
    }
}

impl From<ForexOperation> for Operation {
    fn from(op: ForexOperation) -> Self {
        Operation::Forex(op)
    }
}
