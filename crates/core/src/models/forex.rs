use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::operation::{OperationId, TradeRecord};
use super::wire;

/// Initial capital pre-filled for new forex drafts.
pub const DEFAULT_INITIAL_CAPITAL: f64 = 30.0;

/// Direction of a forex operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForexDirection {
    Buy,
    Sell,
}

impl std::fmt::Display for ForexDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForexDirection::Buy => f.pad("Buy"),
            ForexDirection::Sell => f.pad("Sell"),
        }
    }
}

impl std::str::FromStr for ForexDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(ForexDirection::Buy),
            "sell" => Ok(ForexDirection::Sell),
            other => Err(format!("unknown forex direction '{other}' (expected buy or sell)")),
        }
    }
}

/// User input for a new forex operation. Profit and ROI are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct NewForexOperation {
    /// e.g. "EUR/USD"
    pub currency_pair: String,
    pub date: NaiveDate,
    pub direction: ForexDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Position size in standard lots (1.0 = 100,000 units of base currency)
    pub lot_size: f64,
    /// Capital committed, used as the ROI denominator
    pub initial_capital: f64,
}

impl NewForexOperation {
    pub fn new(
        currency_pair: impl Into<String>,
        date: NaiveDate,
        direction: ForexDirection,
        entry_price: f64,
        exit_price: f64,
        lot_size: f64,
        initial_capital: f64,
    ) -> Self {
        Self {
            currency_pair: currency_pair.into(),
            date,
            direction,
            entry_price,
            exit_price,
            lot_size,
            initial_capital,
        }
    }

    /// Draft with the default initial capital.
    pub fn with_default_capital(
        currency_pair: impl Into<String>,
        date: NaiveDate,
        direction: ForexDirection,
        entry_price: f64,
        exit_price: f64,
        lot_size: f64,
    ) -> Self {
        Self::new(
            currency_pair,
            date,
            direction,
            entry_price,
            exit_price,
            lot_size,
            DEFAULT_INITIAL_CAPITAL,
        )
    }
}

/// A persisted forex operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForexOperation {
    pub id: OperationId,
    pub user_id: Option<String>,
    pub currency_pair: String,
    pub date: NaiveDate,
    pub direction: ForexDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    pub lot_size: f64,
    pub initial_capital: f64,
    pub profit: f64,
    /// Return on initial capital, in percent
    pub roi: f64,
    pub created_at: Option<DateTime<Utc>>,
}

impl TradeRecord for ForexOperation {
    fn id(&self) -> &OperationId {
        &self.id
    }

    fn symbol(&self) -> &str {
        &self.currency_pair
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn profit(&self) -> f64 {
        self.profit
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn chart_label(&self, index: usize) -> String {
        format!("Op {} ({})", index + 1, self.currency_pair)
    }
}

// ── Wire rows (`forex_operations` table) ────────────────────────────

/// Row shape returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ForexOperationRow {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub currency_pair: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub direction: ForexDirection,
    #[serde(deserialize_with = "wire::decimal")]
    pub entry_price: f64,
    #[serde(deserialize_with = "wire::decimal")]
    pub exit_price: f64,
    #[serde(deserialize_with = "wire::decimal")]
    pub lot_size: f64,
    #[serde(deserialize_with = "wire::decimal")]
    pub initial_capital: f64,
    #[serde(deserialize_with = "wire::decimal")]
    pub profit: f64,
    #[serde(deserialize_with = "wire::decimal")]
    pub roi: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Row shape submitted on insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForexOperationInsert {
    pub user_id: Option<String>,
    pub currency_pair: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub direction: ForexDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    pub lot_size: f64,
    pub initial_capital: f64,
    pub profit: f64,
    pub roi: f64,
}

impl From<ForexOperationRow> for ForexOperation {
    fn from(row: ForexOperationRow) -> Self {
        Self {
            id: OperationId::new(row.id),
            user_id: row.user_id,
            currency_pair: row.currency_pair,
            date: row.date,
            direction: row.direction,
            entry_price: row.entry_price,
            exit_price: row.exit_price,
            lot_size: row.lot_size,
            initial_capital: row.initial_capital,
            profit: row.profit,
            roi: row.roi,
            created_at: row.created_at,
        }
    }
}
