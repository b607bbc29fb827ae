use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::operation::{OperationId, TradeRecord};
use super::wire;

/// Direction of an equity operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockDirection {
    /// Long: profit when the price rises
    #[serde(alias = "Compra")]
    Purchase,
    /// Short: profit when the price falls
    #[serde(alias = "Venda")]
    Sale,
}

impl std::fmt::Display for StockDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockDirection::Purchase => f.pad("Purchase"),
            StockDirection::Sale => f.pad("Sale"),
        }
    }
}

impl std::str::FromStr for StockDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "purchase" => Ok(StockDirection::Purchase),
            "sale" => Ok(StockDirection::Sale),
            other => Err(format!("unknown stock direction '{other}' (expected purchase or sale)")),
        }
    }
}

/// User input for a new equity operation. Profit is never part of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStockOperation {
    pub stock_name: String,
    pub date: NaiveDate,
    pub direction: StockDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Number of shares (must be positive)
    pub quantity: u32,
}

impl NewStockOperation {
    pub fn new(
        stock_name: impl Into<String>,
        date: NaiveDate,
        direction: StockDirection,
        entry_price: f64,
        exit_price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            stock_name: stock_name.into(),
            date,
            direction,
            entry_price,
            exit_price,
            quantity,
        }
    }
}

/// A persisted equity operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockOperation {
    /// Assigned by the backend at creation
    pub id: OperationId,

    /// Owning user, if the backend recorded one
    pub user_id: Option<String>,

    pub stock_name: String,
    pub date: NaiveDate,
    pub direction: StockDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: u32,

    /// Realized profit, computed once at creation
    pub profit: f64,

    pub created_at: Option<DateTime<Utc>>,
}

impl TradeRecord for StockOperation {
    fn id(&self) -> &OperationId {
        &self.id
    }

    fn symbol(&self) -> &str {
        &self.stock_name
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

    fn chart_label(&self, _index: usize) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

// ── Wire rows (`stock_operations` table) ────────────────────────────

/// Row shape returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct StockOperationRow {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub stock_name: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub direction: StockDirection,
    #[serde(deserialize_with = "wire::decimal")]
    pub entry_price: f64,
    #[serde(deserialize_with = "wire::decimal")]
    pub exit_price: f64,
    #[serde(deserialize_with = "wire::whole_quantity")]
    pub quantity: u32,
    #[serde(deserialize_with = "wire::decimal")]
    pub profit: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Row shape submitted on insert. `id` and `created_at` are server-assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockOperationInsert {
    pub user_id: Option<String>,
    pub stock_name: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub direction: StockDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: u32,
    pub profit: f64,
}

impl From<StockOperationRow> for StockOperation {
    fn from(row: StockOperationRow) -> Self {
        Self {
            id: OperationId::new(row.id),
            user_id: row.user_id,
            stock_name: row.stock_name,
            date: row.date,
            direction: row.direction,
            entry_price: row.entry_price,
            exit_price: row.exit_price,
            quantity: row.quantity,
            profit: row.profit,
            created_at: row.created_at,
        }
    }
}
