use serde_json::Value;

use crate::errors::CoreError;
use crate::models::forex::{ForexOperation, ForexOperationInsert, ForexOperationRow, NewForexOperation};
use crate::models::operation::{InstrumentClass, TradeRecord};
use crate::models::stock::{NewStockOperation, StockOperation, StockOperationInsert, StockOperationRow};
use super::calculator::{compute_equity_profit, compute_forex_profit, compute_forex_roi};

/// Everything the generic store and state container need to know about one
/// instrument class: its table, how to validate a draft, how to turn a draft
/// into an insert row (deriving profit/ROI) and how to read a row back.
pub trait Instrument: Send + Sync + 'static {
    /// User input for a new operation
    type Draft: std::fmt::Debug + Send + Sync;

    /// Persisted operation
    type Operation: TradeRecord + Clone + std::fmt::Debug + Send + Sync;

    const CLASS: InstrumentClass;

    /// Backend table holding this class
    const TABLE: &'static str;

    /// Stored procedure that clears rows depending on an operation
    const DEPENDENTS_FUNCTION: &'static str;

    /// Reject drafts that must never reach the backend.
    fn validate(draft: &Self::Draft) -> Result<(), CoreError>;

    /// Full insert row with derived fields filled in.
    fn insert_row(draft: &Self::Draft, owner: Option<&str>) -> Result<Value, CoreError>;

    /// Total mapping from a wire row; malformed rows are rejected.
    fn from_row(row: Value) -> Result<Self::Operation, CoreError>;
}

/// Equities (`stock_operations`).
#[derive(Debug, Clone, Copy, Default)]
pub struct StockInstrument;

/// Currency pairs (`forex_operations`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ForexInstrument;

// ── Validation helpers ──────────────────────────────────────────────

fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::ValidationError(format!("{field} must be a finite number")));
    }
    if value <= 0.0 {
        return Err(CoreError::ValidationError(format!("{field} must be positive")));
    }
    Ok(())
}

fn require_id(table: &str, id: &str) -> Result<(), CoreError> {
    if id.trim().is_empty() {
        return Err(CoreError::MalformedRow(format!("{table}: row has an empty id")));
    }
    Ok(())
}

impl StockInstrument {
    /// Insert row for a validated draft, profit computed here.
    #[must_use]
    pub fn prepare(draft: &NewStockOperation, owner: Option<&str>) -> StockOperationInsert {
        let profit = compute_equity_profit(
            draft.entry_price,
            draft.exit_price,
            draft.quantity,
            draft.direction,
        );
        StockOperationInsert {
            user_id: owner.map(str::to_string),
            stock_name: draft.stock_name.trim().to_string(),
            date: draft.date,
            direction: draft.direction,
            entry_price: draft.entry_price,
            exit_price: draft.exit_price,
            quantity: draft.quantity,
            profit,
        }
    }
}

impl Instrument for StockInstrument {
    type Draft = NewStockOperation;
    type Operation = StockOperation;

    const CLASS: InstrumentClass = InstrumentClass::Stock;
    const TABLE: &'static str = "stock_operations";
    const DEPENDENTS_FUNCTION: &'static str = "delete_stock_operation_dependents";

    fn validate(draft: &NewStockOperation) -> Result<(), CoreError> {
        require_text("Stock name", &draft.stock_name)?;
        require_positive("Entry price", draft.entry_price)?;
        require_positive("Exit price", draft.exit_price)?;
        if draft.quantity == 0 {
            return Err(CoreError::ValidationError("Quantity must be at least 1".into()));
        }
        Ok(())
    }

    fn insert_row(draft: &NewStockOperation, owner: Option<&str>) -> Result<Value, CoreError> {
        serde_json::to_value(Self::prepare(draft, owner))
            .map_err(|e| CoreError::Serialization(format!("Failed to encode stock operation: {e}")))
    }

    fn from_row(row: Value) -> Result<StockOperation, CoreError> {
        let row: StockOperationRow = serde_json::from_value(row)
            .map_err(|e| CoreError::MalformedRow(format!("{}: {e}", Self::TABLE)))?;
        require_id(Self::TABLE, &row.id)?;
        Ok(row.into())
    }
}

impl ForexInstrument {
    /// Insert row for a validated draft, profit and ROI computed here.
    #[must_use]
    pub fn prepare(draft: &NewForexOperation, owner: Option<&str>) -> ForexOperationInsert {
        let profit = compute_forex_profit(
            draft.entry_price,
            draft.exit_price,
            draft.lot_size,
            draft.direction,
        );
        let roi = compute_forex_roi(profit, draft.initial_capital);
        ForexOperationInsert {
            user_id: owner.map(str::to_string),
            currency_pair: draft.currency_pair.trim().to_string(),
            date: draft.date,
            direction: draft.direction,
            entry_price: draft.entry_price,
            exit_price: draft.exit_price,
            lot_size: draft.lot_size,
            initial_capital: draft.initial_capital,
            profit,
            roi,
        }
    }
}

impl Instrument for ForexInstrument {
    type Draft = NewForexOperation;
    type Operation = ForexOperation;

    const CLASS: InstrumentClass = InstrumentClass::Forex;
    const TABLE: &'static str = "forex_operations";
    const DEPENDENTS_FUNCTION: &'static str = "delete_forex_operation_dependents";

    fn validate(draft: &NewForexOperation) -> Result<(), CoreError> {
        require_text("Currency pair", &draft.currency_pair)?;
        require_positive("Entry price", draft.entry_price)?;
        require_positive("Exit price", draft.exit_price)?;
        require_positive("Lot size", draft.lot_size)?;
        // Also the ROI denominator, so zero is never allowed through.
        require_positive("Initial capital", draft.initial_capital)?;
        Ok(())
    }

    fn insert_row(draft: &NewForexOperation, owner: Option<&str>) -> Result<Value, CoreError> {
        serde_json::to_value(Self::prepare(draft, owner))
            .map_err(|e| CoreError::Serialization(format!("Failed to encode forex operation: {e}")))
    }

    fn from_row(row: Value) -> Result<ForexOperation, CoreError> {
        let row: ForexOperationRow = serde_json::from_value(row)
            .map_err(|e| CoreError::MalformedRow(format!("{}: {e}", Self::TABLE)))?;
        require_id(Self::TABLE, &row.id)?;
        Ok(row.into())
    }
}
