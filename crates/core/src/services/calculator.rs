//! Profit and ROI arithmetic.
//!
//! Pure functions, no I/O. Every place that needs profit semantics goes
//! through here; callers validate their inputs first.

use crate::models::forex::ForexDirection;
use crate::models::stock::StockDirection;

/// Units of base currency in one standard forex lot.
pub const STANDARD_LOT_UNITS: f64 = 100_000.0;

/// Realized profit of an equity operation.
///
/// A purchase gains when the price rises; a sale (short) gains when it falls.
#[must_use]
pub fn compute_equity_profit(
    entry_price: f64,
    exit_price: f64,
    quantity: u32,
    direction: StockDirection,
) -> f64 {
    let quantity = f64::from(quantity);
    let entry_value = entry_price * quantity;
    let exit_value = exit_price * quantity;
    match direction {
        StockDirection::Purchase => exit_value - entry_value,
        StockDirection::Sale => entry_value - exit_value,
    }
}

/// Realized profit of a forex operation, in quote currency.
#[must_use]
pub fn compute_forex_profit(
    entry_price: f64,
    exit_price: f64,
    lot_size: f64,
    direction: ForexDirection,
) -> f64 {
    let price_diff = exit_price - entry_price;
    match direction {
        ForexDirection::Buy => price_diff * lot_size * STANDARD_LOT_UNITS,
        ForexDirection::Sell => -price_diff * lot_size * STANDARD_LOT_UNITS,
    }
}

/// Profit as a percentage of the committed capital.
///
/// `initial_capital` must be non-zero; drafts with zero or negative capital
/// are rejected before they get here.
#[must_use]
pub fn compute_forex_roi(profit: f64, initial_capital: f64) -> f64 {
    (profit / initial_capital) * 100.0
}
