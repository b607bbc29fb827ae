// ═══════════════════════════════════════════════════════════════════
// Calculator Tests: equity profit, forex profit, forex ROI
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;

use trade_journal_core::models::forex::{ForexDirection, NewForexOperation};
use trade_journal_core::models::stock::{NewStockOperation, StockDirection};
use trade_journal_core::services::calculator::{
    compute_equity_profit, compute_forex_profit, compute_forex_roi, STANDARD_LOT_UNITS,
};
use trade_journal_core::services::instrument::{ForexInstrument, StockInstrument};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

// ── Equities ────────────────────────────────────────────────────────

mod equity {
    use super::*;

    #[test]
    fn purchase_profits_when_price_rises() {
        let profit = compute_equity_profit(10.0, 12.0, 100, StockDirection::Purchase);
        assert!(approx(profit, 200.0));
    }

    #[test]
    fn sale_profits_when_price_falls() {
        let profit = compute_equity_profit(12.0, 10.0, 100, StockDirection::Sale);
        assert!(approx(profit, 200.0));
    }

    #[test]
    fn purchase_loses_when_price_falls() {
        let profit = compute_equity_profit(12.0, 10.0, 100, StockDirection::Purchase);
        assert!(approx(profit, -200.0));
    }

    #[test]
    fn sale_loses_when_price_rises() {
        let profit = compute_equity_profit(10.0, 12.5, 40, StockDirection::Sale);
        assert!(approx(profit, -100.0));
    }

    #[test]
    fn unchanged_price_is_zero_profit() {
        assert_eq!(compute_equity_profit(33.3, 33.3, 7, StockDirection::Purchase), 0.0);
        assert_eq!(compute_equity_profit(33.3, 33.3, 7, StockDirection::Sale), 0.0);
    }

    #[test]
    fn purchase_matches_quantity_times_difference() {
        for (entry, exit, qty) in [(1.5, 2.25, 3u32), (100.0, 87.5, 12), (0.01, 0.02, 10_000)] {
            let profit = compute_equity_profit(entry, exit, qty, StockDirection::Purchase);
            assert!(approx(profit, f64::from(qty) * (exit - entry)));
        }
    }
}

// ── Forex ───────────────────────────────────────────────────────────

mod forex {
    use super::*;

    #[test]
    fn standard_lot_is_one_hundred_thousand_units() {
        assert_eq!(STANDARD_LOT_UNITS, 100_000.0);
    }

    #[test]
    fn buy_profits_when_price_rises() {
        let profit = compute_forex_profit(1.1000, 1.1050, 0.1, ForexDirection::Buy);
        assert!(approx(profit, 50.0), "got {profit}");
    }

    #[test]
    fn sell_profits_when_price_falls() {
        let profit = compute_forex_profit(1.1050, 1.1000, 0.1, ForexDirection::Sell);
        assert!(approx(profit, 50.0), "got {profit}");
    }

    #[test]
    fn sell_loses_when_price_rises() {
        let profit = compute_forex_profit(1.1000, 1.1050, 0.1, ForexDirection::Sell);
        assert!(approx(profit, -50.0), "got {profit}");
    }

    #[test]
    fn roi_is_profit_over_capital_in_percent() {
        let roi = compute_forex_roi(50.0, 30.0);
        assert!((roi - 166.666_666).abs() < 1e-3, "got {roi}");
    }

    #[test]
    fn negative_profit_gives_negative_roi() {
        assert!(approx(compute_forex_roi(-15.0, 30.0), -50.0));
    }
}

// ── Derived fields on insert ────────────────────────────────────────

mod prepare {
    use super::*;

    #[test]
    fn stock_insert_row_carries_computed_profit() {
        let draft = NewStockOperation::new("  PETR4 ", date(), StockDirection::Purchase, 10.0, 12.0, 100);
        let row = StockInstrument::prepare(&draft, Some("user-1"));
        assert!(approx(row.profit, 200.0));
        assert_eq!(row.stock_name, "PETR4");
        assert_eq!(row.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn forex_insert_row_carries_profit_and_roi() {
        let draft = NewForexOperation::new("EUR/USD", date(), ForexDirection::Buy, 1.1000, 1.1050, 0.1, 30.0);
        let row = ForexInstrument::prepare(&draft, None);
        assert!(approx(row.profit, 50.0));
        assert!((row.roi - 166.67).abs() < 0.01);
        assert!(row.user_id.is_none());
    }

    #[test]
    fn roi_is_derived_from_the_computed_profit() {
        let draft = NewForexOperation::new("GBP/USD", date(), ForexDirection::Sell, 1.2700, 1.2600, 0.05, 200.0);
        let row = ForexInstrument::prepare(&draft, None);
        assert!(approx(row.roi, compute_forex_roi(row.profit, 200.0)));
        assert!(approx(row.profit, 50.0));
    }
}
