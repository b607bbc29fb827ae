pub mod backend;
pub mod errors;
pub mod models;
pub mod services;

use std::sync::Arc;

use backend::rest::RestBackend;
use backend::traits::RemoteTable;
use models::{
    analytics::PerformanceSummary,
    chart::{ProfitPoint, WinLossBreakdown},
    forex::{ForexOperation, NewForexOperation},
    operation::{Operation, OperationId, TradeRecord},
    session::Session,
    settings::BackendSettings,
    stock::{NewStockOperation, StockOperation},
};
use services::{
    analytics_service::AnalyticsService,
    chart_service::ChartService,
    instrument::{ForexInstrument, StockInstrument},
    notifier::Notifier,
    operation_state::{OperationState, RemoveOutcome},
    operation_store::OperationStore,
    profile_service::ProfileService,
};

use errors::CoreError;

/// Main entry point for the Trade Journal core library.
/// Holds the stock and forex operation lists and the services that derive
/// figures from them. The session is never stored here: every call that
/// reads or writes on the user's behalf takes it explicitly.
#[must_use]
pub struct TradeJournal {
    stocks: OperationState<StockInstrument>,
    forex: OperationState<ForexInstrument>,
    profile_service: ProfileService,
    analytics_service: AnalyticsService,
    chart_service: ChartService,
}

impl std::fmt::Debug for TradeJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeJournal")
            .field("stocks", &self.stocks)
            .field("forex", &self.forex)
            .finish()
    }
}

impl TradeJournal {
    /// Build a journal on top of any backend.
    pub fn new(backend: Arc<dyn RemoteTable>, notifier: Arc<dyn Notifier>) -> Self {
        let stocks = OperationState::new(
            OperationStore::new(Arc::clone(&backend), Arc::clone(&notifier)),
            Arc::clone(&notifier),
        );
        let forex = OperationState::new(
            OperationStore::new(Arc::clone(&backend), Arc::clone(&notifier)),
            notifier,
        );

        Self {
            stocks,
            forex,
            profile_service: ProfileService::new(backend),
            analytics_service: AnalyticsService::new(),
            chart_service: ChartService::new(),
        }
    }

    /// Build a journal talking to the REST backend described by `settings`.
    pub fn connect(settings: &BackendSettings, notifier: Arc<dyn Notifier>) -> Result<Self, CoreError> {
        let backend = RestBackend::new(settings)?;
        Ok(Self::new(Arc::new(backend), notifier))
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Reload both lists. Without a session both are cleared.
    pub async fn refresh(&mut self, session: Option<&Session>) {
        self.stocks.refresh(session).await;
        self.forex.refresh(session).await;
    }

    pub async fn refresh_stocks(&mut self, session: Option<&Session>) {
        self.stocks.refresh(session).await;
    }

    pub async fn refresh_forex(&mut self, session: Option<&Session>) {
        self.forex.refresh(session).await;
    }

    /// `true` while either list is loading.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.stocks.is_loading() || self.forex.is_loading()
    }

    // ── Operations ──────────────────────────────────────────────────

    pub async fn add_stock_operation(
        &mut self,
        session: Option<&Session>,
        draft: &NewStockOperation,
    ) -> Result<StockOperation, CoreError> {
        self.stocks.add(session, draft).await
    }

    pub async fn add_forex_operation(
        &mut self,
        session: Option<&Session>,
        draft: &NewForexOperation,
    ) -> Result<ForexOperation, CoreError> {
        self.forex.add(session, draft).await
    }

    pub async fn remove_stock_operation(
        &mut self,
        session: Option<&Session>,
        id: &OperationId,
    ) -> Result<RemoveOutcome, CoreError> {
        self.stocks.remove(session, id).await
    }

    pub async fn remove_forex_operation(
        &mut self,
        session: Option<&Session>,
        id: &OperationId,
    ) -> Result<RemoveOutcome, CoreError> {
        self.forex.remove(session, id).await
    }

    /// Stock operations, most recently created first.
    #[must_use]
    pub fn stock_operations(&self) -> &[StockOperation] {
        self.stocks.operations()
    }

    /// Forex operations, most recently created first.
    #[must_use]
    pub fn forex_operations(&self) -> &[ForexOperation] {
        self.forex.operations()
    }

    /// Both classes merged, most recently created first.
    /// Records without a creation timestamp sort last.
    #[must_use]
    pub fn all_operations(&self) -> Vec<Operation> {
        let mut all: Vec<Operation> = self
            .stocks
            .operations()
            .iter()
            .cloned()
            .map(Operation::from)
            .chain(self.forex.operations().iter().cloned().map(Operation::from))
            .collect();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        all
    }

    #[must_use]
    pub fn stocks(&self) -> &OperationState<StockInstrument> {
        &self.stocks
    }

    #[must_use]
    pub fn forex(&self) -> &OperationState<ForexInstrument> {
        &self.forex
    }

    // ── Analytics & Charts ──────────────────────────────────────────

    #[must_use]
    pub fn stock_summary(&self) -> PerformanceSummary {
        self.analytics_service.summarize(self.stocks.operations())
    }

    #[must_use]
    pub fn forex_summary(&self) -> PerformanceSummary {
        self.analytics_service.summarize_forex(self.forex.operations())
    }

    /// Summary across both classes (no ROI: stocks do not track one).
    #[must_use]
    pub fn overall_summary(&self) -> PerformanceSummary {
        self.analytics_service.summarize(&self.all_operations())
    }

    #[must_use]
    pub fn stock_profit_curve(&self) -> Vec<ProfitPoint> {
        self.chart_service.accumulated_profit(self.stocks.operations())
    }

    #[must_use]
    pub fn forex_profit_curve(&self) -> Vec<ProfitPoint> {
        self.chart_service.accumulated_profit(self.forex.operations())
    }

    #[must_use]
    pub fn stock_win_loss(&self) -> WinLossBreakdown {
        self.chart_service.win_loss(self.stocks.operations())
    }

    #[must_use]
    pub fn forex_win_loss(&self) -> WinLossBreakdown {
        self.chart_service.win_loss(self.forex.operations())
    }

    // ── Profile ─────────────────────────────────────────────────────

    #[must_use]
    pub fn profiles(&self) -> &ProfileService {
        &self.profile_service
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Export both lists as a JSON array (newest first).
    pub fn export_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.all_operations())
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize operations to JSON: {e}")))
    }
}
