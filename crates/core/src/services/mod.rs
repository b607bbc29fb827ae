pub mod analytics_service;
pub mod calculator;
pub mod chart_service;
pub mod instrument;
pub mod notifier;
pub mod operation_state;
pub mod operation_store;
pub mod profile_service;
