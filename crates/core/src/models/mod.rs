pub mod analytics;
pub mod chart;
pub mod forex;
pub mod operation;
pub mod profile;
pub mod session;
pub mod settings;
pub mod stock;
pub(crate) mod wire;
