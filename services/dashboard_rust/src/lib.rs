//! dashboard_rust - Live sniper dashboard session over the cartel listings API

pub mod config;
pub mod formatters;
pub mod session;
pub mod state;

pub use config::DashboardConfig;
pub use session::DashboardSession;
pub use state::{ApiStatus, DashboardState};
