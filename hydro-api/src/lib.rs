pub mod config;
pub mod error;
pub mod metrics_server;
pub mod models;
pub mod observability;
pub mod routes;
pub mod state;
pub mod validation;

pub use state::AppState;
