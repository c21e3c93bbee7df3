//! NET-EST HTTP Server
//!
//! Thin wiring layer exposing session submission and the annotation
//! lifecycle over HTTP (spec §6).

pub mod error;
pub mod http;
pub mod metrics;
pub mod state;

pub use error::ServerError;
pub use http::create_router;
pub use metrics::init_metrics;
pub use state::AppState;
