//! Axum HTTP layer for the Trailbound tour booking backend.
//!
//! The crate is a thin imperative shell: extractors resolve the caller and
//! translate the query string, handlers call into `trailbound-core`
//! services, and [`error::AppError`] maps the core taxonomy onto HTTP
//! statuses. The binary in `main.rs` wires the Postgres stores and the
//! configured providers into an [`trailbound_core::Environment`].

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
mod handlers;
pub mod images;
pub mod middleware;
pub mod notify;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
