//! Casino HTTP API
//!
//! JSON endpoints for wagers, mines rounds, player history, and operator
//! controls, plus health/status/metrics service endpoints.

pub mod admin;
pub mod errors;
pub mod games;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::ApiServer;
