//! Stakehouse - Casino Wager Settlement Service
//!
//! Eight single-shot games plus a multi-step mines round, a centrally
//! controlled rig policy, and a RocksDB-backed settlement pipeline behind
//! an axum HTTP API.

pub mod api;
pub mod casino_store;
pub mod config;
pub mod errors;
pub mod games;
pub mod metrics;
pub mod models;
pub mod rig;
pub mod rng;
pub mod settlement;
pub mod storage;

pub use errors::{StakehouseError, StakehouseResult};
