//! Route Definitions
//!
//! Maps URLs to handlers with type-safe routing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use super::{admin, games, handlers::*};

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Service endpoints
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        // Single-shot games
        .route("/api/games/dice", post(games::play_dice))
        .route("/api/games/crash", post(games::play_crash))
        .route("/api/games/plinko", post(games::play_plinko))
        .route("/api/games/limbo", post(games::play_limbo))
        .route("/api/games/wheel", post(games::play_wheel))
        .route("/api/games/roulette", post(games::play_roulette))
        .route("/api/games/keno", post(games::play_keno))
        .route("/api/games/slots", post(games::play_slots))
        // Mines round lifecycle
        .route("/api/games/mines/start", post(games::mines_start))
        .route("/api/games/mines/reveal", post(games::mines_reveal))
        .route("/api/games/mines/cashout", post(games::mines_cashout))
        // History
        .route("/api/games/history", get(games::game_history))
        // Operator endpoints
        .route("/api/players", post(admin::create_player))
        .route("/api/players/:id", get(admin::get_player))
        .route("/api/admin/players/:id/toggle-rig", post(admin::toggle_rig))
        .route("/api/admin/players/:id/balance", post(admin::adjust_balance))
        .route(
            "/api/admin/rig-mode",
            get(admin::get_rig_mode).post(admin::set_rig_mode),
        )
        // Attach shared state
        .with_state(state)
}
