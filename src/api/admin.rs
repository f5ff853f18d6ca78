//! Operator Endpoints
//!
//! Player provisioning, rig controls, and balance adjustments. The acting
//! operator arrives in the `x-admin-id` header and must hold the admin role,
//! or owner for the global rig mode switch.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use tracing::{info, warn};

use super::errors::{ApiError, ApiJson};
use super::handlers::AppState;
use super::middleware::RequestId;
use super::models::*;
use crate::casino_store;
use crate::errors::{StakehouseError, StakehouseResult};
use crate::models::{cents_from_amount, Player, Role};
use crate::settlement::BalanceChange;
use crate::storage::Store;

/// Acting operator header key
pub const ADMIN_ID_HEADER: &str = "x-admin-id";

fn acting_operator(store: &Store, headers: &HeaderMap) -> StakehouseResult<Player> {
    let admin_id = headers
        .get(ADMIN_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| StakehouseError::validation("x-admin-id header is required"))?;
    casino_store::require_player(store, admin_id)
}

fn require_admin(store: &Store, headers: &HeaderMap) -> StakehouseResult<Player> {
    let operator = acting_operator(store, headers)?;
    if !operator.is_privileged() {
        return Err(StakehouseError::validation("admin role required"));
    }
    Ok(operator)
}

fn require_owner(store: &Store, headers: &HeaderMap) -> StakehouseResult<Player> {
    let operator = acting_operator(store, headers)?;
    if operator.role != Role::Owner {
        return Err(StakehouseError::validation("owner role required"));
    }
    Ok(operator)
}

/// POST /api/players
pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<CreatePlayerRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let store = state.settlement.store();
    let operator = require_admin(store, &headers)
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    let username = req.username.trim();
    if username.is_empty() {
        return Err(ApiError::new(
            request_id.0.clone(),
            StakehouseError::validation("username is required"),
        ));
    }

    let balance_cents = match req.starting_balance {
        Some(balance) if !balance.is_finite() || balance < 0.0 => {
            return Err(ApiError::new(
                request_id.0.clone(),
                StakehouseError::validation("starting_balance must be >= 0"),
            ));
        }
        Some(balance) => cents_from_amount(balance),
        None => state.starting_balance_cents,
    };

    let mut player = Player::new(username);
    player.balance_cents = balance_cents;
    state
        .settlement
        .create_player(&player)
        .await
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    info!(
        operator = %operator.id,
        player = %player.id,
        username = %player.username,
        balance_cents,
        "player created"
    );
    Ok(Json(PlayerResponse::from(player)))
}

/// GET /api/players/:id
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let store = state.settlement.store();
    require_admin(store, &headers).map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    let player = casino_store::require_player(store, &player_id)
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;
    Ok(Json(PlayerResponse::from(player)))
}

/// POST /api/admin/players/:id/toggle-rig
pub async fn toggle_rig(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let store = state.settlement.store();
    let operator =
        require_admin(store, &headers).map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    let mut player = casino_store::require_player(store, &player_id)
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;
    if player.is_privileged() {
        return Err(ApiError::new(
            request_id.0.clone(),
            StakehouseError::validation("cannot rig admin or owner accounts"),
        ));
    }

    player.rigged = !player.rigged;
    casino_store::save_player(store, &player)
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    info!(
        operator = %operator.id,
        player = %player.id,
        rigged = player.rigged,
        "player rig flag toggled"
    );
    Ok(Json(PlayerResponse::from(player)))
}

/// POST /api/admin/players/:id/balance
pub async fn adjust_balance(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    Path(player_id): Path<String>,
    ApiJson(req): ApiJson<AdjustBalanceRequest>,
) -> Result<Json<AdjustBalanceResponse>, ApiError> {
    let store = state.settlement.store();
    let operator =
        require_admin(store, &headers).map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    let change = match (req.amount, req.set_to) {
        (Some(amount), None) if amount.is_finite() => {
            BalanceChange::Adjust(cents_from_amount(amount))
        }
        (None, Some(target)) if target.is_finite() && target >= 0.0 => {
            BalanceChange::Set(cents_from_amount(target))
        }
        _ => {
            return Err(ApiError::new(
                request_id.0.clone(),
                StakehouseError::validation("provide exactly one of amount or set_to"),
            ));
        }
    };

    let (player, applied_cents) = state
        .settlement
        .adjust_balance(&player_id, change, Some(operator.id.clone()))
        .await
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    Ok(Json(AdjustBalanceResponse {
        player_id: player.id,
        applied: crate::models::amount_from_cents(applied_cents),
        new_balance: crate::models::amount_from_cents(player.balance_cents),
    }))
}

/// GET /api/admin/rig-mode
pub async fn get_rig_mode(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Json<RigModeResponse>, ApiError> {
    let store = state.settlement.store();
    require_admin(store, &headers).map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    let rig_mode = casino_store::load_rig_mode(store)
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;
    Ok(Json(RigModeResponse { rig_mode }))
}

/// POST /api/admin/rig-mode
pub async fn set_rig_mode(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<SetRigModeRequest>,
) -> Result<Json<RigModeResponse>, ApiError> {
    let store = state.settlement.store();
    let operator =
        require_owner(store, &headers).map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    casino_store::save_rig_mode(store, req.enabled)
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    warn!(operator = %operator.id, enabled = req.enabled, "global rig mode changed");
    Ok(Json(RigModeResponse {
        rig_mode: req.enabled,
    }))
}
