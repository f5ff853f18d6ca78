//! Casino Game Endpoints
//!
//! One POST route per game. Every handler converts the decimal stake to
//! cents, hands the wager to the settlement manager, and shapes the receipt
//! back into a flattened JSON response.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use super::errors::{ApiError, ApiJson};
use super::handlers::AppState;
use super::middleware::RequestId;
use super::models::*;
use crate::casino_store;
use crate::games::BetParams;
use crate::rng::OsDraws;
use crate::settlement::MinesRevealOutcome;

async fn settle(
    state: &AppState,
    request_id: &RequestId,
    player_id: &str,
    bet: f64,
    params: BetParams,
) -> Result<Json<BetResponse>, ApiError> {
    let stake_cents =
        stake_cents_from_bet(bet).map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    let settled = state
        .settlement
        .settle_bet(player_id, stake_cents, &params, &mut OsDraws)
        .await
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    state
        .metrics
        .record_bet(settled.stake_cents, settled.payout_cents, settled.outcome.win);

    Ok(Json(BetResponse::new(player_id, &settled)))
}

/// POST /api/games/dice
pub async fn play_dice(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(req): ApiJson<DiceBetRequest>,
) -> Result<Json<BetResponse>, ApiError> {
    let params = BetParams::Dice { chance: req.chance };
    settle(&state, &request_id, &req.player_id, req.bet, params).await
}

/// POST /api/games/crash
pub async fn play_crash(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(req): ApiJson<CrashBetRequest>,
) -> Result<Json<BetResponse>, ApiError> {
    let params = BetParams::Crash {
        cashout_at: req.cashout_at,
    };
    settle(&state, &request_id, &req.player_id, req.bet, params).await
}

/// POST /api/games/plinko
pub async fn play_plinko(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(req): ApiJson<PlinkoBetRequest>,
) -> Result<Json<BetResponse>, ApiError> {
    let params = BetParams::Plinko {
        risk: req.risk,
        rows: req.rows,
    };
    settle(&state, &request_id, &req.player_id, req.bet, params).await
}

/// POST /api/games/limbo
pub async fn play_limbo(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(req): ApiJson<LimboBetRequest>,
) -> Result<Json<BetResponse>, ApiError> {
    let params = BetParams::Limbo { target: req.target };
    settle(&state, &request_id, &req.player_id, req.bet, params).await
}

/// POST /api/games/wheel
pub async fn play_wheel(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(req): ApiJson<WheelBetRequest>,
) -> Result<Json<BetResponse>, ApiError> {
    let params = BetParams::Wheel {
        segments: req.segments,
    };
    settle(&state, &request_id, &req.player_id, req.bet, params).await
}

/// POST /api/games/roulette
pub async fn play_roulette(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(req): ApiJson<RouletteBetRequest>,
) -> Result<Json<BetResponse>, ApiError> {
    let params = BetParams::Roulette {
        bet_type: req.bet_type,
        bet_value: req.bet_value,
    };
    settle(&state, &request_id, &req.player_id, req.bet, params).await
}

/// POST /api/games/keno
pub async fn play_keno(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(req): ApiJson<KenoBetRequest>,
) -> Result<Json<BetResponse>, ApiError> {
    let params = BetParams::Keno {
        numbers: req.numbers,
        risk: req.risk,
    };
    settle(&state, &request_id, &req.player_id, req.bet, params).await
}

/// POST /api/games/slots
pub async fn play_slots(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(req): ApiJson<SlotsBetRequest>,
) -> Result<Json<BetResponse>, ApiError> {
    settle(&state, &request_id, &req.player_id, req.bet, BetParams::Slots).await
}

/// POST /api/games/mines/start
pub async fn mines_start(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(req): ApiJson<MinesStartRequest>,
) -> Result<Json<MinesStartResponse>, ApiError> {
    let stake_cents =
        stake_cents_from_bet(req.bet).map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    let receipt = state
        .settlement
        .mines_start(&req.player_id, stake_cents, req.mine_count, &mut OsDraws)
        .await
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    if receipt.discarded_stale {
        state.metrics.record_mines_discard();
    }
    state.metrics.record_mines_start(stake_cents);

    Ok(Json(MinesStartResponse::new(&req.player_id, req.bet, &receipt)))
}

/// POST /api/games/mines/reveal
pub async fn mines_reveal(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(req): ApiJson<MinesRevealRequest>,
) -> Result<Json<MinesRevealResponse>, ApiError> {
    let outcome = state
        .settlement
        .mines_reveal(&req.player_id, req.position, &mut OsDraws)
        .await
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    if let MinesRevealOutcome::Bust { .. } = outcome {
        state.metrics.record_mines_bust();
    }

    Ok(Json(MinesRevealResponse::new(
        &req.player_id,
        req.position,
        &outcome,
    )))
}

/// POST /api/games/mines/cashout
pub async fn mines_cashout(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(req): ApiJson<MinesCashoutRequest>,
) -> Result<Json<MinesCashoutResponse>, ApiError> {
    let receipt = state
        .settlement
        .mines_cashout(&req.player_id)
        .await
        .map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    state.metrics.record_mines_cashout(receipt.payout_cents);

    Ok(Json(MinesCashoutResponse::new(&req.player_id, &receipt)))
}

/// History query parameters
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub player_id: String,
    #[serde(default = "default_history_limit")]
    pub limit: usize,
    #[serde(default)]
    pub cursor: Option<String>,
}

fn default_history_limit() -> usize {
    50
}

/// Newest-first wager history with cursor pagination
/// GET /api/games/history?player_id={id}&limit={n}&cursor={hex}
pub async fn game_history(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    // Enforce maximum limit
    let limit = params.limit.min(200);

    let (records, next_cursor) = casino_store::load_history(
        state.settlement.store(),
        &params.player_id,
        params.cursor.as_deref(),
        limit,
    )
    .map_err(|e| ApiError::new(request_id.0.clone(), e))?;

    Ok(Json(HistoryResponse {
        records: records.into_iter().map(HistoryRecordView::from).collect(),
        next_cursor,
    }))
}
