//! API Request and Response Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{StakehouseError, StakehouseResult};
use crate::games::{KenoRisk, Outcome, PlinkoRisk, RouletteBet, WheelSegment};
use crate::models::{amount_from_cents, cents_from_amount, GameKind, HistoryRecord, Player, Role};
use crate::settlement::{MinesCashout, MinesRevealOutcome, MinesStart, SettledBet};

/// Decimal stake from the wire, validated and converted to cents.
pub fn stake_cents_from_bet(bet: f64) -> StakehouseResult<i64> {
    if !bet.is_finite() || bet <= 0.0 {
        return Err(StakehouseError::validation("bet must be greater than zero"));
    }
    let cents = cents_from_amount(bet);
    if cents <= 0 {
        return Err(StakehouseError::validation("bet must be at least 0.01"));
    }
    Ok(cents)
}

// ============================================================================
// Wager requests
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DiceBetRequest {
    pub player_id: String,
    pub bet: f64,
    pub chance: f64,
}

#[derive(Debug, Deserialize)]
pub struct CrashBetRequest {
    pub player_id: String,
    pub bet: f64,
    pub cashout_at: f64,
}

#[derive(Debug, Deserialize)]
pub struct PlinkoBetRequest {
    pub player_id: String,
    pub bet: f64,
    #[serde(default = "default_plinko_risk")]
    pub risk: PlinkoRisk,
    #[serde(default = "default_plinko_rows")]
    pub rows: u32,
}

fn default_plinko_risk() -> PlinkoRisk {
    PlinkoRisk::Medium
}

fn default_plinko_rows() -> u32 {
    8
}

#[derive(Debug, Deserialize)]
pub struct LimboBetRequest {
    pub player_id: String,
    pub bet: f64,
    pub target: f64,
}

#[derive(Debug, Deserialize)]
pub struct WheelBetRequest {
    pub player_id: String,
    pub bet: f64,
    /// Custom wheel layout; the house default table when omitted.
    #[serde(default)]
    pub segments: Option<Vec<WheelSegment>>,
}

#[derive(Debug, Deserialize)]
pub struct RouletteBetRequest {
    pub player_id: String,
    pub bet: f64,
    pub bet_type: RouletteBet,
    #[serde(default)]
    pub bet_value: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct KenoBetRequest {
    pub player_id: String,
    pub bet: f64,
    pub numbers: Vec<u8>,
    #[serde(default = "default_keno_risk")]
    pub risk: KenoRisk,
}

fn default_keno_risk() -> KenoRisk {
    KenoRisk::Classic
}

#[derive(Debug, Deserialize)]
pub struct SlotsBetRequest {
    pub player_id: String,
    pub bet: f64,
}

#[derive(Debug, Deserialize)]
pub struct MinesStartRequest {
    pub player_id: String,
    pub bet: f64,
    pub mine_count: u8,
}

#[derive(Debug, Deserialize)]
pub struct MinesRevealRequest {
    pub player_id: String,
    pub position: u8,
}

#[derive(Debug, Deserialize)]
pub struct MinesCashoutRequest {
    pub player_id: String,
}

// ============================================================================
// Wager responses
// ============================================================================

/// Settled single-shot wager. The game payload is flattened alongside the
/// money fields, so a dice response carries `roll`/`chance` at the top level.
#[derive(Debug, Serialize)]
pub struct BetResponse {
    pub player_id: String,
    pub bet: f64,
    pub payout: f64,
    pub new_balance: f64,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl BetResponse {
    pub fn new(player_id: &str, settled: &SettledBet) -> Self {
        Self {
            player_id: player_id.to_string(),
            bet: amount_from_cents(settled.stake_cents),
            payout: amount_from_cents(settled.payout_cents),
            new_balance: amount_from_cents(settled.new_balance_cents),
            outcome: settled.outcome.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MinesStartResponse {
    pub player_id: String,
    pub game: GameKind,
    pub mine_count: u8,
    pub bet: f64,
    pub new_balance: f64,
}

impl MinesStartResponse {
    pub fn new(player_id: &str, bet: f64, receipt: &MinesStart) -> Self {
        Self {
            player_id: player_id.to_string(),
            game: GameKind::Mines,
            mine_count: receipt.mine_count,
            bet,
            new_balance: amount_from_cents(receipt.new_balance_cents),
        }
    }
}

/// One revealed tile. Mine positions only appear once the round is over.
#[derive(Debug, Serialize)]
pub struct MinesRevealResponse {
    pub player_id: String,
    pub position: u8,
    pub safe: bool,
    pub multiplier: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_cashout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mines: Option<Vec<u8>>,
    pub new_balance: f64,
}

impl MinesRevealResponse {
    pub fn new(player_id: &str, position: u8, outcome: &MinesRevealOutcome) -> Self {
        match outcome {
            MinesRevealOutcome::Safe {
                multiplier,
                can_cashout,
                revealed_count,
                new_balance_cents,
            } => Self {
                player_id: player_id.to_string(),
                position,
                safe: true,
                multiplier: *multiplier,
                can_cashout: Some(*can_cashout),
                revealed_count: Some(*revealed_count),
                mines: None,
                new_balance: amount_from_cents(*new_balance_cents),
            },
            MinesRevealOutcome::Bust {
                position,
                mines,
                new_balance_cents,
            } => Self {
                player_id: player_id.to_string(),
                position: *position,
                safe: false,
                multiplier: 0.0,
                can_cashout: None,
                revealed_count: None,
                mines: Some(mines.clone()),
                new_balance: amount_from_cents(*new_balance_cents),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MinesCashoutResponse {
    pub player_id: String,
    pub multiplier: f64,
    pub payout: f64,
    pub new_balance: f64,
}

impl MinesCashoutResponse {
    pub fn new(player_id: &str, receipt: &MinesCashout) -> Self {
        Self {
            player_id: player_id.to_string(),
            multiplier: receipt.multiplier,
            payout: amount_from_cents(receipt.payout_cents),
            new_balance: amount_from_cents(receipt.new_balance_cents),
        }
    }
}

// ============================================================================
// History
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub records: Vec<HistoryRecordView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryRecordView {
    pub id: String,
    pub game: GameKind,
    pub bet: f64,
    pub payout: f64,
    pub multiplier: f64,
    pub won: bool,
    pub result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<HistoryRecord> for HistoryRecordView {
    fn from(record: HistoryRecord) -> Self {
        Self {
            id: record.id,
            game: record.game,
            bet: amount_from_cents(record.stake_cents),
            payout: amount_from_cents(record.payout_cents),
            multiplier: record.multiplier,
            won: record.won,
            result: record.result,
            created_at: record.created_at,
        }
    }
}

// ============================================================================
// Operator endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub username: String,
    /// Decimal starting balance; the configured default when omitted.
    #[serde(default)]
    pub starting_balance: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub rigged: bool,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Player> for PlayerResponse {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            username: player.username,
            role: player.role,
            rigged: player.rigged,
            balance: amount_from_cents(player.balance_cents),
            created_at: player.created_at,
        }
    }
}

/// Either a signed delta (`amount`) or an absolute target (`set_to`),
/// both decimals. Exactly one must be present.
#[derive(Debug, Deserialize)]
pub struct AdjustBalanceRequest {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub set_to: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AdjustBalanceResponse {
    pub player_id: String,
    pub applied: f64,
    pub new_balance: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RigModeResponse {
    pub rig_mode: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetRigModeRequest {
    pub enabled: bool,
}

// ============================================================================
// Service endpoints
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
}
