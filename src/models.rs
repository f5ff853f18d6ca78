//! Core domain types: players, rounds, wager history, ledger entries
//!
//! Money is carried as integer minor units (cents). Decimal amounts exist
//! only at the HTTP boundary and are converted with [`cents_from_amount`] /
//! [`amount_from_cents`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::games::mines::MinesState;

/// Game variants the settlement engine can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Dice,
    Mines,
    Crash,
    Plinko,
    Limbo,
    Wheel,
    Roulette,
    Keno,
    Slots,
}

impl GameKind {
    /// Stable lowercase name used in storage keys and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Dice => "dice",
            GameKind::Mines => "mines",
            GameKind::Crash => "crash",
            GameKind::Plinko => "plinko",
            GameKind::Limbo => "limbo",
            GameKind::Wheel => "wheel",
            GameKind::Roulette => "roulette",
            GameKind::Keno => "keno",
            GameKind::Slots => "slots",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account role. Admins and owners are privileged: they operate the rig
/// switches and are categorically exempt from rigging themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Admin,
    Owner,
}

impl Role {
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Player => write!(f, "player"),
            Role::Admin => write!(f, "admin"),
            Role::Owner => write!(f, "owner"),
        }
    }
}

/// Player account with balance in cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub rigged: bool,
    pub balance_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            role: Role::Player,
            rigged: false,
            balance_cents: 0,
            created_at: Utc::now(),
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

/// In-progress multi-step wager. Exactly one may exist per
/// (player, game kind); starting a new one discards the old slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveRound {
    pub id: String,
    pub player_id: String,
    pub game: GameKind,
    pub stake_cents: i64,
    pub state: MinesState,
    pub started_at: DateTime<Utc>,
}

impl ActiveRound {
    pub fn new(player_id: impl Into<String>, stake_cents: i64, state: MinesState) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            player_id: player_id.into(),
            game: GameKind::Mines,
            stake_cents,
            state,
            started_at: Utc::now(),
        }
    }
}

/// Settled wager record. Append-only, never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub player_id: String,
    pub game: GameKind,
    pub stake_cents: i64,
    pub payout_cents: i64,
    pub multiplier: f64,
    pub won: bool,
    /// Game-specific outcome payload exactly as returned to the player.
    pub result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        player_id: impl Into<String>,
        game: GameKind,
        stake_cents: i64,
        payout_cents: i64,
        multiplier: f64,
        won: bool,
        result: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            player_id: player_id.into(),
            game,
            stake_cents,
            payout_cents,
            multiplier,
            won,
            result,
            created_at: Utc::now(),
        }
    }
}

/// Money movement categories recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    Bet,
    Payout,
    Adjustment,
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerKind::Bet => write!(f, "bet"),
            LedgerKind::Payout => write!(f, "payout"),
            LedgerKind::Adjustment => write!(f, "adjustment"),
        }
    }
}

/// One immutable ledger line. Bets are negative, payouts positive,
/// adjustments either sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub player_id: String,
    pub kind: LedgerKind,
    pub amount_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        player_id: impl Into<String>,
        kind: LedgerKind,
        amount_cents: i64,
        reference_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            player_id: player_id.into(),
            kind,
            amount_cents,
            reference_id,
            created_at: Utc::now(),
        }
    }
}

/// Decimal stake to integer cents, rounding to the nearest cent.
pub fn cents_from_amount(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Integer cents back to the decimal carried in responses.
pub fn amount_from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}
