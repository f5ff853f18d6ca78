//! Game Outcome Engine
//!
//! One module per game variant. Every game follows the same shape: draw fair
//! randomness from the bounded source, apply the rig correction as a
//! post-draw adjustment when the decision policy asked for one, then compute
//! win/lose and a multiplier discounted by the house edge. The fair sampling
//! path is identical whether or not rigging is active; the bias lives in one
//! isolated branch per game and only ever moves the result against the
//! player.

pub mod crash;
pub mod dice;
pub mod keno;
pub mod limbo;
pub mod mines;
pub mod plinko;
pub mod roulette;
pub mod slots;
pub mod wheel;

pub use keno::KenoRisk;
pub use mines::MinesState;
pub use plinko::PlinkoRisk;
pub use roulette::RouletteBet;
pub use slots::{LineWin, SlotSymbol};
pub use wheel::WheelSegment;

use serde::{Deserialize, Serialize};

use crate::errors::{StakehouseError, StakehouseResult};
use crate::models::GameKind;
use crate::rng::DrawSource;

/// Fixed fractional discount applied to every winning multiplier.
pub const HOUSE_EDGE: f64 = 0.02;

/// Discounts a fair multiplier by the house edge.
pub(crate) fn edged(multiplier: f64) -> f64 {
    multiplier * (1.0 - HOUSE_EDGE)
}

/// Parameters for a single-shot wager, one variant per game.
#[derive(Debug, Clone, PartialEq)]
pub enum BetParams {
    Dice { chance: f64 },
    Crash { cashout_at: f64 },
    Plinko { risk: PlinkoRisk, rows: u32 },
    Limbo { target: f64 },
    Wheel { segments: Option<Vec<WheelSegment>> },
    Roulette { bet_type: RouletteBet, bet_value: Option<u8> },
    Keno { numbers: Vec<u8>, risk: KenoRisk },
    Slots,
}

impl BetParams {
    pub fn kind(&self) -> GameKind {
        match self {
            BetParams::Dice { .. } => GameKind::Dice,
            BetParams::Crash { .. } => GameKind::Crash,
            BetParams::Plinko { .. } => GameKind::Plinko,
            BetParams::Limbo { .. } => GameKind::Limbo,
            BetParams::Wheel { .. } => GameKind::Wheel,
            BetParams::Roulette { .. } => GameKind::Roulette,
            BetParams::Keno { .. } => GameKind::Keno,
            BetParams::Slots => GameKind::Slots,
        }
    }

    /// Rejects malformed parameters before any balance or round mutation.
    pub fn validate(&self) -> StakehouseResult<()> {
        match self {
            BetParams::Dice { chance } => {
                if !chance.is_finite() || !(1.0..=98.0).contains(chance) {
                    return Err(StakehouseError::validation(
                        "chance must be between 1 and 98",
                    ));
                }
            }
            BetParams::Crash { cashout_at } => {
                if !cashout_at.is_finite() || *cashout_at < 1.0 {
                    return Err(StakehouseError::validation("cashout_at must be at least 1"));
                }
            }
            BetParams::Plinko { rows, .. } => {
                if !(1..=16).contains(rows) {
                    return Err(StakehouseError::validation(
                        "rows must be between 1 and 16",
                    ));
                }
            }
            BetParams::Limbo { target } => {
                if !target.is_finite() || !(1.01..=1000.0).contains(target) {
                    return Err(StakehouseError::validation(
                        "target must be between 1.01 and 1000",
                    ));
                }
            }
            BetParams::Wheel { segments } => {
                if let Some(segments) = segments {
                    wheel::validate_segments(segments)?;
                }
            }
            BetParams::Roulette {
                bet_type,
                bet_value,
            } => {
                roulette::validate_bet(*bet_type, *bet_value)?;
            }
            BetParams::Keno { numbers, .. } => {
                keno::validate_selection(numbers)?;
            }
            BetParams::Slots => {}
        }
        Ok(())
    }
}

/// Result of one engine invocation. Immutable once returned; the same value
/// is sent to the player and persisted verbatim in the wager history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub win: bool,
    pub multiplier: f64,
    #[serde(flatten)]
    pub data: OutcomeData,
}

/// Game-specific outcome payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum OutcomeData {
    Dice {
        roll: f64,
        chance: f64,
    },
    Crash {
        crash_point: f64,
        cashout_at: f64,
    },
    Plinko {
        path: String,
        bucket: usize,
        bucket_multiplier: f64,
        risk: PlinkoRisk,
        rows: u32,
    },
    Limbo {
        result: f64,
        target: f64,
    },
    Wheel {
        segment_index: usize,
        segment_value: String,
        segment_multiplier: f64,
    },
    Roulette {
        result: u8,
        red: bool,
        black: bool,
        zero: bool,
        bet_type: RouletteBet,
        #[serde(skip_serializing_if = "Option::is_none")]
        bet_value: Option<u8>,
    },
    Keno {
        drawn: Vec<u8>,
        selected: Vec<u8>,
        hits: usize,
        risk: KenoRisk,
    },
    Slots {
        reels: Vec<Vec<SlotSymbol>>,
        winning_lines: Vec<LineWin>,
        scatter_count: usize,
        free_spins: u32,
    },
}

/// Resolves a validated single-shot wager. Pure in (params, rigged, draws);
/// never touches storage.
pub fn resolve(params: &BetParams, rigged: bool, draws: &mut impl DrawSource) -> Outcome {
    match params {
        BetParams::Dice { chance } => dice::play(*chance, rigged, draws),
        BetParams::Crash { cashout_at } => crash::play(*cashout_at, rigged, draws),
        BetParams::Plinko { risk, rows } => plinko::play(*risk, *rows, rigged, draws),
        BetParams::Limbo { target } => limbo::play(*target, rigged, draws),
        BetParams::Wheel { segments } => match segments {
            Some(segments) => wheel::play(segments, rigged, draws),
            None => wheel::play(&wheel::default_segments(), rigged, draws),
        },
        BetParams::Roulette {
            bet_type,
            bet_value,
        } => roulette::play(*bet_type, *bet_value, rigged, draws),
        BetParams::Keno { numbers, risk } => keno::play(numbers, *risk, rigged, draws),
        BetParams::Slots => slots::play(rigged, draws),
    }
}
