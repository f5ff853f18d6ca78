//! European roulette, single draw over 0..=36 with seven bet types.

use serde::{Deserialize, Serialize};

use crate::errors::{StakehouseError, StakehouseResult};
use crate::rng::DrawSource;

use super::{edged, Outcome, OutcomeData};

const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouletteBet {
    Number,
    Red,
    Black,
    Even,
    Odd,
    Low,
    High,
}

pub(crate) fn validate_bet(bet_type: RouletteBet, bet_value: Option<u8>) -> StakehouseResult<()> {
    if bet_type == RouletteBet::Number {
        match bet_value {
            Some(value) if value <= 36 => {}
            Some(_) => {
                return Err(StakehouseError::validation(
                    "bet_value must be between 0 and 36",
                ))
            }
            None => {
                return Err(StakehouseError::validation(
                    "bet_value is required for number bets",
                ))
            }
        }
    }
    Ok(())
}

pub(crate) fn play(
    bet_type: RouletteBet,
    bet_value: Option<u8>,
    rigged: bool,
    draws: &mut impl DrawSource,
) -> Outcome {
    let mut result = draws.int_below(37) as u8;

    // Each bet type gets its own nudge; low and high stay untouched.
    if rigged {
        match bet_type {
            RouletteBet::Red => {
                if RED_NUMBERS.contains(&result) {
                    result = 0;
                }
            }
            RouletteBet::Black => {
                if !RED_NUMBERS.contains(&result) && result != 0 {
                    result = RED_NUMBERS[draws.int_below(RED_NUMBERS.len() as u64) as usize];
                }
            }
            RouletteBet::Even => {
                if result % 2 == 0 && result != 0 {
                    result += 1;
                }
                if result > 36 {
                    result = 1;
                }
            }
            RouletteBet::Odd => {
                if result % 2 == 1 {
                    result += 1;
                }
                if result > 36 {
                    result = 0;
                }
            }
            RouletteBet::Number => {
                if let Some(value) = bet_value {
                    if result == value {
                        result = (value + 1) % 37;
                    }
                }
            }
            RouletteBet::Low | RouletteBet::High => {}
        }
    }

    let zero = result == 0;
    let red = RED_NUMBERS.contains(&result);
    let black = !zero && !red;
    let even = result != 0 && result % 2 == 0;
    let odd = result % 2 == 1;
    let low = (1..=18).contains(&result);
    let high = (19..=36).contains(&result);

    let (win, base_multiplier) = match bet_type {
        RouletteBet::Number => (bet_value == Some(result), 35.0),
        RouletteBet::Red => (red, 2.0),
        RouletteBet::Black => (black, 2.0),
        RouletteBet::Even => (even, 2.0),
        RouletteBet::Odd => (odd, 2.0),
        RouletteBet::Low => (low, 2.0),
        RouletteBet::High => (high, 2.0),
    };

    Outcome {
        win,
        multiplier: if win { edged(base_multiplier) } else { 0.0 },
        data: OutcomeData::Roulette {
            result,
            red,
            black,
            zero,
            bet_type,
            bet_value,
        },
    }
}
