//! Five-reel slot machine: weighted symbols on a 5x3 grid, twenty fixed
//! paylines scored on left-anchored runs, scatter bonus and free spins.

use serde::{Deserialize, Serialize};

use crate::rng::DrawSource;

use super::{edged, Outcome, OutcomeData};

const REEL_COLS: usize = 5;
const REEL_ROWS: usize = 3;
const TOTAL_WEIGHT: u64 = 100;

const SYMBOL_WEIGHTS: [(SlotSymbol, u64); 8] = [
    (SlotSymbol::Cherry, 25),
    (SlotSymbol::Lemon, 22),
    (SlotSymbol::Orange, 20),
    (SlotSymbol::Plum, 18),
    (SlotSymbol::Bell, 10),
    (SlotSymbol::Bar, 3),
    (SlotSymbol::Seven, 1),
    (SlotSymbol::Scatter, 1),
];

/// Row index per column for each payline, top row 0.
const PAYLINES: [[usize; 5]; 20] = [
    [1, 1, 1, 1, 1],
    [0, 0, 0, 0, 0],
    [2, 2, 2, 2, 2],
    [0, 1, 2, 1, 0],
    [2, 1, 0, 1, 2],
    [0, 0, 1, 2, 2],
    [2, 2, 1, 0, 0],
    [1, 0, 0, 0, 1],
    [1, 2, 2, 2, 1],
    [0, 1, 1, 1, 0],
    [2, 1, 1, 1, 2],
    [1, 1, 0, 1, 1],
    [1, 1, 2, 1, 1],
    [0, 1, 0, 1, 0],
    [2, 1, 2, 1, 2],
    [0, 0, 1, 0, 0],
    [2, 2, 1, 2, 2],
    [1, 0, 1, 2, 1],
    [1, 2, 1, 0, 1],
    [0, 2, 0, 2, 0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotSymbol {
    Cherry,
    Lemon,
    Orange,
    Plum,
    Bell,
    Bar,
    Seven,
    Scatter,
}

impl SlotSymbol {
    /// Line payout for a left-anchored run of `count` copies. Scatter pays
    /// through the bonus path, never on a line.
    fn line_payout(self, count: usize) -> f64 {
        let row: [f64; 3] = match self {
            SlotSymbol::Cherry | SlotSymbol::Lemon => [2.0, 5.0, 15.0],
            SlotSymbol::Orange => [3.0, 8.0, 20.0],
            SlotSymbol::Plum => [4.0, 10.0, 25.0],
            SlotSymbol::Bell => [10.0, 25.0, 75.0],
            SlotSymbol::Bar => [25.0, 75.0, 250.0],
            SlotSymbol::Seven => [50.0, 150.0, 500.0],
            SlotSymbol::Scatter => return 0.0,
        };
        match count {
            3 => row[0],
            4 => row[1],
            5 => row[2],
            _ => 0.0,
        }
    }
}

/// One paying line in a spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWin {
    pub line: usize,
    pub symbol: SlotSymbol,
    pub count: usize,
    pub multiplier: f64,
}

fn draw_symbol(draws: &mut impl DrawSource) -> SlotSymbol {
    let mut remaining = draws.int_below(TOTAL_WEIGHT);
    for (symbol, weight) in SYMBOL_WEIGHTS {
        if remaining < weight {
            return symbol;
        }
        remaining -= weight;
    }
    SlotSymbol::Cherry
}

pub(crate) fn play(rigged: bool, draws: &mut impl DrawSource) -> Outcome {
    let mut reels: Vec<Vec<SlotSymbol>> = Vec::with_capacity(REEL_COLS);
    for _ in 0..REEL_COLS {
        let mut reel = Vec::with_capacity(REEL_ROWS);
        for _ in 0..REEL_ROWS {
            reel.push(draw_symbol(draws));
        }
        reels.push(reel);
    }

    let scatter_count = reels
        .iter()
        .flatten()
        .filter(|s| **s == SlotSymbol::Scatter)
        .count();

    let mut total_multiplier = 0.0;
    let mut winning_lines = Vec::new();

    for (index, rows) in PAYLINES.iter().enumerate() {
        let first = reels[0][rows[0]];
        if first == SlotSymbol::Scatter {
            continue;
        }

        let mut count = 1;
        for col in 1..REEL_COLS {
            if reels[col][rows[col]] == first {
                count += 1;
            } else {
                break;
            }
        }

        if count >= 3 {
            let line_multiplier = first.line_payout(count);
            if line_multiplier > 0.0 {
                total_multiplier += line_multiplier;
                winning_lines.push(LineWin {
                    line: index + 1,
                    symbol: first,
                    count,
                    multiplier: line_multiplier,
                });
            }
        }
    }

    let free_spins = match scatter_count {
        0..=2 => 0,
        3 => 10,
        4 => 15,
        _ => 20,
    };
    if scatter_count >= 3 {
        let bonus = match scatter_count {
            3 => 5.0,
            4 => 20.0,
            _ => 50.0,
        };
        total_multiplier += bonus;
    }

    // Correction caps a big spin; the free spins and scatters survive it.
    if rigged && total_multiplier > 5.0 {
        total_multiplier = draws.int_below(3) as f64;
        winning_lines.clear();
    }

    let final_multiplier = edged(total_multiplier);

    Outcome {
        win: final_multiplier > 0.0,
        multiplier: final_multiplier,
        data: OutcomeData::Slots {
            reels,
            winning_lines,
            scatter_count,
            free_spins,
        },
    }
}
