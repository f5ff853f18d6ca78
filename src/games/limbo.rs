//! Limbo: the player names a target multiplier and wins if the drawn
//! result reaches it.

use crate::rng::DrawSource;

use super::{edged, Outcome, OutcomeData};

pub(crate) fn play(target: f64, rigged: bool, draws: &mut impl DrawSource) -> Outcome {
    let r = draws.int_in(1, 10_001) as f64 / 10_000.0;
    let mut result = ((100.0 * (1.0 / r)).floor() / 100.0).max(1.0);

    // Correction pins the result one tick under the target, never below 1.
    if rigged {
        result = result.min(target - 0.01);
        if result < 1.0 {
            result = 1.0;
        }
    }

    let win = result >= target;
    Outcome {
        win,
        multiplier: if win { edged(target) } else { 0.0 },
        data: OutcomeData::Limbo { result, target },
    }
}
