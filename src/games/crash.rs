//! Crash: the curve busts at a drawn point; an early enough cashout wins.
//!
//! The house edge sits inside the crash point distribution itself (the floor
//! puts ~1% of the mass on an instant 1.00 bust), so a winning multiplier is
//! the cashout target with no extra discount.

use crate::games::{Outcome, OutcomeData};
use crate::rng::DrawSource;

const POINT_CAP: f64 = 100.0;

pub(crate) fn play(cashout_at: f64, rigged: bool, draws: &mut impl DrawSource) -> Outcome {
    let r = draws.int_below(10_000) as f64 / 10_000.0;
    let mut point = ((100.0 * (1.0 / (1.0 - r))).floor() / 100.0).max(1.0);

    if rigged {
        point = point.min(1.0 + draws.int_below(150) as f64 / 100.0);
    }

    if point > POINT_CAP {
        point = POINT_CAP;
    }

    let win = cashout_at <= point;
    let multiplier = if win { cashout_at } else { 0.0 };

    Outcome {
        win,
        multiplier,
        data: OutcomeData::Crash {
            crash_point: point,
            cashout_at,
        },
    }
}
