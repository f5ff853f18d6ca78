//! Dice: roll under the chosen threshold to win.

use crate::games::{edged, Outcome, OutcomeData};
use crate::rng::DrawSource;

/// Rolls in [0, 100) at 0.01 resolution. The rig correction bumps the roll
/// to at least one whole point above the threshold, which always loses.
pub(crate) fn play(chance: f64, rigged: bool, draws: &mut impl DrawSource) -> Outcome {
    let mut roll = draws.int_below(10_000) as f64 / 100.0;

    if rigged {
        roll = chance + draws.int_in(1, 50) as f64;
        if roll > 99.99 {
            roll = 99.99;
        }
    }

    let win = roll < chance;
    let multiplier = if win { edged(100.0 / chance) } else { 0.0 };

    Outcome {
        win,
        multiplier,
        data: OutcomeData::Dice { roll, chance },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedDraws;

    #[test]
    fn roll_under_chance_wins_with_edged_multiplier() {
        let mut draws = ScriptedDraws::new([4000]);
        let outcome = play(50.0, false, &mut draws);
        assert!(outcome.win);
        assert_eq!(outcome.multiplier, 1.96);
        match outcome.data {
            OutcomeData::Dice { roll, chance } => {
                assert_eq!(roll, 40.0);
                assert_eq!(chance, 50.0);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn roll_at_or_over_chance_loses_with_zero_multiplier() {
        let mut draws = ScriptedDraws::new([5000]);
        let outcome = play(50.0, false, &mut draws);
        assert!(!outcome.win);
        assert_eq!(outcome.multiplier, 0.0);
    }

    #[test]
    fn rigged_roll_lands_just_above_the_threshold() {
        // Fair draw is consumed first, then the correction overwrites it.
        let mut draws = ScriptedDraws::new([100, 1]);
        let outcome = play(50.0, true, &mut draws);
        assert!(!outcome.win);
        match outcome.data {
            OutcomeData::Dice { roll, .. } => assert_eq!(roll, 51.0),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn rigged_roll_caps_at_99_99() {
        let mut draws = ScriptedDraws::new([0, 49]);
        let outcome = play(98.0, true, &mut draws);
        assert!(!outcome.win);
        match outcome.data {
            OutcomeData::Dice { roll, .. } => assert_eq!(roll, 99.99),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn winning_multiplier_never_exceeds_fair_value() {
        for chance in [1.0_f64, 10.0, 49.5, 98.0] {
            let mut draws = ScriptedDraws::new([0]);
            let outcome = play(chance, false, &mut draws);
            assert!(outcome.win);
            assert!(outcome.multiplier <= 100.0 / chance);
        }
    }
}
