//! Keno: ten unique numbers drawn from 1..=40, paid by how many of the
//! player's picks were hit.

use serde::{Deserialize, Serialize};

use crate::errors::{StakehouseError, StakehouseResult};
use crate::rng::DrawSource;

use super::{edged, Outcome, OutcomeData};

const DRAW_COUNT: usize = 10;
const POOL_MAX: u64 = 40;
const MAX_SELECTION: usize = 10;

/// Payout rows indexed by (selected count - 1), then by hit count.
/// Classic and medium share a table.
const CLASSIC_TABLE: [&[f64]; 10] = [
    &[0.0, 3.8],
    &[0.0, 1.9, 5.5],
    &[0.0, 1.2, 2.5, 26.0],
    &[0.0, 0.5, 2.0, 6.0, 91.0],
    &[0.0, 0.3, 1.5, 3.0, 15.0, 300.0],
    &[0.0, 0.2, 1.0, 2.0, 6.0, 50.0, 1000.0],
    &[0.0, 0.2, 0.5, 1.5, 3.0, 15.0, 100.0, 2500.0],
    &[0.0, 0.2, 0.5, 1.0, 2.0, 8.0, 50.0, 500.0, 5000.0],
    &[0.0, 0.2, 0.3, 0.5, 1.5, 4.0, 20.0, 100.0, 1500.0, 10000.0],
    &[0.0, 0.2, 0.3, 0.5, 1.0, 3.0, 10.0, 50.0, 500.0, 5000.0, 25000.0],
];

const LOW_TABLE: [&[f64]; 10] = [
    &[0.0, 2.9],
    &[0.0, 1.4, 3.5],
    &[0.0, 1.1, 1.8, 15.0],
    &[0.0, 0.4, 1.5, 4.0, 50.0],
    &[0.0, 0.3, 1.2, 2.5, 10.0, 180.0],
    &[0.0, 0.2, 0.8, 1.8, 5.0, 35.0, 600.0],
    &[0.0, 0.2, 0.5, 1.2, 2.5, 10.0, 75.0, 1500.0],
    &[0.0, 0.2, 0.4, 1.0, 1.8, 6.0, 35.0, 350.0, 3000.0],
    &[0.0, 0.2, 0.3, 0.5, 1.2, 3.0, 15.0, 75.0, 1000.0, 6000.0],
    &[0.0, 0.2, 0.3, 0.4, 1.0, 2.5, 8.0, 40.0, 400.0, 3500.0, 15000.0],
];

const HIGH_TABLE: [&[f64]; 10] = [
    &[0.0, 4.9],
    &[0.0, 2.5, 8.0],
    &[0.0, 1.5, 3.5, 40.0],
    &[0.0, 0.6, 2.5, 9.0, 150.0],
    &[0.0, 0.4, 2.0, 4.0, 25.0, 500.0],
    &[0.0, 0.3, 1.2, 3.0, 10.0, 80.0, 1800.0],
    &[0.0, 0.2, 0.6, 2.0, 5.0, 25.0, 180.0, 4500.0],
    &[0.0, 0.2, 0.5, 1.5, 3.0, 12.0, 80.0, 800.0, 10000.0],
    &[0.0, 0.2, 0.4, 0.8, 2.0, 6.0, 35.0, 200.0, 2500.0, 20000.0],
    &[0.0, 0.2, 0.3, 0.6, 1.5, 5.0, 15.0, 80.0, 800.0, 10000.0, 50000.0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KenoRisk {
    Low,
    Classic,
    Medium,
    High,
}

impl KenoRisk {
    fn paytable(self) -> &'static [&'static [f64]; 10] {
        match self {
            KenoRisk::Low => &LOW_TABLE,
            KenoRisk::Classic | KenoRisk::Medium => &CLASSIC_TABLE,
            KenoRisk::High => &HIGH_TABLE,
        }
    }
}

pub(crate) fn validate_selection(numbers: &[u8]) -> StakehouseResult<()> {
    if numbers.is_empty() || numbers.len() > MAX_SELECTION {
        return Err(StakehouseError::validation(
            "select between 1 and 10 numbers",
        ));
    }
    if numbers.iter().any(|n| !(1..=40).contains(n)) {
        return Err(StakehouseError::validation(
            "numbers must be between 1 and 40",
        ));
    }
    for (index, number) in numbers.iter().enumerate() {
        if numbers[..index].contains(number) {
            return Err(StakehouseError::validation(
                "duplicate numbers are not allowed",
            ));
        }
    }
    Ok(())
}

pub(crate) fn play(
    numbers: &[u8],
    risk: KenoRisk,
    rigged: bool,
    draws: &mut impl DrawSource,
) -> Outcome {
    // Rejection sampling; repeats burn a draw and try again.
    let mut drawn: Vec<u8> = Vec::with_capacity(DRAW_COUNT);
    while drawn.len() < DRAW_COUNT {
        let candidate = draws.int_in(1, POOL_MAX + 1) as u8;
        if !drawn.contains(&candidate) {
            drawn.push(candidate);
        }
    }

    let mut hits = numbers.iter().filter(|n| drawn.contains(n)).count();
    if rigged && hits > 2 {
        hits = draws.int_below(3) as usize;
    }

    drawn.sort_unstable();

    let row = risk.paytable()[numbers.len() - 1];
    let base_multiplier = row.get(hits).copied().unwrap_or(0.0);
    let multiplier = edged(base_multiplier);

    Outcome {
        win: multiplier > 0.0,
        multiplier,
        data: OutcomeData::Keno {
            drawn,
            selected: numbers.to_vec(),
            hits,
            risk,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedDraws;

    fn keno_data(outcome: &Outcome) -> (Vec<u8>, usize) {
        match &outcome.data {
            OutcomeData::Keno { drawn, hits, .. } => (drawn.clone(), *hits),
            other => panic!("expected keno payload, got {other:?}"),
        }
    }

    #[test]
    fn full_three_pick_hit_pays_the_classic_row() {
        let mut draws = ScriptedDraws::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let outcome = play(&[1, 2, 3], KenoRisk::Classic, false, &mut draws);

        let (drawn, hits) = keno_data(&outcome);
        assert_eq!(drawn, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(hits, 3);
        assert!(outcome.win);
        assert_eq!(outcome.multiplier, 26.0 * 0.98);
    }

    #[test]
    fn partial_hits_index_the_same_row() {
        let mut draws = ScriptedDraws::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let outcome = play(&[1, 2, 39], KenoRisk::Classic, false, &mut draws);

        assert_eq!(keno_data(&outcome).1, 2);
        assert!(outcome.win);
        assert_eq!(outcome.multiplier, 2.45);
    }

    #[test]
    fn zero_hits_lose_with_zero_multiplier() {
        let mut draws = ScriptedDraws::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let outcome = play(&[39], KenoRisk::Classic, false, &mut draws);

        assert_eq!(keno_data(&outcome).1, 0);
        assert!(!outcome.win);
        assert_eq!(outcome.multiplier, 0.0);
    }

    #[test]
    fn repeated_draws_are_rejected_and_redrawn() {
        let mut draws = ScriptedDraws::new([5, 5, 5, 1, 2, 3, 4, 6, 7, 8, 9, 10]);
        let outcome = play(&[40], KenoRisk::Classic, false, &mut draws);

        let (drawn, _) = keno_data(&outcome);
        assert_eq!(drawn, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(draws.remaining(), 0);
    }

    #[test]
    fn rig_redraws_hit_counts_above_two() {
        let mut draws = ScriptedDraws::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 0]);
        let outcome = play(&[1, 2, 3], KenoRisk::Classic, true, &mut draws);

        // Three genuine hits collapse to the corrected count of zero.
        assert_eq!(keno_data(&outcome).1, 0);
        assert!(!outcome.win);
        assert_eq!(draws.remaining(), 0);
    }

    #[test]
    fn rig_can_still_leave_a_small_paying_count() {
        let mut draws = ScriptedDraws::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 2]);
        let outcome = play(&[1, 2, 3], KenoRisk::Classic, true, &mut draws);

        assert_eq!(keno_data(&outcome).1, 2);
        assert!(outcome.win);
        assert_eq!(outcome.multiplier, 2.45);
    }

    #[test]
    fn rig_skips_hit_counts_of_two_or_fewer() {
        let mut draws = ScriptedDraws::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let outcome = play(&[1, 2], KenoRisk::Classic, true, &mut draws);

        assert_eq!(keno_data(&outcome).1, 2);
        assert!(outcome.win);
        assert_eq!(draws.remaining(), 0);
    }

    #[test]
    fn low_and_high_tables_differ_from_classic() {
        let mut draws = ScriptedDraws::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let outcome = play(&[1], KenoRisk::High, false, &mut draws);
        assert_eq!(outcome.multiplier, 4.9 * 0.98);

        let mut draws = ScriptedDraws::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let outcome = play(&[1], KenoRisk::Low, false, &mut draws);
        assert_eq!(outcome.multiplier, 2.9 * 0.98);

        let mut draws = ScriptedDraws::new([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let outcome = play(&[1], KenoRisk::Medium, false, &mut draws);
        assert_eq!(outcome.multiplier, 3.8 * 0.98);
    }

    #[test]
    fn selection_validation() {
        assert!(validate_selection(&[]).is_err());
        assert!(validate_selection(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]).is_err());
        assert!(validate_selection(&[0]).is_err());
        assert!(validate_selection(&[41]).is_err());
        assert!(validate_selection(&[7, 7]).is_err());
        assert!(validate_selection(&[1, 40]).is_ok());
    }
}
