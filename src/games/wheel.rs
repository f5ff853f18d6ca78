//! Weighted wheel spin over the house table or a player-supplied one.

use serde::{Deserialize, Serialize};

use crate::errors::{StakehouseError, StakehouseResult};
use crate::rng::DrawSource;

use super::{edged, Outcome, OutcomeData};

/// Upper bound on custom segment tables.
pub const MAX_SEGMENTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelSegment {
    pub value: String,
    pub multiplier: f64,
    pub weight: u32,
}

impl WheelSegment {
    fn new(value: &str, multiplier: f64, weight: u32) -> Self {
        Self {
            value: value.to_string(),
            multiplier,
            weight,
        }
    }
}

/// The house wheel used when a request carries no custom table.
pub fn default_segments() -> Vec<WheelSegment> {
    vec![
        WheelSegment::new("0x", 0.0, 10),
        WheelSegment::new("1.2x", 1.2, 30),
        WheelSegment::new("1.5x", 1.5, 25),
        WheelSegment::new("2x", 2.0, 20),
        WheelSegment::new("3x", 3.0, 10),
        WheelSegment::new("10x", 10.0, 5),
    ]
}

pub(crate) fn validate_segments(segments: &[WheelSegment]) -> StakehouseResult<()> {
    if segments.is_empty() {
        return Err(StakehouseError::validation(
            "segments must contain at least one entry",
        ));
    }
    if segments.len() > MAX_SEGMENTS {
        return Err(StakehouseError::validation(format!(
            "segments must contain at most {MAX_SEGMENTS} entries"
        )));
    }
    for segment in segments {
        if !segment.multiplier.is_finite() || segment.multiplier < 0.0 {
            return Err(StakehouseError::validation(
                "segment multiplier must be non-negative",
            ));
        }
        if segment.weight == 0 {
            return Err(StakehouseError::validation(
                "segment weight must be at least 1",
            ));
        }
    }
    Ok(())
}

pub(crate) fn play(
    segments: &[WheelSegment],
    rigged: bool,
    draws: &mut impl DrawSource,
) -> Outcome {
    let total_weight: u64 = segments.iter().map(|s| u64::from(s.weight)).sum();
    let mut spin = draws.int_below(total_weight);

    // Correction moves the spin to the start of the first sub-1x segment.
    // A table with no such segment spins untouched.
    if rigged {
        let mut cumulative = 0u64;
        for segment in segments {
            if segment.multiplier < 1.0 {
                spin = cumulative;
                break;
            }
            cumulative += u64::from(segment.weight);
        }
    }

    let mut cumulative = 0u64;
    let mut winner = &segments[0];
    let mut winner_index = 0usize;
    for (index, segment) in segments.iter().enumerate() {
        cumulative += u64::from(segment.weight);
        if spin < cumulative {
            winner = segment;
            winner_index = index;
            break;
        }
    }

    Outcome {
        win: winner.multiplier > 0.0,
        multiplier: edged(winner.multiplier),
        data: OutcomeData::Wheel {
            segment_index: winner_index,
            segment_value: winner.value.clone(),
            segment_multiplier: winner.multiplier,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedDraws;

    fn landed_index(outcome: &Outcome) -> usize {
        match outcome.data {
            OutcomeData::Wheel { segment_index, .. } => segment_index,
            ref other => panic!("expected wheel payload, got {other:?}"),
        }
    }

    #[test]
    fn spin_walks_cumulative_weights() {
        // Default weights are 10/30/25/20/10/5; spin 9 is still the first
        // segment, spin 10 tips into the second.
        let segments = default_segments();

        let mut draws = ScriptedDraws::new([9]);
        assert_eq!(landed_index(&play(&segments, false, &mut draws)), 0);

        let mut draws = ScriptedDraws::new([10]);
        let outcome = play(&segments, false, &mut draws);
        assert_eq!(landed_index(&outcome), 1);
        assert!(outcome.win);
        assert_eq!(outcome.multiplier, 1.176);
    }

    #[test]
    fn top_segment_pays_discounted_ten() {
        let segments = default_segments();
        let mut draws = ScriptedDraws::new([95]);
        let outcome = play(&segments, false, &mut draws);

        assert_eq!(landed_index(&outcome), 5);
        assert!(outcome.win);
        assert_eq!(outcome.multiplier, 9.8);
    }

    #[test]
    fn zero_segment_is_a_loss_with_zero_multiplier() {
        let segments = default_segments();
        let mut draws = ScriptedDraws::new([0]);
        let outcome = play(&segments, false, &mut draws);

        assert!(!outcome.win);
        assert_eq!(outcome.multiplier, 0.0);
    }

    #[test]
    fn rig_moves_a_winning_spin_onto_the_zero_segment() {
        let segments = default_segments();
        let mut draws = ScriptedDraws::new([95]);
        let outcome = play(&segments, true, &mut draws);

        assert_eq!(landed_index(&outcome), 0);
        assert!(!outcome.win);
        // Repositioning reuses the fair draw.
        assert_eq!(draws.remaining(), 0);
    }

    #[test]
    fn rig_is_inert_when_every_segment_pays_at_least_even() {
        let segments = vec![
            WheelSegment::new("2x", 2.0, 1),
            WheelSegment::new("3x", 3.0, 1),
        ];
        let mut draws = ScriptedDraws::new([1]);
        let outcome = play(&segments, true, &mut draws);

        assert_eq!(landed_index(&outcome), 1);
        assert!(outcome.win);
        assert_eq!(outcome.multiplier, 2.94);
    }

    #[test]
    fn sub_even_segment_still_counts_as_a_win() {
        let segments = vec![WheelSegment::new("0.5x", 0.5, 1)];
        let mut draws = ScriptedDraws::new([0]);
        let outcome = play(&segments, false, &mut draws);

        assert!(outcome.win);
        assert_eq!(outcome.multiplier, 0.5 * 0.98);
    }

    #[test]
    fn segment_table_validation() {
        assert!(validate_segments(&[]).is_err());
        assert!(validate_segments(&[WheelSegment::new("bad", -1.0, 1)]).is_err());
        assert!(validate_segments(&[WheelSegment::new("bad", 1.0, 0)]).is_err());
        let oversized = vec![WheelSegment::new("1x", 1.0, 1); MAX_SEGMENTS + 1];
        assert!(validate_segments(&oversized).is_err());
        assert!(validate_segments(&default_segments()).is_ok());
    }
}
