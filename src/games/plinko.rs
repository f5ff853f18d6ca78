//! Plinko drop: a ball walks left/right down the board and lands in a
//! payout bucket chosen by how many rights it took.

use serde::{Deserialize, Serialize};

use crate::rng::DrawSource;

use super::{edged, Outcome, OutcomeData};

/// Bucket payouts for the standard eight-row board, indexed by bucket.
const LOW_BUCKETS: [f64; 9] = [5.6, 2.1, 1.1, 1.0, 0.5, 1.0, 1.1, 2.1, 5.6];
const MEDIUM_BUCKETS: [f64; 9] = [13.0, 3.0, 1.3, 0.7, 0.4, 0.7, 1.3, 3.0, 13.0];
const HIGH_BUCKETS: [f64; 9] = [29.0, 4.0, 1.5, 0.3, 0.2, 0.3, 1.5, 4.0, 29.0];

/// Centre buckets a corrected drop gets routed into. The centre of every
/// table pays at or below break-even.
const RIG_BUCKETS: [usize; 3] = [3, 4, 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlinkoRisk {
    Low,
    Medium,
    High,
}

impl PlinkoRisk {
    fn buckets(self) -> &'static [f64; 9] {
        match self {
            PlinkoRisk::Low => &LOW_BUCKETS,
            PlinkoRisk::Medium => &MEDIUM_BUCKETS,
            PlinkoRisk::High => &HIGH_BUCKETS,
        }
    }
}

pub(crate) fn play(
    risk: PlinkoRisk,
    rows: u32,
    rigged: bool,
    draws: &mut impl DrawSource,
) -> Outcome {
    let mut path = String::with_capacity(rows as usize);
    let mut position = 0usize;
    for _ in 0..rows {
        if draws.int_below(2) == 1 {
            position += 1;
            path.push('R');
        } else {
            path.push('L');
        }
    }

    let table = risk.buckets();
    let mut bucket = position.min(table.len() - 1);
    if rigged {
        bucket = RIG_BUCKETS[draws.int_below(RIG_BUCKETS.len() as u64) as usize];
    }

    let bucket_multiplier = table[bucket];
    let discounted = edged(bucket_multiplier);
    let win = discounted >= 1.0;

    Outcome {
        win,
        multiplier: if win { discounted } else { 0.0 },
        data: OutcomeData::Plinko {
            path,
            bucket,
            bucket_multiplier,
            risk,
            rows,
        },
    }
}
