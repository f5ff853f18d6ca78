//! Mines round state: mine placement, reveal resolution and the
//! geometric multiplier growth used at cashout.

use serde::{Deserialize, Serialize};

use crate::errors::{StakehouseError, StakehouseResult};
use crate::rng::DrawSource;

use super::HOUSE_EDGE;

pub const GRID_SIZE: u8 = 25;

/// Outcome of revealing one tile.
#[derive(Debug, Clone, PartialEq)]
pub enum MinesReveal {
    /// The round is over; the full mine layout goes back to the player.
    Mine { mines: Vec<u8> },
    Safe { multiplier: f64, can_cashout: bool },
}

/// Persistent state of one mines round, stored with its stake for the
/// lifetime of the round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinesState {
    pub mines: Vec<u8>,
    pub mine_count: u8,
    pub revealed: Vec<u8>,
    pub grid_size: u8,
}

impl MinesState {
    /// Places `mine_count` distinct mines uniformly over the grid.
    /// Callers validate the count; anything in 1..=24 terminates.
    pub fn init(mine_count: u8, draws: &mut impl DrawSource) -> Self {
        debug_assert!((1..GRID_SIZE).contains(&mine_count));
        let mut mines = Vec::with_capacity(mine_count as usize);
        while mines.len() < mine_count as usize {
            let candidate = draws.int_below(u64::from(GRID_SIZE)) as u8;
            if !mines.contains(&candidate) {
                mines.push(candidate);
            }
        }
        Self {
            mines,
            mine_count,
            revealed: Vec::new(),
            grid_size: GRID_SIZE,
        }
    }

    fn growth_multiplier(&self, revealed_count: usize) -> f64 {
        let grid = f64::from(self.grid_size);
        let safe = f64::from(self.grid_size - self.mine_count);
        (grid / safe).powi(revealed_count as i32) * (1.0 - HOUSE_EDGE)
    }

    /// Resolves one reveal, mutating the revealed list. The tile is recorded
    /// even when it busts the round, so history shows the fatal pick.
    pub fn reveal(
        &mut self,
        position: u8,
        rigged: bool,
        draws: &mut impl DrawSource,
    ) -> StakehouseResult<MinesReveal> {
        if self.revealed.contains(&position) {
            return Err(StakehouseError::conflict("position already revealed"));
        }

        let mut hit_mine = self.mines.contains(&position);

        // Correction only ever turns a fair-safe reveal into a bust, never
        // the reverse, and only once two tiles are already open.
        if rigged && !hit_mine && self.revealed.len() >= 2 && draws.int_below(100) < 40 {
            hit_mine = true;
        }

        self.revealed.push(position);

        if hit_mine {
            return Ok(MinesReveal::Mine {
                mines: self.mines.clone(),
            });
        }

        let safe_cells = usize::from(self.grid_size - self.mine_count);
        let remaining = safe_cells - self.revealed.len();
        Ok(MinesReveal::Safe {
            multiplier: self.growth_multiplier(self.revealed.len()),
            can_cashout: remaining > 0,
        })
    }

    /// Multiplier a cashout would pay right now; `None` before any reveal.
    pub fn cashout_multiplier(&self) -> Option<f64> {
        if self.revealed.is_empty() {
            return None;
        }
        Some(self.growth_multiplier(self.revealed.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedDraws;

    fn state_with_mines(mines: &[u8]) -> MinesState {
        MinesState {
            mines: mines.to_vec(),
            mine_count: mines.len() as u8,
            revealed: Vec::new(),
            grid_size: GRID_SIZE,
        }
    }

    #[test]
    fn init_places_distinct_mines_via_rejection() {
        let mut draws = ScriptedDraws::new([7, 7, 3, 7, 11]);
        let state = MinesState::init(3, &mut draws);

        assert_eq!(state.mines, vec![7, 3, 11]);
        assert_eq!(state.mine_count, 3);
        assert!(state.revealed.is_empty());
        assert_eq!(draws.remaining(), 0);
    }

    #[test]
    fn safe_reveal_grows_the_multiplier_geometrically() {
        let mut state = state_with_mines(&[20, 21, 22, 23, 24]);
        let mut draws = ScriptedDraws::new([]);

        let reveal = state.reveal(0, false, &mut draws).unwrap();
        assert_eq!(
            reveal,
            MinesReveal::Safe {
                multiplier: 1.225,
                can_cashout: true,
            }
        );
        assert_eq!(state.revealed, vec![0]);
    }

    #[test]
    fn second_safe_reveal_squares_the_growth_term() {
        let mut state = state_with_mines(&[22, 23, 24]);
        let mut draws = ScriptedDraws::new([]);

        state.reveal(0, false, &mut draws).unwrap();
        let reveal = state.reveal(1, false, &mut draws).unwrap();

        match reveal {
            MinesReveal::Safe { multiplier, .. } => {
                assert_eq!(multiplier, 1.2654958677685952);
            }
            other => panic!("expected safe reveal, got {other:?}"),
        }
    }

    #[test]
    fn revealing_a_mine_busts_and_still_records_the_tile() {
        let mut state = state_with_mines(&[4]);
        let mut draws = ScriptedDraws::new([]);

        let reveal = state.reveal(4, false, &mut draws).unwrap();
        assert_eq!(reveal, MinesReveal::Mine { mines: vec![4] });
        assert_eq!(state.revealed, vec![4]);
    }

    #[test]
    fn duplicate_reveal_is_rejected_without_mutation() {
        let mut state = state_with_mines(&[24]);
        let mut draws = ScriptedDraws::new([]);

        state.reveal(3, false, &mut draws).unwrap();
        let err = state.reveal(3, false, &mut draws).unwrap_err();

        assert!(err.to_string().contains("already revealed"));
        assert_eq!(state.revealed, vec![3]);
    }

    #[test]
    fn rig_draw_only_starts_after_two_open_tiles() {
        let mut state = state_with_mines(&[24]);
        let mut draws = ScriptedDraws::new([39]);

        // First two reveals are exempt and burn no correction draw.
        state.reveal(0, true, &mut draws).unwrap();
        state.reveal(1, true, &mut draws).unwrap();
        assert_eq!(draws.remaining(), 1);

        // Third reveal draws 39 < 40 and converts safe into a bust.
        let reveal = state.reveal(2, true, &mut draws).unwrap();
        assert_eq!(reveal, MinesReveal::Mine { mines: vec![24] });
        assert_eq!(state.revealed, vec![0, 1, 2]);
        assert_eq!(draws.remaining(), 0);
    }

    #[test]
    fn rig_draw_at_forty_or_more_leaves_the_tile_safe() {
        let mut state = state_with_mines(&[24]);
        let mut draws = ScriptedDraws::new([40]);

        state.reveal(0, true, &mut draws).unwrap();
        state.reveal(1, true, &mut draws).unwrap();
        let reveal = state.reveal(2, true, &mut draws).unwrap();

        assert!(matches!(reveal, MinesReveal::Safe { .. }));
    }

    #[test]
    fn rig_never_rescues_a_real_mine() {
        let mut state = state_with_mines(&[2]);
        let mut draws = ScriptedDraws::new([]);

        state.reveal(0, true, &mut draws).unwrap();
        state.reveal(1, true, &mut draws).unwrap();
        // The fair result is already a mine; no correction draw is taken.
        let reveal = state.reveal(2, true, &mut draws).unwrap();

        assert_eq!(reveal, MinesReveal::Mine { mines: vec![2] });
    }

    #[test]
    fn cashout_multiplier_requires_at_least_one_reveal() {
        let mut state = state_with_mines(&[24, 23, 22]);
        assert_eq!(state.cashout_multiplier(), None);

        let mut draws = ScriptedDraws::new([]);
        state.reveal(0, false, &mut draws).unwrap();
        state.reveal(1, false, &mut draws).unwrap();
        assert_eq!(state.cashout_multiplier(), Some(1.2654958677685952));
    }

    #[test]
    fn exhausting_the_safe_cells_ends_cashout_eligibility() {
        // 23 mines leave exactly two safe tiles.
        let mines: Vec<u8> = (2..GRID_SIZE).collect();
        let mut state = state_with_mines(&mines);
        let mut draws = ScriptedDraws::new([]);

        match state.reveal(0, false, &mut draws).unwrap() {
            MinesReveal::Safe { can_cashout, .. } => assert!(can_cashout),
            other => panic!("expected safe reveal, got {other:?}"),
        }
        match state.reveal(1, false, &mut draws).unwrap() {
            MinesReveal::Safe { can_cashout, .. } => assert!(!can_cashout),
            other => panic!("expected safe reveal, got {other:?}"),
        }
    }
}
