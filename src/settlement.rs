//! Bet settlement orchestration: the wager lifecycle shared by every game.
//!
//! A settlement validates the request, debits the stake, resolves the
//! outcome, credits any payout and records history plus ledger lines. The
//! stake leaves the balance before the draw happens; a storage failure
//! between debit and credit leaves the player debited with no recorded
//! outcome, which is logged at error level rather than silently retried.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::casino_store;
use crate::errors::{StakehouseError, StakehouseResult};
use crate::games::mines::{MinesReveal, MinesState, GRID_SIZE};
use crate::games::{self, BetParams, Outcome};
use crate::models::{ActiveRound, GameKind, HistoryRecord, LedgerEntry, LedgerKind};
use crate::rig::{should_rig, RigProfile};
use crate::rng::DrawSource;
use crate::storage::Store;

/// Completed single-shot wager, ready to be shaped into a response.
#[derive(Debug, Clone)]
pub struct SettledBet {
    pub outcome: Outcome,
    pub stake_cents: i64,
    pub payout_cents: i64,
    pub new_balance_cents: i64,
}

#[derive(Debug, Clone)]
pub struct MinesStart {
    pub mine_count: u8,
    pub new_balance_cents: i64,
    /// True when a stale round was thrown away to make room.
    pub discarded_stale: bool,
}

#[derive(Debug, Clone)]
pub enum MinesRevealOutcome {
    Safe {
        multiplier: f64,
        can_cashout: bool,
        revealed_count: usize,
        new_balance_cents: i64,
    },
    Bust {
        position: u8,
        mines: Vec<u8>,
        new_balance_cents: i64,
    },
}

#[derive(Debug, Clone)]
pub struct MinesCashout {
    pub multiplier: f64,
    pub payout_cents: i64,
    pub new_balance_cents: i64,
}

/// Operator-initiated balance change.
#[derive(Debug, Clone, Copy)]
pub enum BalanceChange {
    /// Signed delta in cents.
    Adjust(i64),
    /// Absolute target balance in cents.
    Set(i64),
}

/// Serializes wagers per player, rounds per (player, game), and player
/// creation per username.
///
/// Lock order is round lock first, balance lock second, everywhere; the
/// username lock is never held together with either. All storage work
/// inside a critical section is synchronous; nothing awaits while a lock
/// is held.
pub struct SettlementManager {
    store: Store,
    balance_locks: DashMap<String, Arc<Mutex<()>>>,
    round_locks: DashMap<(String, GameKind), Arc<Mutex<()>>>,
    username_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SettlementManager {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            balance_locks: DashMap::new(),
            round_locks: DashMap::new(),
            username_locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn balance_lock(&self, player_id: &str) -> Arc<Mutex<()>> {
        self.balance_locks
            .entry(player_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn round_lock(&self, player_id: &str, game: GameKind) -> Arc<Mutex<()>> {
        self.round_locks
            .entry((player_id.to_string(), game))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn username_lock(&self, username: &str) -> Arc<Mutex<()>> {
        self.username_locks
            .entry(username.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn rig_decision(&self, player_id: &str) -> StakehouseResult<bool> {
        let player = casino_store::require_player(&self.store, player_id)?;
        let global_on = casino_store::load_rig_mode(&self.store)?;
        Ok(should_rig(Some(RigProfile::from(&player)), global_on))
    }

    /// Settles one single-shot wager end to end.
    pub async fn settle_bet(
        &self,
        player_id: &str,
        stake_cents: i64,
        params: &BetParams,
        draws: &mut impl DrawSource,
    ) -> StakehouseResult<SettledBet> {
        params.validate()?;
        if stake_cents <= 0 {
            return Err(StakehouseError::validation("bet must be greater than zero"));
        }

        let game = params.kind();
        let lock = self.balance_lock(player_id);
        let _guard = lock.lock().await;

        let rigged = self.rig_decision(player_id)?;
        casino_store::try_debit(&self.store, player_id, stake_cents)?;

        let result = self.complete_bet(player_id, game, stake_cents, params, rigged, draws);
        if let Err(ref e) = result {
            error!(
                player = %player_id,
                game = %game,
                stake_cents,
                error = %e,
                "stake debited but settlement did not finish; no credit recorded"
            );
        }
        result
    }

    fn complete_bet(
        &self,
        player_id: &str,
        game: GameKind,
        stake_cents: i64,
        params: &BetParams,
        rigged: bool,
        draws: &mut impl DrawSource,
    ) -> StakehouseResult<SettledBet> {
        let outcome = games::resolve(params, rigged, draws);

        let payout_cents = if outcome.win {
            (stake_cents as f64 * outcome.multiplier).floor() as i64
        } else {
            0
        };

        if payout_cents > 0 {
            casino_store::credit(&self.store, player_id, payout_cents)?;
        }

        let record = HistoryRecord::new(
            player_id,
            game,
            stake_cents,
            payout_cents,
            outcome.multiplier,
            outcome.win,
            serde_json::to_value(&outcome)?,
        );
        casino_store::append_history(&self.store, &record)?;
        casino_store::append_ledger(
            &self.store,
            &LedgerEntry::new(player_id, LedgerKind::Bet, -stake_cents, Some(record.id.clone())),
        )?;
        if payout_cents > 0 {
            casino_store::append_ledger(
                &self.store,
                &LedgerEntry::new(player_id, LedgerKind::Payout, payout_cents, Some(record.id.clone())),
            )?;
        }

        let refreshed = casino_store::require_player(&self.store, player_id)?;
        info!(
            player = %player_id,
            game = %game,
            stake_cents,
            payout_cents,
            win = outcome.win,
            "settled wager"
        );

        Ok(SettledBet {
            outcome,
            stake_cents,
            payout_cents,
            new_balance_cents: refreshed.balance_cents,
        })
    }

    /// Starts a mines round, discarding any stale round for this player.
    pub async fn mines_start(
        &self,
        player_id: &str,
        stake_cents: i64,
        mine_count: u8,
        draws: &mut impl DrawSource,
    ) -> StakehouseResult<MinesStart> {
        if stake_cents <= 0 {
            return Err(StakehouseError::validation("bet must be greater than zero"));
        }
        if !(1..=24).contains(&mine_count) {
            return Err(StakehouseError::validation(
                "mine count must be between 1 and 24",
            ));
        }

        let round_lock = self.round_lock(player_id, GameKind::Mines);
        let _round_guard = round_lock.lock().await;
        let balance_lock = self.balance_lock(player_id);
        let _balance_guard = balance_lock.lock().await;

        let player = casino_store::require_player(&self.store, player_id)?;
        if player.balance_cents < stake_cents {
            return Err(StakehouseError::InsufficientFunds {
                balance_cents: player.balance_cents,
                stake_cents,
            });
        }

        // A stale round is discarded whole; its stake stays with the house.
        let discarded_stale =
            casino_store::load_active_round(&self.store, player_id, GameKind::Mines)?.is_some();
        if discarded_stale {
            warn!(player = %player_id, "discarding stale mines round on restart");
            casino_store::delete_active_round(&self.store, player_id, GameKind::Mines)?;
        }

        casino_store::try_debit(&self.store, player_id, stake_cents)?;

        let state = MinesState::init(mine_count, draws);
        let round = ActiveRound::new(player_id, stake_cents, state);
        casino_store::save_active_round(&self.store, &round)?;

        let refreshed = casino_store::require_player(&self.store, player_id)?;
        info!(player = %player_id, mine_count, stake_cents, "mines round started");

        Ok(MinesStart {
            mine_count,
            new_balance_cents: refreshed.balance_cents,
            discarded_stale,
        })
    }

    /// Reveals one tile of the player's active mines round.
    pub async fn mines_reveal(
        &self,
        player_id: &str,
        position: u8,
        draws: &mut impl DrawSource,
    ) -> StakehouseResult<MinesRevealOutcome> {
        if position >= GRID_SIZE {
            return Err(StakehouseError::validation(
                "position must be between 0 and 24",
            ));
        }

        let round_lock = self.round_lock(player_id, GameKind::Mines);
        let _round_guard = round_lock.lock().await;

        let Some(mut round) =
            casino_store::load_active_round(&self.store, player_id, GameKind::Mines)?
        else {
            return Err(StakehouseError::conflict(
                "no active mines round; start a new game first",
            ));
        };

        let rigged = self.rig_decision(player_id)?;
        let reveal = round.state.reveal(position, rigged, draws)?;

        match reveal {
            MinesReveal::Mine { mines } => {
                casino_store::delete_active_round(&self.store, player_id, GameKind::Mines)?;

                let record = HistoryRecord::new(
                    player_id,
                    GameKind::Mines,
                    round.stake_cents,
                    0,
                    0.0,
                    false,
                    json!({
                        "result": "mine_hit",
                        "win": false,
                        "multiplier": 0.0,
                        "position": position,
                        "mines": mines,
                        "revealed": round.state.revealed,
                    }),
                );
                casino_store::append_history(&self.store, &record)?;
                casino_store::append_ledger(
                    &self.store,
                    &LedgerEntry::new(
                        player_id,
                        LedgerKind::Bet,
                        -round.stake_cents,
                        Some(record.id.clone()),
                    ),
                )?;

                let player = casino_store::require_player(&self.store, player_id)?;
                info!(player = %player_id, position, "mines round busted");

                Ok(MinesRevealOutcome::Bust {
                    position,
                    mines,
                    new_balance_cents: player.balance_cents,
                })
            }
            MinesReveal::Safe {
                multiplier,
                can_cashout,
            } => {
                casino_store::save_active_round(&self.store, &round)?;
                let player = casino_store::require_player(&self.store, player_id)?;

                Ok(MinesRevealOutcome::Safe {
                    multiplier,
                    can_cashout,
                    revealed_count: round.state.revealed.len(),
                    new_balance_cents: player.balance_cents,
                })
            }
        }
    }

    /// Cashes out the player's active mines round at its current multiplier.
    pub async fn mines_cashout(&self, player_id: &str) -> StakehouseResult<MinesCashout> {
        let round_lock = self.round_lock(player_id, GameKind::Mines);
        let _round_guard = round_lock.lock().await;
        let balance_lock = self.balance_lock(player_id);
        let _balance_guard = balance_lock.lock().await;

        let Some(round) =
            casino_store::load_active_round(&self.store, player_id, GameKind::Mines)?
        else {
            return Err(StakehouseError::conflict("no active mines round"));
        };

        let Some(multiplier) = round.state.cashout_multiplier() else {
            return Err(StakehouseError::conflict(
                "cannot cash out before revealing a tile",
            ));
        };

        let payout_cents = (round.stake_cents as f64 * multiplier).floor() as i64;
        casino_store::credit(&self.store, player_id, payout_cents)?;

        let result = self.complete_cashout(&round, player_id, multiplier, payout_cents);
        if let Err(ref e) = result {
            error!(
                player = %player_id,
                payout_cents,
                error = %e,
                "cashout credited but round teardown did not finish"
            );
        }
        result
    }

    /// Creates a player, holding the username lock across the uniqueness
    /// check and the write.
    pub async fn create_player(&self, player: &crate::models::Player) -> StakehouseResult<()> {
        let lock = self.username_lock(&player.username);
        let _guard = lock.lock().await;
        casino_store::create_player(&self.store, player)
    }

    /// Applies an operator balance change and records the adjustment.
    pub async fn adjust_balance(
        &self,
        player_id: &str,
        change: BalanceChange,
        reference_id: Option<String>,
    ) -> StakehouseResult<(crate::models::Player, i64)> {
        let lock = self.balance_lock(player_id);
        let _guard = lock.lock().await;

        let mut player = casino_store::require_player(&self.store, player_id)?;
        let delta = match change {
            BalanceChange::Adjust(cents) => cents,
            BalanceChange::Set(cents) => cents - player.balance_cents,
        };
        let new_balance = player.balance_cents + delta;
        if new_balance < 0 {
            return Err(StakehouseError::validation("balance cannot go negative"));
        }

        player.balance_cents = new_balance;
        casino_store::save_player(&self.store, &player)?;
        casino_store::append_ledger(
            &self.store,
            &LedgerEntry::new(player_id, LedgerKind::Adjustment, delta, reference_id),
        )?;

        info!(
            player = %player_id,
            delta_cents = delta,
            new_balance_cents = new_balance,
            "balance adjusted"
        );
        Ok((player, delta))
    }

    fn complete_cashout(
        &self,
        round: &ActiveRound,
        player_id: &str,
        multiplier: f64,
        payout_cents: i64,
    ) -> StakehouseResult<MinesCashout> {
        casino_store::delete_active_round(&self.store, player_id, GameKind::Mines)?;

        let record = HistoryRecord::new(
            player_id,
            GameKind::Mines,
            round.stake_cents,
            payout_cents,
            multiplier,
            true,
            json!({
                "win": true,
                "multiplier": multiplier,
                "revealed": round.state.revealed.len(),
            }),
        );
        casino_store::append_history(&self.store, &record)?;
        casino_store::append_ledger(
            &self.store,
            &LedgerEntry::new(
                player_id,
                LedgerKind::Bet,
                -round.stake_cents,
                Some(record.id.clone()),
            ),
        )?;
        casino_store::append_ledger(
            &self.store,
            &LedgerEntry::new(
                player_id,
                LedgerKind::Payout,
                payout_cents,
                Some(record.id.clone()),
            ),
        )?;

        let player = casino_store::require_player(&self.store, player_id)?;
        info!(
            player = %player_id,
            multiplier,
            payout_cents,
            "mines round cashed out"
        );

        Ok(MinesCashout {
            multiplier,
            payout_cents,
            new_balance_cents: player.balance_cents,
        })
    }
}
