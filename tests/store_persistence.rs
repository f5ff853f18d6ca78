//! Verifies casino state survives closing and reopening the store: balances,
//! rig settings, wager history and an in-flight mines round.

use stakehouse::casino_store;
use stakehouse::games::BetParams;
use stakehouse::models::{GameKind, Player, Role};
use stakehouse::rng::ScriptedDraws;
use stakehouse::settlement::SettlementManager;
use stakehouse::storage::Store;

#[tokio::test]
async fn casino_state_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");

    // === PHASE 1: play a session and close the store ===
    println!("\n=== PHASE 1: Initial session ===");
    let player_id = {
        let store = Store::open(dir.path()).expect("open store");
        let mut player = Player::new("survivor");
        player.balance_cents = 10_000;
        casino_store::create_player(&store, &player).expect("create player");
        casino_store::save_rig_mode(&store, true).expect("rig mode");

        let manager = SettlementManager::new(store);

        // A rig-corrected dice loss: the fair 40.00 would have won.
        let settled = manager
            .settle_bet(
                &player.id,
                100,
                &BetParams::Dice { chance: 50.0 },
                &mut ScriptedDraws::new([4000, 1]),
            )
            .await
            .expect("settle");
        assert!(!settled.outcome.win);
        assert_eq!(settled.new_balance_cents, 9_900);

        // Leave a mines round open with one tile revealed.
        manager
            .mines_start(&player.id, 200, 3, &mut ScriptedDraws::new([0, 1, 2]))
            .await
            .expect("start");
        manager
            .mines_reveal(&player.id, 5, &mut ScriptedDraws::new([]))
            .await
            .expect("reveal");

        println!("📊 Closing with an open mines round and one settled wager");
        player.id
    };
    // Everything holding the store is gone; the rocksdb lock is released.

    // === PHASE 2: reopen and verify every record ===
    println!("\n=== PHASE 2: Reopening the store ===");
    let store = Store::open(dir.path()).expect("reopen store");

    let player = casino_store::require_player(&store, &player_id).expect("player survived");
    assert_eq!(player.balance_cents, 9_700);
    assert!(casino_store::load_rig_mode(&store).expect("rig mode"));

    let round = casino_store::load_active_round(&store, &player_id, GameKind::Mines)
        .expect("load round")
        .expect("round survived");
    assert_eq!(round.stake_cents, 200);
    assert_eq!(round.state.mines, vec![0, 1, 2]);
    assert_eq!(round.state.revealed, vec![5]);

    let (history, _) = casino_store::load_history(&store, &player_id, None, 10).expect("history");
    assert_eq!(history.len(), 1);
    assert!(!history[0].won);
    assert_eq!(history[0].stake_cents, 100);

    let (ledger, _) = casino_store::load_ledger(&store, &player_id, None, 10).expect("ledger");
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].amount_cents, -100);

    // The surviving round plays on: a second reveal, then a cashout.
    let manager = SettlementManager::new(store);
    manager
        .mines_reveal(&player_id, 6, &mut ScriptedDraws::new([]))
        .await
        .expect("reveal after restart");
    let cashout = manager.mines_cashout(&player_id).await.expect("cashout");
    assert_eq!(cashout.payout_cents, 253);
    assert_eq!(cashout.new_balance_cents, 9_953);

    println!("✅ Store reopened with full casino state");
}

#[tokio::test]
async fn owner_bootstrap_is_idempotent_across_restarts() {
    let dir = tempfile::tempdir().expect("tempdir");

    let first_id = {
        let store = Store::open(dir.path()).expect("open store");
        casino_store::ensure_owner(&store, "owner").expect("seed owner").id
    };

    // A second boot must find the same account instead of minting another.
    let store = Store::open(dir.path()).expect("reopen store");
    let owner = casino_store::ensure_owner(&store, "owner").expect("reseed owner");
    assert_eq!(owner.id, first_id);
    assert_eq!(owner.role, Role::Owner);
}
