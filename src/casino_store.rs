//! Persistent casino records stored in RocksDB: players, rig settings,
//! active rounds, wager history and the money ledger.

use hex;
use tracing::warn;

use crate::errors::{StakehouseError, StakehouseResult};
use crate::models::{ActiveRound, GameKind, HistoryRecord, LedgerEntry, Player, Role};
use crate::storage::Store;

const PLAYER_PREFIX: &str = "player:";
const USERNAME_PREFIX: &str = "username:";
const ROUND_PREFIX: &str = "round:active:";
const HISTORY_PREFIX: &[u8] = b"history:";
const LEDGER_PREFIX: &[u8] = b"ledger:";
const RIG_MODE_KEY: &[u8] = b"settings:rig_mode";

fn player_key(player_id: &str) -> Vec<u8> {
    format!("{}{}", PLAYER_PREFIX, player_id).into_bytes()
}

fn username_key(username: &str) -> Vec<u8> {
    format!("{}{}", USERNAME_PREFIX, username).into_bytes()
}

fn round_key(player_id: &str, game: GameKind) -> Vec<u8> {
    format!("{}{}:{}", ROUND_PREFIX, player_id, game).into_bytes()
}

fn history_scan_prefix(player_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(HISTORY_PREFIX.len() + player_id.len() + 1);
    prefix.extend_from_slice(HISTORY_PREFIX);
    prefix.extend_from_slice(player_id.as_bytes());
    prefix.push(b':');
    prefix
}

// Sort newest-first by using an inverted timestamp as the primary sort key.
// Key layout: prefix | player_id | ':' | inv_millis(be) | record_id
fn history_key(player_id: &str, created_at_millis: i64, record_id: &str) -> Vec<u8> {
    let inv_millis = u64::MAX - created_at_millis as u64;
    let mut key = history_scan_prefix(player_id);
    key.extend_from_slice(&inv_millis.to_be_bytes());
    key.extend_from_slice(record_id.as_bytes());
    key
}

fn ledger_scan_prefix(player_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(LEDGER_PREFIX.len() + player_id.len() + 1);
    prefix.extend_from_slice(LEDGER_PREFIX);
    prefix.extend_from_slice(player_id.as_bytes());
    prefix.push(b':');
    prefix
}

fn ledger_key(player_id: &str, created_at_millis: i64, entry_id: &str) -> Vec<u8> {
    let inv_millis = u64::MAX - created_at_millis as u64;
    let mut key = ledger_scan_prefix(player_id);
    key.extend_from_slice(&inv_millis.to_be_bytes());
    key.extend_from_slice(entry_id.as_bytes());
    key
}

fn decode_cursor(cursor_hex: Option<&str>) -> StakehouseResult<Option<Vec<u8>>> {
    match cursor_hex {
        Some(c) => hex::decode(c)
            .map(Some)
            .map_err(|e| StakehouseError::validation(format!("invalid cursor: {}", e))),
        None => Ok(None),
    }
}

// ============================================================================
// Players
// ============================================================================

/// Creates a player and claims its username. Creates that can race on the
/// same username must hold the settlement manager's username lock.
pub fn create_player(store: &Store, player: &Player) -> StakehouseResult<()> {
    let uname_key = username_key(&player.username);
    if store.get(&uname_key)?.is_some() {
        return Err(StakehouseError::conflict(format!(
            "username '{}' is taken",
            player.username
        )));
    }

    let bytes = serde_json::to_vec(player)?;
    store.batch_write(&[
        (player_key(&player.id), bytes),
        (uname_key, player.id.clone().into_bytes()),
    ])?;
    Ok(())
}

pub fn load_player(store: &Store, player_id: &str) -> StakehouseResult<Option<Player>> {
    let Some(bytes) = store.get(&player_key(player_id))? else {
        return Ok(None);
    };
    let player: Player = serde_json::from_slice(&bytes)?;
    Ok(Some(player))
}

/// Loads a player or reports NotFound; most call sites want the error.
pub fn require_player(store: &Store, player_id: &str) -> StakehouseResult<Player> {
    load_player(store, player_id)?
        .ok_or_else(|| StakehouseError::not_found(format!("player {}", player_id)))
}

pub fn find_player_by_username(
    store: &Store,
    username: &str,
) -> StakehouseResult<Option<Player>> {
    let Some(id_bytes) = store.get(&username_key(username))? else {
        return Ok(None);
    };
    let player_id = String::from_utf8_lossy(&id_bytes).to_string();
    load_player(store, &player_id)
}

/// Creates the named owner account unless the username is already claimed.
/// Returns the account either way so startup can report its id.
pub fn ensure_owner(store: &Store, username: &str) -> StakehouseResult<Player> {
    if let Some(existing) = find_player_by_username(store, username)? {
        return Ok(existing);
    }
    let mut owner = Player::new(username);
    owner.role = Role::Owner;
    create_player(store, &owner)?;
    Ok(owner)
}

/// Username stays fixed after creation, so no index maintenance here.
pub fn save_player(store: &Store, player: &Player) -> StakehouseResult<()> {
    let bytes = serde_json::to_vec(player)?;
    store.put(&player_key(&player.id), &bytes)?;
    Ok(())
}

/// Subtracts the stake if the balance covers it. Caller must hold the
/// player's balance lock.
pub fn try_debit(store: &Store, player_id: &str, stake_cents: i64) -> StakehouseResult<Player> {
    let mut player = require_player(store, player_id)?;
    if player.balance_cents < stake_cents {
        return Err(StakehouseError::InsufficientFunds {
            balance_cents: player.balance_cents,
            stake_cents,
        });
    }
    player.balance_cents -= stake_cents;
    save_player(store, &player)?;
    Ok(player)
}

/// Adds to the balance. Caller must hold the player's balance lock.
pub fn credit(store: &Store, player_id: &str, amount_cents: i64) -> StakehouseResult<Player> {
    let mut player = require_player(store, player_id)?;
    player.balance_cents += amount_cents;
    save_player(store, &player)?;
    Ok(player)
}

// ============================================================================
// Rig settings
// ============================================================================

/// Global rig mode, read fresh on every draw. Absent means off.
pub fn load_rig_mode(store: &Store) -> StakehouseResult<bool> {
    Ok(matches!(store.get(RIG_MODE_KEY)?.as_deref(), Some(b"1")))
}

pub fn save_rig_mode(store: &Store, enabled: bool) -> StakehouseResult<()> {
    store.put(RIG_MODE_KEY, if enabled { b"1" } else { b"0" })?;
    Ok(())
}

// ============================================================================
// Active rounds
// ============================================================================

pub fn save_active_round(store: &Store, round: &ActiveRound) -> StakehouseResult<()> {
    let bytes = bincode::serialize(round)?;
    store.put(&round_key(&round.player_id, round.game), &bytes)?;
    Ok(())
}

pub fn load_active_round(
    store: &Store,
    player_id: &str,
    game: GameKind,
) -> StakehouseResult<Option<ActiveRound>> {
    let Some(bytes) = store.get(&round_key(player_id, game))? else {
        return Ok(None);
    };
    let round: ActiveRound = bincode::deserialize(&bytes)?;
    Ok(Some(round))
}

pub fn delete_active_round(store: &Store, player_id: &str, game: GameKind) -> StakehouseResult<()> {
    store.delete(&round_key(player_id, game))?;
    Ok(())
}

// ============================================================================
// Wager history
// ============================================================================

pub fn append_history(store: &Store, record: &HistoryRecord) -> StakehouseResult<()> {
    let key = history_key(
        &record.player_id,
        record.created_at.timestamp_millis(),
        &record.id,
    );
    let bytes = serde_json::to_vec(record)?;
    store.put(&key, &bytes)?;
    Ok(())
}

/// Newest-first page of a player's settled wagers. The returned cursor, when
/// present, fetches the next page.
pub fn load_history(
    store: &Store,
    player_id: &str,
    cursor_hex: Option<&str>,
    limit: usize,
) -> StakehouseResult<(Vec<HistoryRecord>, Option<String>)> {
    let cursor_bytes = decode_cursor(cursor_hex)?;
    let prefix = history_scan_prefix(player_id);
    let rows = store.scan_prefix(&prefix, cursor_bytes.as_deref(), limit.max(1))?;

    let mut records = Vec::with_capacity(rows.len());
    let mut next_cursor = None;
    for (key, value) in rows {
        match serde_json::from_slice::<HistoryRecord>(&value) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("skipping undecodable history record: {}", e);
            }
        }
        next_cursor = Some(hex::encode(&key));
    }

    // Only hand back a cursor when the page came back full.
    let next_cursor = if records.len() >= limit.max(1) {
        next_cursor
    } else {
        None
    };
    Ok((records, next_cursor))
}

// ============================================================================
// Ledger
// ============================================================================

pub fn append_ledger(store: &Store, entry: &LedgerEntry) -> StakehouseResult<()> {
    let key = ledger_key(
        &entry.player_id,
        entry.created_at.timestamp_millis(),
        &entry.id,
    );
    let bytes = serde_json::to_vec(entry)?;
    store.put(&key, &bytes)?;
    Ok(())
}

/// Newest-first page of a player's ledger lines.
pub fn load_ledger(
    store: &Store,
    player_id: &str,
    cursor_hex: Option<&str>,
    limit: usize,
) -> StakehouseResult<(Vec<LedgerEntry>, Option<String>)> {
    let cursor_bytes = decode_cursor(cursor_hex)?;
    let prefix = ledger_scan_prefix(player_id);
    let rows = store.scan_prefix(&prefix, cursor_bytes.as_deref(), limit.max(1))?;

    let mut entries = Vec::with_capacity(rows.len());
    let mut next_cursor = None;
    for (key, value) in rows {
        match serde_json::from_slice::<LedgerEntry>(&value) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!("skipping undecodable ledger entry: {}", e);
            }
        }
        next_cursor = Some(hex::encode(&key));
    }

    let next_cursor = if entries.len() >= limit.max(1) {
        next_cursor
    } else {
        None
    };
    Ok((entries, next_cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::mines::MinesState;
    use crate::models::LedgerKind;
    use crate::rng::ScriptedDraws;
    use chrono::Duration;

    fn open_temp() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn create_player_claims_the_username() {
        let (store, _dir) = open_temp();

        let alice = Player::new("alice");
        create_player(&store, &alice).unwrap();

        let loaded = load_player(&store, &alice.id).unwrap().unwrap();
        assert_eq!(loaded.username, "alice");
        assert_eq!(loaded.balance_cents, 0);

        let dup = Player::new("alice");
        let err = create_player(&store, &dup).unwrap_err();
        assert_eq!(err.code(), "STATE_CONFLICT");
    }

    #[test]
    fn missing_player_is_not_found() {
        let (store, _dir) = open_temp();
        assert!(load_player(&store, "nobody").unwrap().is_none());
        assert_eq!(require_player(&store, "nobody").unwrap_err().code(), "NOT_FOUND");
    }

    #[test]
    fn debit_checks_funds_and_leaves_balance_on_failure() {
        let (store, _dir) = open_temp();

        let mut player = Player::new("bob");
        player.balance_cents = 150;
        create_player(&store, &player).unwrap();

        let err = try_debit(&store, &player.id, 500).unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_FUNDS");
        assert_eq!(
            load_player(&store, &player.id).unwrap().unwrap().balance_cents,
            150
        );

        let updated = try_debit(&store, &player.id, 100).unwrap();
        assert_eq!(updated.balance_cents, 50);

        let credited = credit(&store, &player.id, 25).unwrap();
        assert_eq!(credited.balance_cents, 75);
    }

    #[test]
    fn rig_mode_defaults_off_and_persists() {
        let (store, _dir) = open_temp();

        assert!(!load_rig_mode(&store).unwrap());
        save_rig_mode(&store, true).unwrap();
        assert!(load_rig_mode(&store).unwrap());
        save_rig_mode(&store, false).unwrap();
        assert!(!load_rig_mode(&store).unwrap());
    }

    #[test]
    fn active_round_roundtrips_through_bincode() {
        let (store, _dir) = open_temp();

        let mut draws = ScriptedDraws::new([3, 9, 17]);
        let state = MinesState::init(3, &mut draws);
        let round = ActiveRound::new("player-1", 500, state.clone());

        save_active_round(&store, &round).unwrap();
        let loaded = load_active_round(&store, "player-1", GameKind::Mines)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, round.id);
        assert_eq!(loaded.stake_cents, 500);
        assert_eq!(loaded.state, state);

        delete_active_round(&store, "player-1", GameKind::Mines).unwrap();
        assert!(load_active_round(&store, "player-1", GameKind::Mines)
            .unwrap()
            .is_none());
    }

    #[test]
    fn history_pages_newest_first() {
        let (store, _dir) = open_temp();

        for i in 0..5i64 {
            let mut record = HistoryRecord::new(
                "player-1",
                GameKind::Dice,
                100,
                0,
                0.0,
                false,
                serde_json::json!({ "seq": i }),
            );
            record.created_at = record.created_at - Duration::milliseconds(1000 - i);
            append_history(&store, &record).unwrap();
        }

        let (page, cursor) = load_history(&store, "player-1", None, 3).unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].result["seq"], 4);
        assert_eq!(page[1].result["seq"], 3);
        assert_eq!(page[2].result["seq"], 2);
        let cursor = cursor.expect("full page should produce a cursor");

        let (rest, tail_cursor) = load_history(&store, "player-1", Some(&cursor), 3).unwrap();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].result["seq"], 1);
        assert_eq!(rest[1].result["seq"], 0);
        assert!(tail_cursor.is_none());
    }

    #[test]
    fn history_is_scoped_per_player() {
        let (store, _dir) = open_temp();

        let mine = HistoryRecord::new(
            "player-a",
            GameKind::Dice,
            100,
            196,
            1.96,
            true,
            serde_json::json!({}),
        );
        let theirs = HistoryRecord::new(
            "player-b",
            GameKind::Dice,
            100,
            0,
            0.0,
            false,
            serde_json::json!({}),
        );
        append_history(&store, &mine).unwrap();
        append_history(&store, &theirs).unwrap();

        let (page, _) = load_history(&store, "player-a", None, 10).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].player_id, "player-a");
    }

    #[test]
    fn invalid_cursor_is_a_validation_error() {
        let (store, _dir) = open_temp();
        let err = load_history(&store, "player-1", Some("zz-not-hex"), 10).unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }

    #[test]
    fn ledger_records_append_and_page() {
        let (store, _dir) = open_temp();

        let mut bet = LedgerEntry::new("player-1", LedgerKind::Bet, -100, Some("w1".into()));
        bet.created_at = bet.created_at - Duration::milliseconds(5);
        let payout = LedgerEntry::new("player-1", LedgerKind::Payout, 196, Some("w1".into()));
        append_ledger(&store, &bet).unwrap();
        append_ledger(&store, &payout).unwrap();

        let (entries, _) = load_ledger(&store, "player-1", None, 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, LedgerKind::Payout);
        assert_eq!(entries[0].amount_cents, 196);
        assert_eq!(entries[1].kind, LedgerKind::Bet);
        assert_eq!(entries[1].amount_cents, -100);
    }
}
