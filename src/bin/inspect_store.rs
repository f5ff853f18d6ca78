//! Store inspection binary
//!
//! Prints a readable summary of players, settings, active rounds, and
//! recent wagers. Point it at a data directory that is not being served.

use clap::Parser;
use log::debug;

use stakehouse::casino_store;
use stakehouse::models::{ActiveRound, Player};
use stakehouse::storage::Store;

#[derive(Parser, Debug)]
#[command(name = "inspect_store")]
#[command(about = "Stakehouse store inspection tool", long_about = None)]
struct Args {
    /// Database directory
    #[arg(long, default_value = "./data/stakehouse")]
    db_path: String,

    /// Wager records to show per player
    #[arg(long, default_value = "5")]
    history: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    println!("📂 Opening store: {}", args.db_path);
    let store = Store::open(&args.db_path)?;

    let rig_mode = casino_store::load_rig_mode(&store)?;
    println!("Global rig mode: {}", if rig_mode { "ON" } else { "off" });

    let rounds = store.scan_prefix(b"round:active:", None, usize::MAX)?;
    println!("Active rounds: {}", rounds.len());
    for (key, value) in &rounds {
        debug!("round key: {}", String::from_utf8_lossy(key));
        let round: ActiveRound = bincode::deserialize(value)?;
        println!(
            "  {} player={} stake={}c revealed={}",
            round.id,
            round.player_id,
            round.stake_cents,
            round.state.revealed.len()
        );
    }

    let players = store.scan_prefix(b"player:", None, usize::MAX)?;
    println!("Players: {}", players.len());
    for (key, value) in &players {
        debug!("player key: {}", String::from_utf8_lossy(key));
        let player: Player = serde_json::from_slice(value)?;
        println!(
            "  {} {:<20} role={} rigged={} balance={}c",
            player.id, player.username, player.role, player.rigged, player.balance_cents
        );

        let (records, _) = casino_store::load_history(&store, &player.id, None, args.history)?;
        for record in records {
            println!(
                "      [{}] {} stake={}c payout={}c won={}",
                record.created_at.format("%Y-%m-%d %H:%M:%S"),
                record.game,
                record.stake_cents,
                record.payout_cents,
                record.won
            );
        }
    }

    Ok(())
}
