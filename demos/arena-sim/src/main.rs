//! Runs one short match in-process and prints the arena's event feed.
//!
//! Four players join a team arena. Once it starts, a spectator-to-be walks
//! in from outside, and one game player wanders out of bounds. The match
//! clock ends the game after a few seconds.
//!
//! ```text
//! RUST_LOG=debug cargo run -p arena-sim
//! ```

use std::time::Duration;

use arenakit::prelude::*;
use arenakit::{SpawnKind, Spawnpoint, init_tracing};

const CENTER: Position = Position::new(0.0, 64.0, 0.0);
const FAR_AWAY: Position = Position::new(300.0, 64.0, 300.0);

fn settings() -> ArenaSettings {
    ArenaSettings {
        name: "quarry".to_string(),
        min_players: 2,
        max_players: 8,
        outsider_policy: OutsiderPolicy::Join,
        out_of_bounds_policy: OutOfBoundsPolicy::Respawn,
        remove_location: Position::new(-100.0, 70.0, -100.0),
        region: Region::new(
            Position::new(-40.0, 0.0, -40.0),
            Position::new(40.0, 128.0, 40.0),
        ),
        teams: vec![ArenaTeam::Red, ArenaTeam::Blue],
        spawnpoints: vec![
            Spawnpoint::new("red", SpawnKind::Game, Position::new(-20.0, 64.0, 0.0))
                .with_team(ArenaTeam::Red),
            Spawnpoint::new("blue", SpawnKind::Game, Position::new(20.0, 64.0, 0.0))
                .with_team(ArenaTeam::Blue),
        ],
        time_limit_secs: Some(3),
        ..ArenaSettings::default()
    }
}

#[tokio::main]
async fn main() -> Result<(), ArenakitError> {
    init_tracing();

    let mut arenas = ArenaManager::new();
    let quarry = arenas.create_arena(settings()).await?;
    let mut feed = arenas.get(quarry)?.subscribe().await?;

    for id in 1..=4 {
        arenas.connect_player(PlayerId(id), CENTER).await?;
        arenas.join_arena(PlayerId(id), quarry).await?;
    }
    arenas.connect_player(PlayerId(5), FAR_AWAY).await?;

    let session = arenas.get(quarry)?.start().await?;
    tracing::info!(%session, "match running");

    arenas.move_player(PlayerId(5), CENTER).await?;
    arenas.move_player(PlayerId(3), FAR_AWAY).await?;

    tokio::time::sleep(Duration::from_secs(4)).await;

    while let Ok(event) = feed.try_recv() {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "event not printable"),
        }
    }

    for info in arenas.list_arenas().await {
        tracing::info!(
            arena_id = %info.arena_id,
            name = %info.name,
            running = info.running,
            ticks = info.tick,
            "final state"
        );
    }
    arenas.destroy_arena(quarry).await?;
    Ok(())
}
