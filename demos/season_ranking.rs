//! Season ranking example.
//!
//! Generates a season of random weekly sessions and folds them into the
//! all-time and second-half rankings.

use chrono::{Duration, TimeZone, Utc};
use homegame_settlement::history::ranking::{
    build_ranking, build_ranking_for, win_rate_percent, RankingPeriod,
};
use homegame_settlement::history::session::SessionSnapshot;
use homegame_settlement::settlement::engine::SettlementEngine;
use homegame_settlement::simulation::session_generator::{generate_random_session, SessionConfig};

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  homegame-settlement: Season Ranking Example ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let Some(season_start) = Utc.with_ymd_and_hms(2024, 1, 5, 20, 0, 0).single() else {
        return;
    };
    let config = SessionConfig {
        player_count: 6,
        ..Default::default()
    };

    let sessions: Vec<SessionSnapshot> = (0..12)
        .map(|week| {
            SessionSnapshot::new(
                season_start + Duration::weeks(week),
                generate_random_session(&config),
            )
            .with_label(format!("Week {}", week + 1))
        })
        .collect();

    // --- Every session settles on its own ---
    println!("━━━ Weekly settlements ━━━\n");

    let engine = SettlementEngine::default();
    for session in &sessions {
        match engine.compute_transfers(&session.players, &[]) {
            Ok(transfers) => println!(
                "  {:<8} {} transfers",
                session.label.as_deref().unwrap_or("-"),
                transfers.len()
            ),
            Err(e) => eprintln!("  invalid session: {}", e),
        }
    }
    println!();

    // --- All-time ranking ---
    println!("━━━ All-time ranking ━━━\n");

    let ranking = build_ranking(&sessions);
    println!("{}", ranking);

    for entry in ranking.ordered() {
        println!(
            "  {:<12} win rate {:>5.1}%",
            entry.name,
            win_rate_percent(entry)
        );
    }
    println!();

    // --- Second half of the season ---
    println!("━━━ Since week 7 ━━━\n");

    let midseason = season_start + Duration::weeks(6);
    let second_half = build_ranking_for(&sessions, RankingPeriod::Since(midseason));
    println!("{}", second_half);

    println!("━━━ Regulars for next week ━━━\n");
    for entry in ranking.suggest_players(4) {
        println!("  {} ({} sessions)", entry.name, entry.participations);
    }
}
