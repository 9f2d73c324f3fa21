//! Basic home-game settlement example.
//!
//! Shows how a night's buy-ins and cash-outs turn into a short list of
//! transfers, how an agreed transfer is honored, and how payments are
//! tracked afterwards.

use homegame_settlement::config::{AdjustmentMode, EngineConfig};
use homegame_settlement::core::player::{Player, PlayerId};
use homegame_settlement::core::recommendation::Recommendation;
use homegame_settlement::persistence::legacy::LegacyDocuments;
use homegame_settlement::settlement::dinner::split_dinner;
use homegame_settlement::settlement::engine::SettlementEngine;
use homegame_settlement::settlement::payments::PaymentTracker;
use rust_decimal_macros::dec;

fn main() {
    println!("╔════════════════════════════════════════════════╗");
    println!("║  homegame-settlement: Basic Settlement Example ║");
    println!("╚════════════════════════════════════════════════╝\n");

    let players = vec![
        Player::new("ana", "Ana", vec![dec!(50), dec!(50)], dec!(237.50)),
        Player::new("ben", "Ben", vec![dec!(100)], dec!(0)),
        Player::new("cy", "Cy", vec![dec!(50)], dec!(95)),
        Player::new("dee", "Dee", vec![dec!(50), dec!(25), dec!(25)], dec!(60)),
        Player::new("eli", "Eli", vec![dec!(75)], dec!(75)),
        Player::new("flo", "Flo", vec![dec!(50)], dec!(7.50)),
    ];

    // --- Scenario 1: Plain settlement ---
    println!("━━━ Scenario 1: Settle the table ━━━\n");

    let engine = SettlementEngine::default();
    let plan = match engine.settle(&players, &[]) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Invalid session: {}", e);
            return;
        }
    };
    println!("{}", plan);

    // --- Scenario 2: Ben already agreed to pay Cy ---
    println!("━━━ Scenario 2: With an agreed transfer ━━━\n");

    let ben = PlayerId::new("ben");
    let cy = PlayerId::new("cy");
    let recommendations = vec![Recommendation::new(ben.clone(), cy.clone(), dec!(45))];
    let plan = match engine.settle(&players, &recommendations) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Invalid recommendation: {}", e);
            return;
        }
    };
    println!("{}", plan);

    // --- Scenario 3: Oversized recommendation, overshoot vs clamp ---
    println!("━━━ Scenario 3: Adjustment modes ━━━\n");

    let oversized = vec![Recommendation::new(ben.clone(), cy.clone(), dec!(80))];
    for mode in [AdjustmentMode::Overshoot, AdjustmentMode::Clamp] {
        let engine = SettlementEngine::new(EngineConfig::default().with_adjustment(mode));
        if let Ok(plan) = engine.settle(&players, &oversized) {
            println!("  {:?}:", mode);
            for balance in plan.adjusted_balances() {
                println!("    {:<6} {:>10}", balance.player, balance.amount);
            }
            println!();
        }
    }

    // --- Scenario 4: Tracking payments ---
    println!("━━━ Scenario 4: Payments ━━━\n");

    let mut transfers = plan.into_transfers();
    let ids: Vec<_> = transfers.iter().map(|t| t.id()).collect();
    for id in ids.iter().take(2) {
        if let Ok(updated) = PaymentTracker::toggle_paid(&transfers, id, true) {
            transfers = updated;
        }
    }
    for transfer in &transfers {
        println!("  {}", transfer);
    }
    println!();
    println!("{}", PaymentTracker::summary(&transfers));
    println!("Status: {}\n", PaymentTracker::session_status(&transfers));

    let legacy = LegacyDocuments::from_transfers(&transfers);
    if let Ok(json) = legacy.paid_transfers_json() {
        println!("Stored paid flags: {}\n", json);
    }

    // --- Scenario 5: Dinner ---
    println!("━━━ Scenario 5: Dinner split ━━━\n");

    let diners: Vec<PlayerId> = players.iter().map(|p| p.id().clone()).collect();
    match split_dinner(dec!(100), &PlayerId::new("ana"), &diners, 2) {
        Ok(split) => {
            for share in &split.shares {
                println!("  {:<6} {:>8}", share.player, share.amount);
            }
            println!();
            for transfer in split.transfers() {
                println!("  {}", transfer);
            }
        }
        Err(e) => eprintln!("Invalid dinner: {}", e),
    }
}
