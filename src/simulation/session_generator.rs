//! Random session generation for benchmarks and manual testing.
//!
//! Generated sessions always balance: the cash-outs split exactly the
//! money that was bought in.

use crate::core::player::Player;
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};

/// Configuration for generating a random session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Number of players at the table.
    pub player_count: usize,
    /// Smallest single buy-in, in whole currency units.
    pub min_buy_in: u32,
    /// Largest single buy-in, in whole currency units.
    pub max_buy_in: u32,
    /// Maximum number of re-buys per player.
    pub max_rebuys: usize,
    /// Decimal places of the generated cash-outs.
    pub scale: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_count: 8,
            min_buy_in: 20,
            max_buy_in: 100,
            max_rebuys: 2,
            scale: 2,
        }
    }
}

/// Generate a balanced random session.
pub fn generate_random_session(config: &SessionConfig) -> Vec<Player> {
    let mut rng = rand::thread_rng();
    let min = config.min_buy_in.max(1);
    let max = config.max_buy_in.max(min);

    let buy_ins: Vec<Vec<Decimal>> = (0..config.player_count)
        .map(|_| {
            let count = 1 + rng.gen_range(0..=config.max_rebuys);
            (0..count)
                .map(|_| Decimal::from(rng.gen_range(min..=max)))
                .collect()
        })
        .collect();
    let pot: Decimal = buy_ins.iter().flatten().copied().sum();

    // Random stack weights; the last player takes whatever is left so the
    // cash-outs sum to the pot exactly.
    let weights: Vec<u32> = (0..config.player_count)
        .map(|_| rng.gen_range(0..=100))
        .collect();
    let total_weight = Decimal::from(weights.iter().sum::<u32>().max(1));

    let mut remaining = pot;
    buy_ins
        .into_iter()
        .zip(weights)
        .enumerate()
        .map(|(i, (buy_ins, weight))| {
            let cash_out = if i + 1 == config.player_count {
                remaining
            } else {
                (pot * Decimal::from(weight) / total_weight)
                    .round_dp_with_strategy(config.scale, RoundingStrategy::ToZero)
                    .min(remaining)
            };
            remaining -= cash_out;
            let id = format!("PLAYER-{:03}", i);
            Player::new(id.as_str(), id.clone(), buy_ins, cash_out)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::engine::SettlementEngine;

    #[test]
    fn test_random_session_balances() {
        let config = SessionConfig {
            player_count: 6,
            ..Default::default()
        };
        let players = generate_random_session(&config);
        assert_eq!(players.len(), 6);

        let total: Decimal = players.iter().map(Player::net).sum();
        assert_eq!(total, Decimal::ZERO);
        assert!(players.iter().all(|p| p.cash_out() >= Decimal::ZERO));
    }

    #[test]
    fn test_random_session_settles() {
        let config = SessionConfig {
            player_count: 20,
            max_rebuys: 4,
            ..Default::default()
        };
        let players = generate_random_session(&config);
        let plan = SettlementEngine::default().settle(&players, &[]).unwrap();

        assert!(plan.is_balanced());
        assert!(plan.reproduces_nets());
        assert!(plan.transfers().len() < players.len());
    }
}
