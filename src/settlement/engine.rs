use crate::config::{AdjustmentMode, EngineConfig};
use crate::core::money::{is_settled, round_to, unit, MAX_SCALE};
use crate::core::player::{Player, PlayerId};
use crate::core::recommendation::Recommendation;
use crate::core::transfer::Transfer;
use crate::core::validation::{
    round_recommendations, validate_players, validate_recommendations, ValidationError,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A player's balance at some stage of the settlement.
///
/// Positive = owed money (creditor), negative = owes money (debtor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBalance {
    pub player: PlayerId,
    pub amount: Decimal,
}

impl PlayerBalance {
    pub fn new(player: PlayerId, amount: Decimal) -> Self {
        Self { player, amount }
    }
}

/// Result of settling one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// Raw net per player, in player input order.
    nets: Vec<PlayerBalance>,
    /// Balances left for the matcher after recommendations were applied.
    adjusted: Vec<PlayerBalance>,
    /// Recommended transfers first, then matched ones.
    transfers: Vec<Transfer>,
    /// Balances the matcher could not pair up (only for unbalanced sessions).
    unsettled: Vec<PlayerBalance>,
    scale: u32,
}

impl SettlementPlan {
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn into_transfers(self) -> Vec<Transfer> {
        self.transfers
    }

    pub fn nets(&self) -> &[PlayerBalance] {
        &self.nets
    }

    pub fn adjusted_balances(&self) -> &[PlayerBalance] {
        &self.adjusted
    }

    pub fn unsettled(&self) -> &[PlayerBalance] {
        &self.unsettled
    }

    /// Transfers echoed from recommendations.
    pub fn recommended(&self) -> impl Iterator<Item = &Transfer> {
        self.transfers.iter().filter(|t| t.recommended)
    }

    /// Transfers produced by the matcher.
    pub fn optimized(&self) -> impl Iterator<Item = &Transfer> {
        self.transfers.iter().filter(|t| !t.recommended)
    }

    /// Raw net of a player, zero if the player is not in the session.
    pub fn net_of(&self, player: &PlayerId) -> Decimal {
        self.nets
            .iter()
            .find(|b| &b.player == player)
            .map(|b| b.amount)
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of all nets. Zero for a session where cash-outs match buy-ins.
    pub fn imbalance(&self) -> Decimal {
        self.nets.iter().map(|b| b.amount).sum()
    }

    /// True if the session summed to zero and every balance was matched.
    pub fn is_balanced(&self) -> bool {
        is_settled(self.imbalance(), self.scale) && self.unsettled.is_empty()
    }

    /// True if the transfers reproduce every player's net within one unit.
    pub fn reproduces_nets(&self) -> bool {
        let tolerance = unit(self.scale);
        self.nets.iter().all(|b| {
            let flow = net_flow(&self.transfers, &b.player);
            (flow - b.amount).abs() <= tolerance
        })
    }
}

impl fmt::Display for SettlementPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Settlement ===")?;
        writeln!(f, "Players:      {}", self.nets.len())?;
        writeln!(f, "Transfers:    {}", self.transfers.len())?;
        writeln!(f, "Recommended:  {}", self.recommended().count())?;
        writeln!(f, "Imbalance:    {}", self.imbalance())?;
        writeln!(f, "Balanced:     {}", self.is_balanced())?;

        writeln!(f, "\n--- Nets ---")?;
        for balance in &self.nets {
            writeln!(f, "  {:<20} {:>12}", balance.player, balance.amount)?;
        }

        writeln!(f, "\n--- Transfers ---")?;
        for transfer in &self.transfers {
            writeln!(f, "  {}", transfer)?;
        }

        if !self.unsettled.is_empty() {
            writeln!(f, "\n--- Unsettled ---")?;
            for balance in &self.unsettled {
                writeln!(f, "  {:<20} {:>12}", balance.player, balance.amount)?;
            }
        }
        Ok(())
    }
}

/// Amount a player receives minus the amount they pay across `transfers`.
pub fn net_flow(transfers: &[Transfer], player: &PlayerId) -> Decimal {
    transfers.iter().fold(Decimal::ZERO, |acc, t| {
        if &t.to == player {
            acc + t.amount
        } else if &t.from == player {
            acc - t.amount
        } else {
            acc
        }
    })
}

/// Debt-netting settlement engine.
///
/// Stateless apart from its configuration: the caller passes the full
/// player list and recommendations on every call and gets a fresh plan.
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    config: EngineConfig,
}

impl SettlementEngine {
    /// Build an engine. A scale above [`MAX_SCALE`] is clamped.
    pub fn new(mut config: EngineConfig) -> Self {
        if config.validate().is_err() {
            log::warn!("scale {} clamped to {}", config.scale, MAX_SCALE);
            config.scale = MAX_SCALE;
        }
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the transfer list for a session.
    ///
    /// Recommendations come first (flagged `recommended`), then the
    /// matched transfers settling whatever balance remains.
    pub fn compute_transfers(
        &self,
        players: &[Player],
        recommendations: &[Recommendation],
    ) -> Result<Vec<Transfer>, ValidationError> {
        Ok(self.settle(players, recommendations)?.into_transfers())
    }

    /// Settle a session and keep the intermediate balances.
    ///
    /// # Algorithm
    ///
    /// 1. Net per player = cash-out − total buy-in.
    /// 2. Each recommendation moves the payer's and the payee's balance
    ///    toward zero by its amount (see [`AdjustmentMode`]).
    /// 3. Remaining balances split into creditors and debtors, each sorted
    ///    descending with ties in player order.
    /// 4. The largest creditor is repeatedly paired with the largest debtor
    ///    for `min(credit, debt)` until one side runs out.
    pub fn settle(
        &self,
        players: &[Player],
        recommendations: &[Recommendation],
    ) -> Result<SettlementPlan, ValidationError> {
        validate_players(players)?;
        validate_recommendations(players, recommendations)?;
        let scale = self.config.scale;
        let recommendations = round_recommendations(recommendations, scale)?;

        log::debug!(
            "settling {} players with {} recommendations ({:?})",
            players.len(),
            recommendations.len(),
            self.config.adjustment
        );

        let nets: Vec<PlayerBalance> = players
            .iter()
            .map(|p| PlayerBalance::new(p.id().clone(), round_to(p.net(), scale)))
            .collect();

        let mut adjusted = nets.clone();
        for rec in &recommendations {
            // Both ids were validated above.
            if let Some(payer) = adjusted.iter_mut().find(|b| b.player == rec.from) {
                payer.amount = self.toward_zero(payer.amount, rec.amount, true);
            }
            if let Some(payee) = adjusted.iter_mut().find(|b| b.player == rec.to) {
                payee.amount = self.toward_zero(payee.amount, rec.amount, false);
            }
        }

        let mut transfers: Vec<Transfer> = recommendations
            .iter()
            .map(|rec| rec.to_transfer(scale))
            .collect();
        let (matched, unsettled) = self.match_balances(&adjusted);
        transfers.extend(matched);

        let plan = SettlementPlan {
            nets,
            adjusted,
            transfers,
            unsettled,
            scale,
        };
        if !plan.is_balanced() {
            log::warn!(
                "session does not balance: imbalance {}, {} unsettled balances",
                plan.imbalance(),
                plan.unsettled.len()
            );
        }
        Ok(plan)
    }

    /// Move `balance` toward zero by `amount`.
    ///
    /// A zero balance moves up for the payer and down for the payee.
    fn toward_zero(&self, balance: Decimal, amount: Decimal, is_payer: bool) -> Decimal {
        let moves_up = balance < Decimal::ZERO || (balance.is_zero() && is_payer);
        let adjusted = if moves_up {
            balance + amount
        } else {
            balance - amount
        };
        let adjusted = match self.config.adjustment {
            AdjustmentMode::Overshoot => adjusted,
            AdjustmentMode::Clamp if moves_up => adjusted.min(Decimal::ZERO),
            AdjustmentMode::Clamp => adjusted.max(Decimal::ZERO),
        };
        round_to(adjusted, self.config.scale)
    }

    /// Greedy largest-creditor / largest-debtor matching.
    ///
    /// Returns the matched transfers and whatever balances are left over.
    fn match_balances(&self, balances: &[PlayerBalance]) -> (Vec<Transfer>, Vec<PlayerBalance>) {
        let scale = self.config.scale;

        let mut creditors: Vec<PlayerBalance> = balances
            .iter()
            .filter(|b| !is_settled(b.amount, scale) && b.amount > Decimal::ZERO)
            .map(|b| PlayerBalance::new(b.player.clone(), round_to(b.amount, scale)))
            .collect();
        let mut debtors: Vec<PlayerBalance> = balances
            .iter()
            .filter(|b| !is_settled(b.amount, scale) && b.amount < Decimal::ZERO)
            .map(|b| PlayerBalance::new(b.player.clone(), round_to(-b.amount, scale)))
            .collect();

        // Stable sorts: equal amounts keep player order.
        creditors.sort_by(|a, b| b.amount.cmp(&a.amount));
        debtors.sort_by(|a, b| b.amount.cmp(&a.amount));

        let mut transfers = Vec::new();
        let (mut ci, mut di) = (0, 0);
        while ci < creditors.len() && di < debtors.len() {
            let creditor = &mut creditors[ci];
            let debtor = &mut debtors[di];
            let amount = round_to(creditor.amount.min(debtor.amount), scale);

            if amount > Decimal::ZERO {
                log::trace!("match {} → {}: {}", debtor.player, creditor.player, amount);
                transfers.push(Transfer::optimized(
                    debtor.player.clone(),
                    creditor.player.clone(),
                    amount,
                    scale,
                ));
            }

            creditor.amount = round_to(creditor.amount - amount, scale);
            debtor.amount = round_to(debtor.amount - amount, scale);
            if is_settled(creditor.amount, scale) {
                ci += 1;
            }
            if is_settled(debtor.amount, scale) {
                di += 1;
            }
        }

        let unsettled = creditors[ci..]
            .iter()
            .cloned()
            .chain(
                debtors[di..]
                    .iter()
                    .map(|d| PlayerBalance::new(d.player.clone(), -d.amount)),
            )
            .collect();
        (transfers, unsettled)
    }
}

/// Settle with the default configuration.
pub fn compute_transfers(
    players: &[Player],
    recommendations: &[Recommendation],
) -> Result<Vec<Transfer>, ValidationError> {
    SettlementEngine::default().compute_transfers(players, recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn id(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    /// Player whose net is exactly `net`.
    fn with_net(name: &str, net: Decimal) -> Player {
        let buy_in = dec!(100);
        Player::single(name, buy_in, buy_in + net)
    }

    #[test]
    fn test_two_players() {
        let players = vec![
            Player::single("A", dec!(100), dec!(150)),
            Player::single("B", dec!(100), dec!(50)),
        ];
        let transfers = compute_transfers(&players, &[]).unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].from, id("B"));
        assert_eq!(transfers[0].to, id("A"));
        assert_eq!(transfers[0].amount, dec!(50.00));
        assert!(!transfers[0].recommended);
    }

    #[test]
    fn test_one_creditor_two_debtors() {
        let players = vec![
            with_net("A", dec!(50)),
            with_net("B", dec!(-30)),
            with_net("C", dec!(-20)),
        ];
        let transfers = compute_transfers(&players, &[]).unwrap();
        assert_eq!(transfers.len(), 2);
        assert_eq!((&transfers[0].from, transfers[0].amount), (&id("B"), dec!(30)));
        assert_eq!((&transfers[1].from, transfers[1].amount), (&id("C"), dec!(20)));
        assert!(transfers.iter().all(|t| t.to == id("A")));
    }

    #[test]
    fn test_recommendation_applied_first() {
        let players = vec![
            with_net("A", dec!(50)),
            with_net("B", dec!(-30)),
            with_net("C", dec!(-20)),
        ];
        let recs = vec![Recommendation::new(id("B"), id("A"), dec!(30))];
        let plan = SettlementEngine::default().settle(&players, &recs).unwrap();

        let transfers = plan.transfers();
        assert_eq!(transfers.len(), 2);
        assert!(transfers[0].recommended);
        assert_eq!(transfers[0].amount, dec!(30));
        assert_eq!(transfers[1].from, id("C"));
        assert_eq!(transfers[1].to, id("A"));
        assert_eq!(transfers[1].amount, dec!(20));
        assert!(!transfers[1].recommended);

        let adjusted: Vec<Decimal> = plan.adjusted_balances().iter().map(|b| b.amount).collect();
        assert_eq!(adjusted, vec![dec!(20), dec!(0), dec!(-20)]);
        assert!(plan.reproduces_nets());
    }

    #[test]
    fn test_all_even_returns_empty() {
        let players = vec![
            Player::single("A", dec!(100), dec!(100)),
            Player::single("B", dec!(40), dec!(40)),
        ];
        let plan = SettlementEngine::default().settle(&players, &[]).unwrap();
        assert!(plan.transfers().is_empty());
        assert!(plan.is_balanced());
    }

    #[test]
    fn test_overshoot_flips_sign() {
        // B owes 30 but the players agree B pays A 50.
        let players = vec![
            with_net("A", dec!(50)),
            with_net("B", dec!(-30)),
            with_net("C", dec!(-20)),
        ];
        let recs = vec![Recommendation::new(id("B"), id("A"), dec!(50))];
        let plan = SettlementEngine::default().settle(&players, &recs).unwrap();

        let adjusted: Vec<Decimal> = plan.adjusted_balances().iter().map(|b| b.amount).collect();
        assert_eq!(adjusted, vec![dec!(0), dec!(20), dec!(-20)]);

        let optimized: Vec<&Transfer> = plan.optimized().collect();
        assert_eq!(optimized.len(), 1);
        assert_eq!(optimized[0].from, id("C"));
        assert_eq!(optimized[0].to, id("B"));
        assert!(plan.reproduces_nets());
    }

    #[test]
    fn test_clamp_stops_at_zero() {
        let players = vec![
            with_net("A", dec!(50)),
            with_net("B", dec!(-30)),
            with_net("C", dec!(-20)),
        ];
        let recs = vec![Recommendation::new(id("B"), id("A"), dec!(50))];
        let engine =
            SettlementEngine::new(EngineConfig::default().with_adjustment(AdjustmentMode::Clamp));
        let plan = engine.settle(&players, &recs).unwrap();

        let adjusted: Vec<Decimal> = plan.adjusted_balances().iter().map(|b| b.amount).collect();
        assert_eq!(adjusted, vec![dec!(0), dec!(0), dec!(-20)]);
        // C's debt has nobody left to pay.
        assert_eq!(plan.optimized().count(), 0);
        assert_eq!(plan.unsettled(), &[PlayerBalance::new(id("C"), dec!(-20))]);
    }

    #[test]
    fn test_reverse_recommendation_moves_toward_zero() {
        // A creditor recorded as paying still has their credit shrink.
        let players = vec![with_net("A", dec!(50)), with_net("B", dec!(-50))];
        let recs = vec![Recommendation::new(id("A"), id("B"), dec!(10))];
        let plan = SettlementEngine::default().settle(&players, &recs).unwrap();
        let adjusted: Vec<Decimal> = plan.adjusted_balances().iter().map(|b| b.amount).collect();
        assert_eq!(adjusted, vec![dec!(40), dec!(-40)]);
    }

    #[test]
    fn test_rounding_to_cents() {
        let players = vec![
            Player::single("A", dec!(10), dec!(20.005)),
            Player::single("B", dec!(10.005), dec!(0)),
        ];
        let transfers = compute_transfers(&players, &[]).unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].amount, dec!(10.01));
    }

    #[test]
    fn test_ties_keep_player_order() {
        let players = vec![
            with_net("A", dec!(20)),
            with_net("B", dec!(20)),
            with_net("C", dec!(-20)),
            with_net("D", dec!(-20)),
        ];
        let transfers = compute_transfers(&players, &[]).unwrap();
        let pairs: Vec<(&str, &str)> = transfers
            .iter()
            .map(|t| (t.from.as_str(), t.to.as_str()))
            .collect();
        assert_eq!(pairs, vec![("C", "A"), ("D", "B")]);
    }

    #[test]
    fn test_unbalanced_session_reports_leftover() {
        let players = vec![with_net("A", dec!(50)), with_net("B", dec!(-30))];
        let plan = SettlementEngine::default().settle(&players, &[]).unwrap();
        assert_eq!(plan.imbalance(), dec!(20));
        assert!(!plan.is_balanced());
        assert_eq!(plan.unsettled(), &[PlayerBalance::new(id("A"), dec!(20))]);
    }

    #[test]
    fn test_validation_runs_first() {
        let players = vec![with_net("A", dec!(10))];
        let recs = vec![Recommendation::new(id("A"), id("Z"), dec!(10))];
        assert_eq!(
            compute_transfers(&players, &recs),
            Err(ValidationError::UnknownPlayer(id("Z")))
        );
        assert_eq!(compute_transfers(&[], &[]), Err(ValidationError::EmptySession));
    }

    #[test]
    fn test_net_flow() {
        let transfers = vec![
            Transfer::optimized(id("B"), id("A"), dec!(30), 2),
            Transfer::optimized(id("C"), id("A"), dec!(20), 2),
        ];
        assert_eq!(net_flow(&transfers, &id("A")), dec!(50));
        assert_eq!(net_flow(&transfers, &id("B")), dec!(-30));
        assert_eq!(net_flow(&transfers, &id("D")), Decimal::ZERO);
    }

    #[test]
    fn test_plan_display() {
        let players = vec![with_net("A", dec!(5)), with_net("B", dec!(-5))];
        let plan = SettlementEngine::default().settle(&players, &[]).unwrap();
        let report = plan.to_string();
        assert!(report.contains("=== Settlement ==="));
        assert!(report.contains("B → A: 5"));
    }

    #[test]
    fn test_sub_unit_recommendation_rejected() {
        let players = vec![
            Player::single("A", dec!(100), dec!(150)),
            Player::single("B", dec!(100), dec!(50)),
        ];
        let recs = vec![Recommendation::new(id("B"), id("A"), dec!(0.004))];
        assert_eq!(
            compute_transfers(&players, &recs),
            Err(ValidationError::NonPositiveAmount(dec!(0.004)))
        );
    }

    #[test]
    fn test_recommendation_rounded_before_adjusting() {
        let players = vec![
            Player::single("A", dec!(100), dec!(150)),
            Player::single("B", dec!(100), dec!(50)),
        ];
        let recs = vec![Recommendation::new(id("B"), id("A"), dec!(30.006))];
        let plan = SettlementEngine::default().settle(&players, &recs).unwrap();

        assert_eq!(plan.transfers()[0].amount, dec!(30.01));
        assert_eq!(plan.net_of(&id("B")), dec!(-50));
        let adjusted_b = plan
            .adjusted_balances()
            .iter()
            .find(|b| b.player == id("B"))
            .unwrap();
        assert_eq!(adjusted_b.amount, dec!(-19.99));
        assert_eq!(plan.transfers()[1].amount, dec!(19.99));
        assert!(plan.is_balanced());
        assert!(plan.reproduces_nets());
        for player in &players {
            assert_eq!(net_flow(plan.transfers(), player.id()), player.net());
        }
    }

    #[test]
    fn test_overflowing_buy_ins_rejected() {
        let huge = Decimal::MAX / Decimal::from(2) + Decimal::ONE;
        let players = vec![
            Player::new("A", "A", vec![huge, huge], dec!(0)),
            Player::single("B", dec!(100), dec!(50)),
        ];
        assert_eq!(
            compute_transfers(&players, &[]),
            Err(ValidationError::AmountOverflow(id("A")))
        );
    }

    #[test]
    fn test_oversized_scale_is_clamped() {
        let engine = SettlementEngine::new(EngineConfig {
            scale: 29,
            ..Default::default()
        });
        assert_eq!(engine.config().scale, MAX_SCALE);

        let players = vec![with_net("A", dec!(10)), with_net("B", dec!(-10))];
        let plan = engine.settle(&players, &[]).unwrap();
        assert!(plan.reproduces_nets());
        assert_eq!(plan.transfers()[0].amount, dec!(10));
    }
}
