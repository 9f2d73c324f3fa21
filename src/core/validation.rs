use crate::core::money::round_to;
use crate::core::player::{Player, PlayerId};
use crate::core::recommendation::Recommendation;
use rust_decimal::Decimal;
use std::collections::HashSet;
use thiserror::Error;

/// Malformed settlement input, reported before any computation runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("session has no players")]
    EmptySession,
    #[error("player id must not be empty")]
    EmptyPlayerId,
    #[error("player {0} has an empty name")]
    EmptyPlayerName(PlayerId),
    #[error("player {0} appears more than once")]
    DuplicatePlayer(PlayerId),
    #[error("buy-in must be positive, got {amount} for player {player}")]
    NonPositiveBuyIn { player: PlayerId, amount: Decimal },
    #[error("cash-out must not be negative, got {amount} for player {player}")]
    NegativeCashOut { player: PlayerId, amount: Decimal },
    #[error("amount is not a finite number: {0}")]
    NonFiniteAmount(String),
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("recommendation from {0} to itself")]
    SelfTransfer(PlayerId),
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("no participants to split between")]
    EmptyParticipants,
    #[error("participant {0} listed more than once")]
    DuplicateParticipant(PlayerId),
    #[error("amounts of player {0} overflow")]
    AmountOverflow(PlayerId),
}

/// Check players: non-empty list, unique non-empty ids, positive buy-ins,
/// non-negative cash-out, and totals that fit in a [`Decimal`].
pub fn validate_players(players: &[Player]) -> Result<(), ValidationError> {
    if players.is_empty() {
        return Err(ValidationError::EmptySession);
    }

    let mut seen = HashSet::with_capacity(players.len());
    let (mut credits, mut debts) = (Decimal::ZERO, Decimal::ZERO);
    for player in players {
        if player.id().is_empty() {
            return Err(ValidationError::EmptyPlayerId);
        }
        if player.name().trim().is_empty() {
            return Err(ValidationError::EmptyPlayerName(player.id().clone()));
        }
        if !seen.insert(player.id()) {
            return Err(ValidationError::DuplicatePlayer(player.id().clone()));
        }
        if let Some(&amount) = player.buy_ins().iter().find(|a| **a <= Decimal::ZERO) {
            return Err(ValidationError::NonPositiveBuyIn {
                player: player.id().clone(),
                amount,
            });
        }
        if player.cash_out() < Decimal::ZERO {
            return Err(ValidationError::NegativeCashOut {
                player: player.id().clone(),
                amount: player.cash_out(),
            });
        }

        // Credits and debts are summed separately so that neither side of
        // the session total can overflow later.
        let overflow = || ValidationError::AmountOverflow(player.id().clone());
        let net = player.checked_net().ok_or_else(overflow)?;
        if net > Decimal::ZERO {
            credits = credits.checked_add(net).ok_or_else(overflow)?;
        } else {
            debts = debts.checked_sub(net).ok_or_else(overflow)?;
        }
    }
    Ok(())
}

/// Check recommendations against an already-validated player list.
pub fn validate_recommendations(
    players: &[Player],
    recommendations: &[Recommendation],
) -> Result<(), ValidationError> {
    let known: HashSet<&PlayerId> = players.iter().map(Player::id).collect();
    for rec in recommendations {
        if rec.from == rec.to {
            return Err(ValidationError::SelfTransfer(rec.from.clone()));
        }
        for id in [&rec.from, &rec.to] {
            if !known.contains(id) {
                return Err(ValidationError::UnknownPlayer(id.clone()));
            }
        }
        if rec.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(rec.amount));
        }
    }
    Ok(())
}

/// Round every recommendation to `scale`.
///
/// An amount that rounds to zero is rejected with the amount as given.
pub fn round_recommendations(
    recommendations: &[Recommendation],
    scale: u32,
) -> Result<Vec<Recommendation>, ValidationError> {
    recommendations
        .iter()
        .map(|rec| {
            let amount = round_to(rec.amount, scale);
            if amount <= Decimal::ZERO {
                return Err(ValidationError::NonPositiveAmount(rec.amount));
            }
            Ok(Recommendation::new(rec.from.clone(), rec.to.clone(), amount))
        })
        .collect()
}

/// Check that every id belongs to a player of the session.
pub fn validate_known<'a>(
    players: &[Player],
    ids: impl IntoIterator<Item = &'a PlayerId>,
) -> Result<(), ValidationError> {
    let known: HashSet<&PlayerId> = players.iter().map(Player::id).collect();
    match ids.into_iter().find(|id| !known.contains(id)) {
        Some(id) => Err(ValidationError::UnknownPlayer(id.clone())),
        None => Ok(()),
    }
}

/// Drop recommendations that reference players not in the session.
///
/// Used by callers restoring saved recommendations after players were
/// removed from a session.
pub fn retain_known(players: &[Player], recommendations: &[Recommendation]) -> Vec<Recommendation> {
    let known: HashSet<&PlayerId> = players.iter().map(Player::id).collect();
    recommendations
        .iter()
        .filter(|rec| known.contains(&rec.from) && known.contains(&rec.to))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn players() -> Vec<Player> {
        vec![
            Player::single("a", dec!(100), dec!(150)),
            Player::single("b", dec!(100), dec!(50)),
        ]
    }

    #[test]
    fn test_valid_players() {
        assert!(validate_players(&players()).is_ok());
    }

    #[test]
    fn test_empty_session() {
        assert_eq!(validate_players(&[]), Err(ValidationError::EmptySession));
    }

    #[test]
    fn test_duplicate_player() {
        let mut list = players();
        list.push(Player::single("a", dec!(10), dec!(10)));
        assert_eq!(
            validate_players(&list),
            Err(ValidationError::DuplicatePlayer(PlayerId::new("a")))
        );
    }

    #[test]
    fn test_empty_name() {
        let list = vec![Player::new("a", "  ", vec![dec!(10)], dec!(0))];
        assert_eq!(
            validate_players(&list),
            Err(ValidationError::EmptyPlayerName(PlayerId::new("a")))
        );
    }

    #[test]
    fn test_empty_id() {
        let list = vec![Player::new("", "Nobody", vec![dec!(10)], dec!(0))];
        assert_eq!(validate_players(&list), Err(ValidationError::EmptyPlayerId));
    }

    #[test]
    fn test_zero_buy_in_rejected() {
        let list = vec![Player::new("a", "A", vec![dec!(10), dec!(0)], dec!(0))];
        assert!(matches!(
            validate_players(&list),
            Err(ValidationError::NonPositiveBuyIn { .. })
        ));
    }

    #[test]
    fn test_negative_cash_out_rejected() {
        let list = vec![Player::single("a", dec!(10), dec!(-1))];
        assert!(matches!(
            validate_players(&list),
            Err(ValidationError::NegativeCashOut { .. })
        ));
    }

    #[test]
    fn test_recommendation_self_transfer() {
        let recs = vec![Recommendation::new("a".into(), "a".into(), dec!(10))];
        assert_eq!(
            validate_recommendations(&players(), &recs),
            Err(ValidationError::SelfTransfer(PlayerId::new("a")))
        );
    }

    #[test]
    fn test_recommendation_unknown_player() {
        let recs = vec![Recommendation::new("b".into(), "zed".into(), dec!(10))];
        assert_eq!(
            validate_recommendations(&players(), &recs),
            Err(ValidationError::UnknownPlayer(PlayerId::new("zed")))
        );
    }

    #[test]
    fn test_recommendation_non_positive_amount() {
        let recs = vec![Recommendation::new("b".into(), "a".into(), dec!(0))];
        assert_eq!(
            validate_recommendations(&players(), &recs),
            Err(ValidationError::NonPositiveAmount(dec!(0)))
        );
    }

    #[test]
    fn test_overflowing_player_rejected() {
        let huge = Decimal::MAX / Decimal::from(2) + Decimal::ONE;
        let list = vec![
            Player::new("a", "A", vec![huge, huge], dec!(0)),
            Player::single("b", dec!(10), dec!(10)),
        ];
        assert_eq!(
            validate_players(&list),
            Err(ValidationError::AmountOverflow(PlayerId::new("a")))
        );
    }

    #[test]
    fn test_overflowing_session_total_rejected() {
        let big = Decimal::MAX - dec!(1);
        let list = vec![
            Player::single("a", dec!(1), big),
            Player::single("b", dec!(1), big),
        ];
        assert_eq!(
            validate_players(&list),
            Err(ValidationError::AmountOverflow(PlayerId::new("b")))
        );
    }

    #[test]
    fn test_round_recommendations() {
        let recs = vec![Recommendation::new("b".into(), "a".into(), dec!(30.006))];
        let rounded = round_recommendations(&recs, 2).unwrap();
        assert_eq!(rounded[0].amount, dec!(30.01));
    }

    #[test]
    fn test_sub_unit_recommendation_rejected() {
        let recs = vec![Recommendation::new("b".into(), "a".into(), dec!(0.004))];
        assert_eq!(
            round_recommendations(&recs, 2),
            Err(ValidationError::NonPositiveAmount(dec!(0.004)))
        );
        assert!(round_recommendations(&recs, 3).is_ok());
    }

    #[test]
    fn test_validate_known() {
        let list = players();
        let a = PlayerId::new("a");
        let typo = PlayerId::new("bb");
        assert!(validate_known(&list, [&a]).is_ok());
        assert_eq!(
            validate_known(&list, [&a, &typo]),
            Err(ValidationError::UnknownPlayer(typo.clone()))
        );
    }

    #[test]
    fn test_retain_known() {
        let recs = vec![
            Recommendation::new("b".into(), "a".into(), dec!(10)),
            Recommendation::new("gone".into(), "a".into(), dec!(10)),
        ];
        let kept = retain_known(&players(), &recs);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].from, PlayerId::new("b"));
    }
}
