use crate::core::player::PlayerId;
use crate::core::transfer::Transfer;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A transfer the players have agreed on up front.
///
/// Recommendations are applied to the balances before the matcher runs
/// and are echoed back at the head of the transfer list, flagged as
/// recommended.
///
/// # Examples
///
/// ```
/// use homegame_settlement::core::recommendation::Recommendation;
/// use homegame_settlement::core::player::PlayerId;
/// use rust_decimal_macros::dec;
///
/// let rec = Recommendation::new(PlayerId::new("bob"), PlayerId::new("alice"), dec!(30));
/// assert_eq!(rec.amount, dec!(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The paying player.
    pub from: PlayerId,
    /// The receiving player.
    pub to: PlayerId,
    /// Amount to move. Must be positive.
    pub amount: Decimal,
}

impl Recommendation {
    pub fn new(from: PlayerId, to: PlayerId, amount: Decimal) -> Self {
        Self { from, to, amount }
    }

    /// The transfer this recommendation contributes to the settlement.
    pub fn to_transfer(&self, scale: u32) -> Transfer {
        Transfer::recommended(self.from.clone(), self.to.clone(), self.amount, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_recommendation_to_transfer() {
        let rec = Recommendation::new(PlayerId::new("b"), PlayerId::new("a"), dec!(30.004));
        let transfer = rec.to_transfer(2);
        assert_eq!(transfer.from, PlayerId::new("b"));
        assert_eq!(transfer.to, PlayerId::new("a"));
        assert_eq!(transfer.amount, dec!(30.00));
        assert!(transfer.recommended);
        assert!(!transfer.is_paid);
    }
}
