use crate::core::money::round_to;
use crate::core::player::PlayerId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed payment that settles part of a session.
///
/// Produced by the settlement engine; only `is_paid` changes after
/// creation, as players reconcile real-world payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// The paying player (a debtor).
    pub from: PlayerId,
    /// The receiving player (a creditor).
    pub to: PlayerId,
    /// Positive amount, rounded to the engine scale.
    pub amount: Decimal,
    /// Whether this transfer was fixed by the players rather than computed.
    #[serde(default)]
    pub recommended: bool,
    #[serde(default)]
    pub is_paid: bool,
}

impl Transfer {
    /// A transfer computed by the matcher.
    pub fn optimized(from: PlayerId, to: PlayerId, amount: Decimal, scale: u32) -> Self {
        Self {
            from,
            to,
            amount: round_to(amount, scale),
            recommended: false,
            is_paid: false,
        }
    }

    /// A transfer echoed from a recommendation.
    pub fn recommended(from: PlayerId, to: PlayerId, amount: Decimal, scale: u32) -> Self {
        Self {
            recommended: true,
            ..Self::optimized(from, to, amount, scale)
        }
    }

    pub fn with_paid(mut self, is_paid: bool) -> Self {
        self.is_paid = is_paid;
        self
    }

    /// Identity used to toggle payment state across renders and saves.
    pub fn id(&self) -> TransferId {
        TransferId::new(self.from.clone(), self.to.clone(), self.amount)
    }

    /// Key under which the legacy `paid_transfers` map stores this transfer.
    pub fn legacy_key(&self) -> String {
        format!("{}_{}", self.from, self.to)
    }

    /// True if `player` pays or receives in this transfer.
    pub fn involves(&self, player: &PlayerId) -> bool {
        &self.from == player || &self.to == player
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}: {}", self.from, self.to, self.amount)?;
        if self.recommended {
            write!(f, " (recommended)")?;
        }
        if self.is_paid {
            write!(f, " [paid]")?;
        }
        Ok(())
    }
}

/// Composite identity of a transfer: payer, payee and amount.
///
/// The engine does not assign durable ids, so this composite is what the
/// consuming layer keys on. Rendered as `"{from}_{to}_{amount}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId {
    pub from: PlayerId,
    pub to: PlayerId,
    pub amount: Decimal,
}

impl TransferId {
    pub fn new(from: PlayerId, to: PlayerId, amount: Decimal) -> Self {
        Self {
            from,
            to,
            amount: amount.normalize(),
        }
    }

    pub fn matches(&self, transfer: &Transfer) -> bool {
        self.from == transfer.from
            && self.to == transfer.to
            && self.amount == transfer.amount.normalize()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.from, self.to, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> Transfer {
        Transfer::optimized(PlayerId::new("bob"), PlayerId::new("alice"), dec!(50), 2)
    }

    #[test]
    fn test_optimized_rounds_amount() {
        let t = Transfer::optimized(PlayerId::new("a"), PlayerId::new("b"), dec!(33.3333), 2);
        assert_eq!(t.amount, dec!(33.33));
        assert!(!t.recommended);
        assert!(!t.is_paid);
    }

    #[test]
    fn test_legacy_key() {
        assert_eq!(sample().legacy_key(), "bob_alice");
    }

    #[test]
    fn test_transfer_id_ignores_trailing_zeros() {
        let t = sample();
        let id = TransferId::new(PlayerId::new("bob"), PlayerId::new("alice"), dec!(50.00));
        assert!(id.matches(&t));
        assert_eq!(t.id(), id);
        assert_eq!(id.to_string(), "bob_alice_50");
    }

    #[test]
    fn test_transfer_display() {
        let t = sample().with_paid(true);
        assert_eq!(t.to_string(), "bob → alice: 50 [paid]");
    }

    #[test]
    fn test_involves() {
        let t = sample();
        assert!(t.involves(&PlayerId::new("bob")));
        assert!(t.involves(&PlayerId::new("alice")));
        assert!(!t.involves(&PlayerId::new("carol")));
    }

    #[test]
    fn test_transfer_deserializes_with_defaults() {
        let t: Transfer =
            serde_json::from_str(r#"{"from": "bob", "to": "alice", "amount": "50.00"}"#).unwrap();
        assert!(!t.recommended);
        assert!(!t.is_paid);
        assert_eq!(t.amount, dec!(50));
    }
}
