use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a player within a session.
///
/// The display name of a player is a label only; every join between
/// players, recommendations and transfers goes through this id.
///
/// # Examples
///
/// ```
/// use homegame_settlement::core::player::PlayerId;
///
/// let alice = PlayerId::new("alice");
/// let bob = PlayerId::new("bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh identifier for a player joining a session.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A player's figures for one session.
///
/// `buy_ins` keeps the order in which re-buys happened; settlement only
/// looks at their sum.
///
/// # Examples
///
/// ```
/// use homegame_settlement::core::player::Player;
/// use rust_decimal_macros::dec;
///
/// let player = Player::new("alice", "Alice", vec![dec!(50), dec!(50)], dec!(150));
/// assert_eq!(player.total_buy_in(), dec!(100));
/// assert_eq!(player.net(), dec!(50));
/// assert!(player.is_creditor());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    name: String,
    #[serde(default)]
    buy_ins: Vec<Decimal>,
    #[serde(default)]
    cash_out: Decimal,
}

impl Player {
    pub fn new(
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        buy_ins: Vec<Decimal>,
        cash_out: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            buy_ins,
            cash_out,
        }
    }

    /// Player with a single buy-in, the common case in tests and demos.
    pub fn single(id: impl Into<PlayerId>, buy_in: Decimal, cash_out: Decimal) -> Self {
        let id = id.into();
        let name = id.to_string();
        Self::new(id, name, vec![buy_in], cash_out)
    }

    /// Record an additional buy-in during a live session.
    pub fn add_buy_in(&mut self, amount: Decimal) {
        self.buy_ins.push(amount);
    }

    pub fn set_cash_out(&mut self, amount: Decimal) {
        self.cash_out = amount;
    }

    // --- Accessors ---

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buy_ins(&self) -> &[Decimal] {
        &self.buy_ins
    }

    pub fn cash_out(&self) -> Decimal {
        self.cash_out
    }

    /// Sum of all buy-ins, saturating at [`Decimal::MAX`].
    pub fn total_buy_in(&self) -> Decimal {
        self.buy_ins
            .iter()
            .fold(Decimal::ZERO, |acc, a| acc.saturating_add(*a))
    }

    /// Cash-out minus total buy-in. Positive means the player is owed money.
    ///
    /// Saturates on overflow; validated players never reach that point.
    pub fn net(&self) -> Decimal {
        self.cash_out.saturating_sub(self.total_buy_in())
    }

    /// Sum of all buy-ins, or `None` if it overflows.
    pub fn checked_total_buy_in(&self) -> Option<Decimal> {
        self.buy_ins
            .iter()
            .try_fold(Decimal::ZERO, |acc, a| acc.checked_add(*a))
    }

    /// Net result, or `None` if computing it overflows.
    pub fn checked_net(&self) -> Option<Decimal> {
        self.cash_out.checked_sub(self.checked_total_buy_in()?)
    }

    pub fn is_creditor(&self) -> bool {
        self.net() > Decimal::ZERO
    }

    pub fn is_debtor(&self) -> bool {
        self.net() < Decimal::ZERO
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&PlayerId> for PlayerId {
    fn from(id: &PlayerId) -> Self {
        id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_player_id_equality() {
        assert_eq!(PlayerId::new("alice"), PlayerId::from("alice"));
        assert_ne!(PlayerId::new("alice"), PlayerId::new("Alice"));
    }

    #[test]
    fn test_player_id_random_is_unique() {
        let a = PlayerId::random();
        let b = PlayerId::random();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_player_net_winner() {
        let p = Player::single("a", dec!(100), dec!(150));
        assert_eq!(p.net(), dec!(50));
        assert!(p.is_creditor());
        assert!(!p.is_debtor());
    }

    #[test]
    fn test_player_net_with_rebuys() {
        let mut p = Player::single("b", dec!(100), dec!(0));
        p.add_buy_in(dec!(50));
        p.set_cash_out(dec!(30));
        assert_eq!(p.buy_ins(), &[dec!(100), dec!(50)]);
        assert_eq!(p.total_buy_in(), dec!(150));
        assert_eq!(p.net(), dec!(-120));
        assert!(p.is_debtor());
    }

    #[test]
    fn test_player_even() {
        let p = Player::single("c", dec!(80), dec!(80));
        assert_eq!(p.net(), Decimal::ZERO);
        assert!(!p.is_creditor() && !p.is_debtor());
    }

    #[test]
    fn test_player_deserializes_without_cash_out() {
        let p: Player =
            serde_json::from_str(r#"{"id": "d", "name": "Dana", "buy_ins": ["20"]}"#).unwrap();
        assert_eq!(p.cash_out(), Decimal::ZERO);
        assert_eq!(p.net(), dec!(-20));
    }

    #[test]
    fn test_overflowing_buy_ins() {
        let huge = Decimal::MAX / Decimal::from(2) + Decimal::ONE;
        let p = Player::new("e", "Eve", vec![huge, huge], dec!(0));
        assert_eq!(p.checked_total_buy_in(), None);
        assert_eq!(p.checked_net(), None);
        assert_eq!(p.total_buy_in(), Decimal::MAX);
        assert_eq!(Player::single("f", dec!(10), dec!(25)).checked_net(), Some(dec!(15)));
    }
}
