use crate::core::money::to_f64;
use crate::core::player::PlayerId;
use crate::core::transfer::{Transfer, TransferId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("no transfer matches {0}")]
    UnknownTransfer(TransferId),
}

/// Aggregate payment progress over a transfer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub paid_count: usize,
    pub pending_count: usize,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub total_amount: Decimal,
    /// `paid_amount / total_amount * 100`, or 0 for an empty total.
    pub completion_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Completed,
    Partial,
    Pending,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::Completed => "completed",
            SessionStatus::Partial => "partial",
            SessionStatus::Pending => "pending",
        };
        f.write_str(label)
    }
}

/// Outstanding payments of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPending {
    pub player: PlayerId,
    /// Unpaid transfers where the player pays.
    pub owes: Vec<Transfer>,
    /// Unpaid transfers where the player receives.
    pub owed: Vec<Transfer>,
}

impl PlayerPending {
    pub fn owes_total(&self) -> Decimal {
        self.owes.iter().map(|t| t.amount).sum()
    }

    pub fn owed_total(&self) -> Decimal {
        self.owed.iter().map(|t| t.amount).sum()
    }
}

/// Paid/unpaid bookkeeping over the engine's transfer list.
///
/// The tracker never recomputes transfers; it only reads and sets the
/// `is_paid` flag the consuming layer reconciles against real payments.
pub struct PaymentTracker;

impl PaymentTracker {
    /// Return a copy of `transfers` with every transfer matching `id` set
    /// to `is_paid`.
    pub fn toggle_paid(
        transfers: &[Transfer],
        id: &TransferId,
        is_paid: bool,
    ) -> Result<Vec<Transfer>, PaymentError> {
        if !transfers.iter().any(|t| id.matches(t)) {
            return Err(PaymentError::UnknownTransfer(id.clone()));
        }
        Ok(transfers
            .iter()
            .map(|t| {
                if id.matches(t) {
                    t.clone().with_paid(is_paid)
                } else {
                    t.clone()
                }
            })
            .collect())
    }

    pub fn summary(transfers: &[Transfer]) -> PaymentSummary {
        let (paid, pending): (Vec<&Transfer>, Vec<&Transfer>) =
            transfers.iter().partition(|t| t.is_paid);

        let paid_amount: Decimal = paid.iter().map(|t| t.amount).sum();
        let pending_amount: Decimal = pending.iter().map(|t| t.amount).sum();
        let total_amount = paid_amount + pending_amount;

        let completion_percentage = if total_amount.is_zero() {
            0.0
        } else {
            to_f64(paid_amount * Decimal::from(100) / total_amount).clamp(0.0, 100.0)
        };

        PaymentSummary {
            paid_count: paid.len(),
            pending_count: pending.len(),
            paid_amount,
            pending_amount,
            total_amount,
            completion_percentage,
        }
    }

    pub fn session_status(transfers: &[Transfer]) -> SessionStatus {
        let paid = transfers.iter().filter(|t| t.is_paid).count();
        if paid == transfers.len() {
            SessionStatus::Completed
        } else if paid == 0 {
            SessionStatus::Pending
        } else {
            SessionStatus::Partial
        }
    }

    /// Unpaid transfers a player still has to send or receive.
    pub fn pending_for(transfers: &[Transfer], player: &PlayerId) -> PlayerPending {
        let unpaid = transfers.iter().filter(|t| !t.is_paid);
        let (owes, owed): (Vec<Transfer>, Vec<Transfer>) = unpaid
            .filter(|t| t.involves(player))
            .cloned()
            .partition(|t| &t.from == player);
        PlayerPending {
            player: player.clone(),
            owes,
            owed,
        }
    }
}

impl fmt::Display for PaymentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Payments ===")?;
        writeln!(f, "Paid:       {} ({})", self.paid_count, self.paid_amount)?;
        writeln!(f, "Pending:    {} ({})", self.pending_count, self.pending_amount)?;
        writeln!(f, "Total:      {}", self.total_amount)?;
        writeln!(f, "Completion: {:.1}%", self.completion_percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn transfers() -> Vec<Transfer> {
        vec![
            Transfer::optimized(PlayerId::new("B"), PlayerId::new("A"), dec!(30), 2),
            Transfer::optimized(PlayerId::new("C"), PlayerId::new("A"), dec!(10), 2),
        ]
    }

    #[test]
    fn test_toggle_paid_sets_flag() {
        let list = transfers();
        let id = list[0].id();
        let toggled = PaymentTracker::toggle_paid(&list, &id, true).unwrap();
        assert!(toggled[0].is_paid);
        assert!(!toggled[1].is_paid);
        // The input is untouched.
        assert!(!list[0].is_paid);

        let back = PaymentTracker::toggle_paid(&toggled, &id, false).unwrap();
        assert!(!back[0].is_paid);
    }

    #[test]
    fn test_toggle_unknown_transfer() {
        let id = TransferId::new(PlayerId::new("X"), PlayerId::new("A"), dec!(30));
        assert_eq!(
            PaymentTracker::toggle_paid(&transfers(), &id, true),
            Err(PaymentError::UnknownTransfer(id))
        );
    }

    #[test]
    fn test_summary_partial() {
        let list = PaymentTracker::toggle_paid(&transfers(), &transfers()[0].id(), true).unwrap();
        let summary = PaymentTracker::summary(&list);
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.paid_amount, dec!(30));
        assert_eq!(summary.pending_amount, dec!(10));
        assert_eq!(summary.total_amount, dec!(40));
        assert_relative_eq!(summary.completion_percentage, 75.0);
    }

    #[test]
    fn test_summary_empty() {
        let summary = PaymentTracker::summary(&[]);
        assert_eq!(summary.total_amount, Decimal::ZERO);
        assert_relative_eq!(summary.completion_percentage, 0.0);
    }

    #[test]
    fn test_session_status() {
        let list = transfers();
        assert_eq!(PaymentTracker::session_status(&[]), SessionStatus::Completed);
        assert_eq!(PaymentTracker::session_status(&list), SessionStatus::Pending);

        let partial = PaymentTracker::toggle_paid(&list, &list[1].id(), true).unwrap();
        assert_eq!(PaymentTracker::session_status(&partial), SessionStatus::Partial);

        let done = PaymentTracker::toggle_paid(&partial, &list[0].id(), true).unwrap();
        assert_eq!(PaymentTracker::session_status(&done), SessionStatus::Completed);
        assert_eq!(SessionStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_pending_for_player() {
        let list = PaymentTracker::toggle_paid(&transfers(), &transfers()[1].id(), true).unwrap();

        let a = PaymentTracker::pending_for(&list, &PlayerId::new("A"));
        assert!(a.owes.is_empty());
        assert_eq!(a.owed_total(), dec!(30));

        let b = PaymentTracker::pending_for(&list, &PlayerId::new("B"));
        assert_eq!(b.owes_total(), dec!(30));

        let c = PaymentTracker::pending_for(&list, &PlayerId::new("C"));
        assert!(c.owes.is_empty() && c.owed.is_empty());
    }
}
