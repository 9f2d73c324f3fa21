//! Splitting a shared dinner bill between the players of a session.
//!
//! The bill is divided equally; cents that do not divide evenly go one at
//! a time to the first participants, so the shares always add up to the
//! bill exactly.

use crate::core::money::{clamp_scale, round_to, unit};
use crate::core::player::{Player, PlayerId};
use crate::core::transfer::Transfer;
use crate::core::validation::{validate_known, ValidationError};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DinnerShare {
    pub player: PlayerId,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DinnerSplit {
    /// Who paid the bill.
    pub payer: PlayerId,
    pub total: Decimal,
    /// One share per participant, in participant order.
    pub shares: Vec<DinnerShare>,
    scale: u32,
}

impl DinnerSplit {
    /// Share owed by `player`, if they took part.
    pub fn share_of(&self, player: &PlayerId) -> Option<Decimal> {
        self.shares
            .iter()
            .find(|s| &s.player == player)
            .map(|s| s.amount)
    }

    /// One transfer per participant other than the payer.
    pub fn transfers(&self) -> Vec<Transfer> {
        self.shares
            .iter()
            .filter(|s| s.player != self.payer && s.amount > Decimal::ZERO)
            .map(|s| Transfer::optimized(s.player.clone(), self.payer.clone(), s.amount, self.scale))
            .collect()
    }
}

/// Split `total` equally between `participants`, all owing `payer`.
///
/// The payer may or may not be a participant.
pub fn split_dinner(
    total: Decimal,
    payer: &PlayerId,
    participants: &[PlayerId],
    scale: u32,
) -> Result<DinnerSplit, ValidationError> {
    let scale = clamp_scale(scale);
    if round_to(total, scale) <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(total));
    }
    if participants.is_empty() {
        return Err(ValidationError::EmptyParticipants);
    }
    let mut seen = HashSet::with_capacity(participants.len());
    for p in participants {
        if !seen.insert(p) {
            return Err(ValidationError::DuplicateParticipant(p.clone()));
        }
    }

    let total = round_to(total, scale);
    let count = Decimal::from(participants.len());
    let base = (total / count).round_dp_with_strategy(scale, RoundingStrategy::ToZero);
    let step = unit(scale);
    let mut remainder = total - base * count;

    let shares = participants
        .iter()
        .map(|p| {
            let mut amount = base;
            if remainder >= step {
                amount += step;
                remainder -= step;
            }
            DinnerShare {
                player: p.clone(),
                amount,
            }
        })
        .collect();

    log::debug!("split dinner of {} between {} players", total, participants.len());
    Ok(DinnerSplit {
        payer: payer.clone(),
        total,
        shares,
        scale,
    })
}

/// Split a dinner among players of `session`.
///
/// Payer and participants must all be players of the session.
pub fn split_session_dinner(
    session: &[Player],
    total: Decimal,
    payer: &PlayerId,
    participants: &[PlayerId],
    scale: u32,
) -> Result<DinnerSplit, ValidationError> {
    validate_known(session, std::iter::once(payer).chain(participants))?;
    split_dinner(total, payer, participants, scale)
}
