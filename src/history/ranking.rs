use crate::core::money::{round_to, DEFAULT_SCALE};
use crate::core::player::PlayerId;
use crate::history::session::SessionSnapshot;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Cumulative results of one player across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub player: PlayerId,
    /// Name the player had in the most recent session folded in.
    pub name: String,
    pub participations: u32,
    pub total_buy_ins: Decimal,
    pub total_cash_out: Decimal,
    /// Cumulative cash-out minus buy-in.
    pub net: Decimal,
    /// Sessions the player finished with a positive net.
    pub sessions_won: u32,
}

impl RankingEntry {
    fn new(player: PlayerId, name: String) -> Self {
        Self {
            player,
            name,
            participations: 0,
            total_buy_ins: Decimal::ZERO,
            total_cash_out: Decimal::ZERO,
            net: Decimal::ZERO,
            sessions_won: 0,
        }
    }

    /// Mean net per session played.
    pub fn average_net(&self) -> Decimal {
        if self.participations == 0 {
            return Decimal::ZERO;
        }
        round_to(self.net / Decimal::from(self.participations), DEFAULT_SCALE)
    }

    /// Fraction of sessions won, in `[0, 1]`.
    pub fn win_rate(&self) -> f64 {
        if self.participations == 0 {
            return 0.0;
        }
        f64::from(self.sessions_won) / f64::from(self.participations)
    }
}

/// Which sessions a ranking covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankingPeriod {
    #[default]
    AllTime,
    Since(DateTime<Utc>),
    Until(DateTime<Utc>),
    Between(DateTime<Utc>, DateTime<Utc>),
}

impl RankingPeriod {
    /// Bounds are inclusive.
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        match self {
            RankingPeriod::AllTime => true,
            RankingPeriod::Since(start) => at >= start,
            RankingPeriod::Until(end) => at <= end,
            RankingPeriod::Between(start, end) => at >= start && at <= end,
        }
    }
}

/// Per-player aggregates, kept in first-seen order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ranking {
    entries: Vec<RankingEntry>,
    #[serde(skip)]
    index: HashMap<PlayerId, usize>,
    sessions: usize,
}

impl Ranking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one session into the ranking.
    ///
    /// A player listed twice in the same session still counts as one
    /// participation. Totals saturate at the [`Decimal`] bounds.
    pub fn add_session(&mut self, session: &SessionSnapshot) {
        let mut present: HashSet<&PlayerId> = HashSet::new();
        let mut session_nets: HashMap<&PlayerId, Decimal> = HashMap::new();

        for player in &session.players {
            let existing = self.index.get(player.id()).copied();
            let slot = match existing {
                Some(slot) => slot,
                None => {
                    self.entries.push(RankingEntry::new(
                        player.id().clone(),
                        player.name().to_string(),
                    ));
                    self.index.insert(player.id().clone(), self.entries.len() - 1);
                    self.entries.len() - 1
                }
            };
            let entry = &mut self.entries[slot];
            entry.name = player.name().to_string();
            entry.total_buy_ins = entry.total_buy_ins.saturating_add(player.total_buy_in());
            entry.total_cash_out = entry.total_cash_out.saturating_add(player.cash_out());
            entry.net = entry.net.saturating_add(player.net());
            if present.insert(player.id()) {
                entry.participations += 1;
            }
            let session_net = session_nets.entry(player.id()).or_insert(Decimal::ZERO);
            *session_net = session_net.saturating_add(player.net());
        }

        for (player, net) in session_nets {
            if net > Decimal::ZERO {
                if let Some(&slot) = self.index.get(player) {
                    self.entries[slot].sessions_won += 1;
                }
            }
        }
        self.sessions += 1;
    }

    /// Number of sessions folded in.
    pub fn session_count(&self) -> usize {
        self.sessions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, player: &PlayerId) -> Option<&RankingEntry> {
        self.index.get(player).map(|&slot| &self.entries[slot])
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    /// Entries for display: descending by net, ties in first-seen order.
    pub fn ordered(&self) -> Vec<&RankingEntry> {
        let mut ordered: Vec<&RankingEntry> = self.entries.iter().collect();
        ordered.sort_by(|a, b| b.net.cmp(&a.net));
        ordered
    }

    /// Players to suggest when starting a new session: most frequent
    /// participants first, ties in first-seen order.
    pub fn suggest_players(&self, limit: usize) -> Vec<&RankingEntry> {
        let mut suggested: Vec<&RankingEntry> = self.entries.iter().collect();
        suggested.sort_by(|a, b| b.participations.cmp(&a.participations));
        suggested.truncate(limit);
        suggested
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Ranking ({} sessions) ===", self.sessions)?;
        for (pos, entry) in self.ordered().iter().enumerate() {
            writeln!(
                f,
                "{:>3}. {:<20} {:>12}  played {:>3}  won {:>3}  avg {:>10}",
                pos + 1,
                entry.name,
                entry.net,
                entry.participations,
                entry.sessions_won,
                entry.average_net()
            )?;
        }
        Ok(())
    }
}

/// Fold every session into a ranking.
pub fn build_ranking(sessions: &[SessionSnapshot]) -> Ranking {
    build_ranking_for(sessions, RankingPeriod::AllTime)
}

/// Fold the sessions played within `period`.
pub fn build_ranking_for(sessions: &[SessionSnapshot], period: RankingPeriod) -> Ranking {
    let mut ranking = Ranking::new();
    for session in sessions.iter().filter(|s| period.contains(&s.played_at)) {
        ranking.add_session(session);
    }
    log::debug!(
        "ranking built from {} of {} sessions, {} players",
        ranking.session_count(),
        sessions.len(),
        ranking.len()
    );
    ranking
}

/// Win rate as a percentage, for reports.
pub fn win_rate_percent(entry: &RankingEntry) -> f64 {
    entry.win_rate() * 100.0
}
