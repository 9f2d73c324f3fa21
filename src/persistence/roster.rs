use crate::core::player::{Player, PlayerId};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no player named {0:?}")]
    UnknownName(String),
    #[error("name {name:?} is shared by {} players", .candidates.len())]
    AmbiguousName {
        name: String,
        candidates: Vec<PlayerId>,
    },
}

/// Case-insensitive name → [`PlayerId`] lookup for legacy, name-keyed rows.
///
/// Ambiguous names are reported rather than resolved to one of the
/// candidates.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    by_name: HashMap<String, Vec<PlayerId>>,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl NameResolver {
    pub fn new(players: &[Player]) -> Self {
        let mut by_name: HashMap<String, Vec<PlayerId>> = HashMap::new();
        for player in players {
            let ids = by_name.entry(normalize(player.name())).or_default();
            if !ids.contains(player.id()) {
                ids.push(player.id().clone());
            }
        }
        Self { by_name }
    }

    pub fn resolve(&self, name: &str) -> Result<&PlayerId, ResolveError> {
        match self.by_name.get(&normalize(name)).map(Vec::as_slice) {
            Some([id]) => Ok(id),
            Some(candidates) if !candidates.is_empty() => Err(ResolveError::AmbiguousName {
                name: name.to_string(),
                candidates: candidates.to_vec(),
            }),
            _ => Err(ResolveError::UnknownName(name.to_string())),
        }
    }

    /// Names that map to more than one player.
    pub fn ambiguous_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .by_name
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn roster() -> Vec<Player> {
        vec![
            Player::new("p1", "Alice", vec![dec!(10)], dec!(0)),
            Player::new("p2", "Bob", vec![dec!(10)], dec!(0)),
            Player::new("p3", "bob ", vec![dec!(10)], dec!(0)),
        ]
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let resolver = NameResolver::new(&roster());
        assert_eq!(resolver.resolve("ALICE"), Ok(&PlayerId::new("p1")));
        assert_eq!(resolver.resolve(" alice"), Ok(&PlayerId::new("p1")));
    }

    #[test]
    fn test_ambiguous_name() {
        let resolver = NameResolver::new(&roster());
        assert_eq!(
            resolver.resolve("Bob"),
            Err(ResolveError::AmbiguousName {
                name: "Bob".to_string(),
                candidates: vec![PlayerId::new("p2"), PlayerId::new("p3")],
            })
        );
        assert_eq!(resolver.ambiguous_names(), vec!["bob"]);
    }

    #[test]
    fn test_unknown_name() {
        let resolver = NameResolver::new(&roster());
        assert_eq!(
            resolver.resolve("carol"),
            Err(ResolveError::UnknownName("carol".to_string()))
        );
    }
}
