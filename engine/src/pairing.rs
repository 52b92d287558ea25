//! Pairing selector: two distinct debaters, everyone else spectates.

use std::collections::HashSet;

use crate::agent::SharedAgent;
use crate::error::{TournamentError, TournamentResult};
use crate::rng::RandomSource;

/// Two debaters plus at least one spectator.
pub const MIN_ROSTER: usize = 3;

/// Roster indices for one battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    /// Speaks turns 1, 3, 5, ...
    pub first: usize,
    /// Speaks turns 2, 4, 6, ...
    pub second: usize,
    /// Remaining roster members, in roster order.
    pub spectators: Vec<usize>,
}

/// Reject rosters the tournament cannot run on.
pub fn validate_roster(roster: &[SharedAgent]) -> TournamentResult<()> {
    if roster.len() < MIN_ROSTER {
        return Err(TournamentError::InsufficientRoster {
            found: roster.len(),
            required: MIN_ROSTER,
        });
    }

    let mut seen = HashSet::new();
    for agent in roster {
        let raw = agent.name();
        let name = raw.trim();
        if name.is_empty() {
            return Err(TournamentError::Configuration(format!(
                "agent '{}' has an empty name",
                agent.id()
            )));
        }
        // Reports store names on single lines and read them back trimmed.
        if raw != name || raw.contains('\n') {
            return Err(TournamentError::Configuration(format!(
                "agent name {raw:?} has surrounding whitespace or a line break"
            )));
        }
        if !seen.insert(name) {
            return Err(TournamentError::Configuration(format!(
                "duplicate agent name '{name}'"
            )));
        }
    }
    Ok(())
}

/// Draw the two debaters for the next battle.
///
/// Consumes exactly two draws from `rng`, so the same seed and call sequence
/// always reproduces the same pairings.
pub fn select_pair(
    roster: &[SharedAgent],
    rng: &mut dyn RandomSource,
) -> TournamentResult<Pairing> {
    let n = roster.len();
    if n < MIN_ROSTER {
        return Err(TournamentError::InsufficientRoster {
            found: n,
            required: MIN_ROSTER,
        });
    }

    let first = rng.pick_index(n);
    let mut second = rng.pick_index(n - 1);
    if second >= first {
        second += 1;
    }

    let spectators = (0..n).filter(|&i| i != first && i != second).collect();
    Ok(Pairing {
        first,
        second,
        spectators,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::ScriptedAgent;
    use crate::rng::{ScriptedRandom, SeededRandom};

    fn roster(names: &[&str]) -> Vec<SharedAgent> {
        names.iter().map(|n| ScriptedAgent::new(n).shared()).collect()
    }

    #[test]
    fn scripted_draws_pick_expected_pair() {
        let roster = roster(&["A", "B", "C", "D", "E"]);
        let mut rng = ScriptedRandom::new(vec![1, 2]);
        let pairing = select_pair(&roster, &mut rng).unwrap();
        assert_eq!(pairing.first, 1);
        assert_eq!(pairing.second, 3);
        assert_eq!(pairing.spectators, vec![0, 2, 4]);
    }

    #[test]
    fn debaters_always_distinct() {
        let roster = roster(&["A", "B", "C"]);
        let mut rng = SeededRandom::new(99);
        for _ in 0..200 {
            let p = select_pair(&roster, &mut rng).unwrap();
            assert_ne!(p.first, p.second);
            assert_eq!(p.spectators.len(), 1);
        }
    }

    #[test]
    fn reproducible_with_same_seed() {
        let roster = roster(&["A", "B", "C", "D", "E"]);
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..20 {
            assert_eq!(
                select_pair(&roster, &mut a).unwrap(),
                select_pair(&roster, &mut b).unwrap()
            );
        }
    }

    #[test]
    fn two_agents_is_insufficient() {
        let roster = roster(&["A", "B"]);
        let mut rng = SeededRandom::new(1);
        let err = select_pair(&roster, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            TournamentError::InsufficientRoster { found: 2, required: 3 }
        ));
        assert!(validate_roster(&roster).is_err());
    }

    #[test]
    fn duplicate_names_rejected() {
        let roster = roster(&["A", "B", "A"]);
        assert!(matches!(
            validate_roster(&roster),
            Err(TournamentError::Configuration(_))
        ));
    }

    #[test]
    fn padded_or_multiline_names_are_rejected() {
        for bad in ["Carol ", " Carol", "Ca\nrol", "Carol\n"] {
            let names = ["A", "B", bad];
            let err = validate_roster(&roster(&names)).unwrap_err();
            assert!(matches!(err, TournamentError::Configuration(_)), "{bad:?}");
        }
        assert!(validate_roster(&roster(&["A", "B", "Carol Ann"])).is_ok());
    }
}
