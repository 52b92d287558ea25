//! Tournament configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{TournamentError, TournamentResult};

/// How a battle's vote tally is resolved when both debaters got the same
/// number of votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleTiePolicy {
    /// The first speaker loses ties.
    #[default]
    FirstSpeaker,
    /// Compare spectator keyword alignment: score sum, then topic mentions,
    /// then unique keyword overlap, then name order.
    AlignmentCascade,
}

/// How the eliminated agent is chosen among agents tied on losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationTiePolicy {
    /// Lexicographically first name.
    #[default]
    Lexicographic,
    /// Draw from the tournament random source.
    SeededRandom,
}

impl std::fmt::Display for EliminationTiePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexicographic => write!(f, "lexicographic"),
            Self::SeededRandom => write!(f, "seeded_random"),
        }
    }
}

/// Where a battle's topic comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicSource {
    /// Parsed from the first speaker's `Topic:` line.
    #[default]
    Declared,
    /// Taken from the first speaker's profile.
    Profile,
}

/// Settings for one tournament run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Total battles the tournament should reach.
    pub battle_count: u32,
    /// Inclusive lower bound on turns per battle.
    pub min_turns: u32,
    /// Inclusive upper bound on turns per battle.
    pub max_turns: u32,
    pub seed: u64,
    pub battle_tie_policy: BattleTiePolicy,
    pub elimination_tie_policy: EliminationTiePolicy,
    pub topic_source: TopicSource,
    /// Directory holding `battle-<n>.md` reports.
    pub battles_dir: PathBuf,
    /// Aggregate report path.
    pub final_report: PathBuf,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            battle_count: 30,
            min_turns: 12,
            max_turns: 30,
            seed: 42,
            battle_tie_policy: BattleTiePolicy::default(),
            elimination_tie_policy: EliminationTiePolicy::default(),
            topic_source: TopicSource::default(),
            battles_dir: PathBuf::from("battles"),
            final_report: PathBuf::from("final.md"),
        }
    }
}

impl TournamentConfig {
    pub fn validate(&self) -> TournamentResult<()> {
        if self.min_turns == 0 {
            return Err(TournamentError::Configuration(
                "min_turns must be at least 1".into(),
            ));
        }
        if self.min_turns > self.max_turns {
            return Err(TournamentError::Configuration(format!(
                "min_turns ({}) exceeds max_turns ({})",
                self.min_turns, self.max_turns
            )));
        }
        Ok(())
    }

    /// Fix the turn count to exactly `turns`.
    pub fn with_fixed_turns(mut self, turns: u32) -> Self {
        self.min_turns = turns;
        self.max_turns = turns;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TournamentConfig::default();
        assert_eq!(config.battle_count, 30);
        assert_eq!((config.min_turns, config.max_turns), (12, 30));
        assert_eq!(config.seed, 42);
        assert_eq!(config.battle_tie_policy, BattleTiePolicy::FirstSpeaker);
        assert_eq!(
            config.elimination_tie_policy,
            EliminationTiePolicy::Lexicographic
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let config = TournamentConfig {
            min_turns: 20,
            max_turns: 10,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TournamentError::Configuration(_))
        ));
        let zero = TournamentConfig::default().with_fixed_turns(0);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: TournamentConfig = toml::from_str(
            r#"
            battle_count = 5
            elimination_tie_policy = "seeded_random"
            battle_tie_policy = "alignment_cascade"
            "#,
        )
        .unwrap();
        assert_eq!(config.battle_count, 5);
        assert_eq!(config.min_turns, 12);
        assert_eq!(
            config.elimination_tie_policy,
            EliminationTiePolicy::SeededRandom
        );
        assert_eq!(config.battle_tie_policy, BattleTiePolicy::AlignmentCascade);
    }
}
