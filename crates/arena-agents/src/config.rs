//! Configuration: built-in defaults, an optional TOML file, command-line
//! flags, and environment variables for the remote endpoint.

use std::path::PathBuf;

use anyhow::{Context, Result};
use arena_engine::{BattleTiePolicy, EliminationTiePolicy, TopicSource, TournamentConfig};
use clap::{Parser, ValueEnum};
use serde::de::DeserializeOwned;

pub const DEFAULT_MODEL: &str = "gpt-5.2";
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/responses";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Which agent implementation fills the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AgentKind {
    /// Canned phrases and a keyword-scoring judge. No network.
    #[default]
    Template,
    /// Every turn and verdict from a remote text-generation endpoint.
    Remote,
}

/// Parse a snake_case policy name the same way the TOML file spells it.
fn parse_snake<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unrecognized value '{raw}'"))
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "debate-arena", version, about = "Round-based elimination tournament among debating agents")]
pub struct Args {
    /// TOML file with tournament settings; flags override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Total number of battles the tournament should reach [default: 30].
    #[arg(long)]
    pub battles: Option<u32>,

    /// Minimum turns per battle, inclusive [default: 12].
    #[arg(long)]
    pub min_turns: Option<u32>,

    /// Maximum turns per battle, inclusive [default: 30].
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Seed for pairing, turn-count and tie-break draws [default: 42].
    #[arg(long)]
    pub seed: Option<u64>,

    /// first_speaker or alignment_cascade [default: first_speaker].
    #[arg(long, value_parser = parse_snake::<BattleTiePolicy>)]
    pub battle_tie_policy: Option<BattleTiePolicy>,

    /// lexicographic or seeded_random [default: lexicographic].
    #[arg(long, value_parser = parse_snake::<EliminationTiePolicy>)]
    pub elimination_tie_policy: Option<EliminationTiePolicy>,

    /// declared or profile [default: declared].
    #[arg(long, value_parser = parse_snake::<TopicSource>)]
    pub topic_source: Option<TopicSource>,

    /// Directory holding battle-<n>.md reports [default: battles].
    #[arg(long)]
    pub battles_dir: Option<PathBuf>,

    /// Aggregate report path [default: final.md].
    #[arg(long)]
    pub final_report: Option<PathBuf>,

    /// Agent implementation.
    #[arg(long, value_enum, default_value_t = AgentKind::Template)]
    pub agents: AgentKind,

    /// Directory of <id>.md self-introductions for the remote agent.
    #[arg(long)]
    pub profiles_dir: Option<PathBuf>,
}

impl Args {
    /// Defaults, then the TOML file, then flags.
    pub fn tournament_config(&self) -> Result<TournamentConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            None => TournamentConfig::default(),
        };

        if let Some(v) = self.battles {
            config.battle_count = v;
        }
        if let Some(v) = self.min_turns {
            config.min_turns = v;
        }
        if let Some(v) = self.max_turns {
            config.max_turns = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.battle_tie_policy {
            config.battle_tie_policy = v;
        }
        if let Some(v) = self.elimination_tie_policy {
            config.elimination_tie_policy = v;
        }
        if let Some(v) = self.topic_source {
            config.topic_source = v;
        }
        if let Some(v) = &self.battles_dir {
            config.battles_dir = v.clone();
        }
        if let Some(v) = &self.final_report {
            config.final_report = v.clone();
        }

        config.validate().context("Invalid tournament configuration")?;
        Ok(config)
    }
}

/// Remote endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            url: DEFAULT_API_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RemoteSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `ARENA_*` variables win over their `OPENAI_*` counterparts.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| lookup(k))
                .find(|v| !v.trim().is_empty())
        };
        let defaults = Self::default();
        Self {
            api_key: first(&["ARENA_API_KEY", "OPENAI_API_KEY"]),
            model: first(&["ARENA_MODEL", "OPENAI_MODEL"]).unwrap_or(defaults.model),
            url: first(&["ARENA_API_URL"]).unwrap_or(defaults.url),
            timeout_secs: first(&["ARENA_TIMEOUT_SEC", "OPENAI_TIMEOUT_SEC"])
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arena.toml");
        std::fs::write(
            &path,
            "battle_count = 8\nseed = 7\nelimination_tie_policy = \"seeded_random\"\n",
        )
        .unwrap();

        let args = Args::parse_from([
            "debate-arena",
            "--config",
            path.to_str().unwrap(),
            "--seed",
            "99",
            "--battle-tie-policy",
            "alignment_cascade",
        ]);
        let config = args.tournament_config().unwrap();
        assert_eq!(config.battle_count, 8);
        assert_eq!(config.seed, 99);
        assert_eq!(config.elimination_tie_policy, EliminationTiePolicy::SeededRandom);
        assert_eq!(config.battle_tie_policy, BattleTiePolicy::AlignmentCascade);
        assert_eq!(config.min_turns, 12);
        assert_eq!(args.agents, AgentKind::Template);
    }

    #[test]
    fn bad_policy_is_rejected_by_the_parser() {
        let parsed = Args::try_parse_from(["debate-arena", "--elimination-tie-policy", "coin_flip"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn inverted_turn_bounds_fail_validation() {
        let args = Args::parse_from(["debate-arena", "--min-turns", "9", "--max-turns", "3"]);
        assert!(args.tournament_config().is_err());
    }

    #[test]
    fn env_lookup_prefers_arena_vars() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-openai"),
            ("ARENA_API_KEY", "sk-arena"),
            ("OPENAI_MODEL", "gpt-test"),
            ("OPENAI_TIMEOUT_SEC", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let settings = RemoteSettings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(settings.api_key.as_deref(), Some("sk-arena"));
        assert_eq!(settings.model, "gpt-test");
        assert_eq!(settings.url, DEFAULT_API_URL);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
