//! Elimination resolver: picks the single agent to drop from the loss
//! ledger.
//!
//! The result shape is the same whether or not a tie-break was needed:
//! `tie_candidates` always lists every agent at the maximum loss count and
//! `rule` always says how the pick was made.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EliminationTiePolicy;
use crate::error::{TournamentError, TournamentResult};
use crate::ledger::LossLedger;
use crate::rng::RandomSource;

/// How the eliminated agent was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationRule {
    /// A single agent had the most losses.
    Outright,
    /// Tie resolved by the configured policy.
    TieBreak(EliminationTiePolicy),
}

/// Result of resolving the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminationOutcome {
    pub eliminated: String,
    pub loss_counts: BTreeMap<String, u32>,
    pub max_losses: u32,
    /// Everyone at `max_losses`, in name order.
    pub tie_candidates: Vec<String>,
    pub tie_broken: bool,
    pub rule: EliminationRule,
}

/// Resolves the ledger under a fixed tie policy.
#[derive(Debug, Clone, Copy)]
pub struct EliminationResolver {
    policy: EliminationTiePolicy,
}

impl EliminationResolver {
    pub fn new(policy: EliminationTiePolicy) -> Self {
        Self { policy }
    }

    /// Pick the eliminated agent.
    ///
    /// The seeded policy calls [`RandomSource::begin_elimination`] and then
    /// draws once from `rng`. With a [`crate::rng::SeededRandom`] that hook
    /// re-derives the stream from the tournament seed, so re-running on the
    /// same ledger gives the same answer. The lexicographic policy and
    /// outright eliminations never touch `rng`.
    pub fn resolve(
        &self,
        ledger: &LossLedger,
        rng: &mut dyn RandomSource,
    ) -> TournamentResult<EliminationOutcome> {
        let max_losses = ledger
            .counts()
            .values()
            .copied()
            .max()
            .ok_or_else(|| TournamentError::Configuration("loss ledger is empty".into()))?;

        // BTreeMap iteration keeps candidates in name order.
        let tie_candidates: Vec<String> = ledger
            .counts()
            .iter()
            .filter(|(_, &count)| count == max_losses)
            .map(|(name, _)| name.clone())
            .collect();

        let (eliminated, rule) = if tie_candidates.len() == 1 {
            (tie_candidates[0].clone(), EliminationRule::Outright)
        } else {
            let pick = match self.policy {
                EliminationTiePolicy::Lexicographic => 0,
                EliminationTiePolicy::SeededRandom => {
                    rng.begin_elimination();
                    rng.pick_index(tie_candidates.len())
                }
            };
            (
                tie_candidates[pick].clone(),
                EliminationRule::TieBreak(self.policy),
            )
        };

        Ok(EliminationOutcome {
            eliminated,
            loss_counts: ledger.counts().clone(),
            max_losses,
            tie_broken: tie_candidates.len() > 1,
            tie_candidates,
            rule,
        })
    }
}
