//! Tournament loop.
//!
//! Runs battles with increasing indices starting one past the highest
//! persisted index, persists each one before moving on, and always finishes
//! by resolving the elimination and rewriting the aggregate report. A run
//! with nothing left to simulate only recomputes the aggregate.

use serde::Serialize;
use tracing::{info, warn};

use crate::agent::SharedAgent;
use crate::battle::BattleRunner;
use crate::config::TournamentConfig;
use crate::elimination::{EliminationOutcome, EliminationResolver, EliminationRule};
use crate::error::{TournamentError, TournamentResult};
use crate::ledger::LossLedger;
use crate::pairing::validate_roster;
use crate::rng::{RandomSource, SeededRandom};
use crate::store::ReportStore;

/// What a call to [`Tournament::run`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TournamentSummary {
    /// Index the run started simulating at.
    pub first_new_index: u32,
    /// Battles simulated by this run.
    pub battles_run: u32,
    /// Battles persisted in total, this run included.
    pub battles_completed: u32,
    pub ledger: LossLedger,
    pub outcome: EliminationOutcome,
}

impl TournamentSummary {
    /// One-line human status.
    pub fn status_line(&self) -> String {
        let losses = self.outcome.max_losses;
        let unit = if losses == 1 { "loss" } else { "losses" };
        let mut line = format!(
            "{} battles completed ({} new). Eliminated: {} with {losses} {unit}",
            self.battles_completed, self.battles_run, self.outcome.eliminated
        );
        if let EliminationRule::TieBreak(policy) = self.outcome.rule {
            line.push_str(&format!(
                " (tie-break {policy} among {})",
                self.outcome.tie_candidates.join(", ")
            ));
        }
        line.push('.');
        line
    }
}

/// A fixed roster, a report store and a random source.
pub struct Tournament {
    config: TournamentConfig,
    roster: Vec<SharedAgent>,
    rng: Box<dyn RandomSource>,
    runner: BattleRunner,
    resolver: EliminationResolver,
}

impl Tournament {
    /// Tournament drawing from a [`SeededRandom`] built from `config.seed`.
    pub fn new(config: TournamentConfig, roster: Vec<SharedAgent>) -> Self {
        let rng = Box::new(SeededRandom::new(config.seed));
        Self::with_random(config, roster, rng)
    }

    /// Tournament drawing from a caller-supplied source.
    pub fn with_random(
        config: TournamentConfig,
        roster: Vec<SharedAgent>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let runner = BattleRunner::from_config(&config);
        let resolver = EliminationResolver::new(config.elimination_tie_policy);
        Self {
            config,
            roster,
            rng,
            runner,
            resolver,
        }
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn roster_names(&self) -> Vec<String> {
        self.roster.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn store(&self) -> TournamentResult<ReportStore> {
        Ok(ReportStore::open(&self.config.battles_dir)?)
    }

    /// Recover the loss ledger from persisted reports alone.
    pub fn rebuild_ledger(&self) -> TournamentResult<LossLedger> {
        Ok(self.store()?.rebuild_ledger(self.roster_names())?)
    }

    /// Recompute the elimination from persisted reports without simulating.
    pub fn resolve_from_store(&mut self) -> TournamentResult<EliminationOutcome> {
        let ledger = self.rebuild_ledger()?;
        self.resolver.resolve(&ledger, self.rng.as_mut())
    }

    /// Run up to the configured battle count, then resolve and rewrite the
    /// aggregate report.
    pub async fn run(&mut self) -> TournamentResult<TournamentSummary> {
        self.config.validate()?;
        validate_roster(&self.roster)?;

        let store = self.store()?;
        let persisted = store.completed_indices()?;
        let highest = persisted.last().copied().unwrap_or(0);
        if persisted.len() as u32 != highest {
            warn!(
                persisted = persisted.len(),
                highest, "battle reports have gaps; indices below the highest are not refilled"
            );
        }
        let mut ledger = store.rebuild_ledger(self.roster_names())?;
        let first_new_index = highest.checked_add(1).ok_or_else(|| {
            TournamentError::Configuration(format!(
                "battle index {highest} leaves no room for another battle"
            ))
        })?;
        info!(
            persisted = persisted.len(),
            first_new_index,
            battle_count = self.config.battle_count,
            "tournament starting"
        );

        let mut battles_run = 0;
        for index in first_new_index..=self.config.battle_count {
            let result = self.runner.run(index, &self.roster, self.rng.as_mut()).await?;
            store.write_battle(&result)?;
            if ledger.record(&result.loser).is_none() {
                return Err(TournamentError::Configuration(format!(
                    "battle {index} loser '{}' is not on the roster",
                    result.loser
                )));
            }
            battles_run += 1;

            let outcome = self.resolver.resolve(&ledger, self.rng.as_mut())?;
            store.write_aggregate(&self.config.final_report, &ledger, &outcome)?;
        }

        if battles_run == 0 {
            info!(highest, "no battles left to run; recomputing elimination");
        }
        let outcome = self.resolver.resolve(&ledger, self.rng.as_mut())?;
        store.write_aggregate(&self.config.final_report, &ledger, &outcome)?;
        info!(
            eliminated = %outcome.eliminated,
            max_losses = outcome.max_losses,
            tie_broken = outcome.tie_broken,
            "tournament resolved"
        );

        Ok(TournamentSummary {
            first_new_index,
            battles_run,
            battles_completed: ledger.total(),
            ledger,
            outcome,
        })
    }
}
