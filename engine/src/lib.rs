//! Arena engine
//!
//! Deterministic core of a round-based elimination tournament among debating
//! agents:
//!
//! - [`pairing`]: picks two distinct debaters, the rest become spectators
//! - [`scheduler`]: drives the alternating dialogue and fixes the topic
//! - [`judgment`]: collects spectator verdicts and resolves the loser
//! - [`tournament`]: runs battles, persists them and keeps the loss ledger
//! - [`elimination`]: picks the eliminated agent from the ledger
//!
//! Agents are collaborators behind the [`Agent`] trait; all randomness goes
//! through an explicit [`RandomSource`].
//!
//! # Usage
//!
//! ```no_run
//! use arena_engine::{SharedAgent, Tournament, TournamentConfig};
//!
//! # async fn demo(roster: Vec<SharedAgent>) -> Result<(), arena_engine::TournamentError> {
//! let mut tournament = Tournament::new(TournamentConfig::default(), roster);
//! let summary = tournament.run().await?;
//! println!("{}", summary.status_line());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod battle;
pub mod config;
pub mod elimination;
pub mod error;
pub mod judgment;
pub mod ledger;
pub mod pairing;
pub mod report;
pub mod rng;
pub mod scheduler;
pub mod store;
pub mod tournament;
pub mod transcript;

pub use agent::{Agent, JudgeContext, SharedAgent, TurnContext};
pub use battle::{BattleResult, BattleRunner};
pub use config::{BattleTiePolicy, EliminationTiePolicy, TopicSource, TournamentConfig};
pub use elimination::{EliminationOutcome, EliminationResolver, EliminationRule};
pub use error::{AgentError, BattlePhase, StoreError, TournamentError, TournamentResult};
pub use judgment::{JudgmentAggregator, MalformedVoteWarning, Resolution, Vote};
pub use ledger::LossLedger;
pub use pairing::{select_pair, Pairing, MIN_ROSTER};
pub use rng::{RandomSource, ScriptedRandom, SeededRandom};
pub use scheduler::{TurnScheduler, DEFAULT_TOPIC};
pub use store::{BattleSummary, ReportStore};
pub use tournament::{Tournament, TournamentSummary};
pub use transcript::{Transcript, Turn, TurnPhase};
