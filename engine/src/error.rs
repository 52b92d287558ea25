//! Tournament error taxonomy.
//!
//! Structural failures abort the run and carry the battle index and phase
//! they happened in. Parsing-level ambiguity (unclear loser, missing reason)
//! never shows up here; see [`crate::judgment::MalformedVoteWarning`].
//!
//! | Error                     | Scope            | Recovery                      |
//! |---------------------------|------------------|-------------------------------|
//! | `InsufficientRoster`      | whole run        | none, rejected before battle 1 |
//! | `EmptyUtterance`          | aborts the run   | re-run resumes at same index  |
//! | `CollaboratorUnavailable` | aborts the run   | re-run resumes at same index  |
//! | `Persistence`             | aborts the run   | fix the store, re-run         |

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by an utterance- or judgment-producing collaborator.
///
/// The engine never retries these; retry belongs to the collaborator.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Transport failure, HTTP error status, timeout.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered but produced no text.
    #[error("collaborator returned empty text")]
    EmptyResponse,

    /// The collaborator answered with something that could not be decoded.
    #[error("malformed collaborator response: {0}")]
    MalformedResponse(String),

    /// The collaborator is missing credentials or settings.
    #[error("collaborator misconfigured: {0}")]
    Configuration(String),
}

/// Where inside a battle a failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattlePhase {
    /// Choosing the two debaters.
    Pairing,
    /// Generating turn `n` (1-based).
    Turn(u32),
    /// Collecting the verdict of the named spectator.
    Judgment(String),
    /// Writing the battle report or aggregate report.
    Persist,
}

impl fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pairing => write!(f, "pairing"),
            Self::Turn(n) => write!(f, "turn {n}"),
            Self::Judgment(spectator) => write!(f, "judgment by {spectator}"),
            Self::Persist => write!(f, "persist"),
        }
    }
}

/// Errors from the on-disk report store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A battle report has no parsable final-loser line.
    #[error("report {path} has no loser line")]
    MissingLoser { path: PathBuf },

    /// A battle report names a loser that is not on the roster.
    #[error("report {path} names unknown agent '{name}'")]
    UnknownAgent { path: PathBuf, name: String },

    /// Refused to overwrite an already persisted battle.
    #[error("battle {0} is already persisted")]
    AlreadyPersisted(u32),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Unified error type for a tournament run.
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Fewer than three agents: no spectator would be left to judge.
    #[error("roster has {found} agents, need at least {required}")]
    InsufficientRoster { found: usize, required: usize },

    /// A turn-generation call returned no usable text.
    #[error("battle {battle}, turn {turn}: {speaker} produced an empty utterance")]
    EmptyUtterance {
        battle: u32,
        turn: u32,
        speaker: String,
    },

    /// A collaborator failed while producing a turn or a verdict.
    #[error("battle {battle}, {phase}: agent {agent} failed: {source}")]
    CollaboratorUnavailable {
        battle: u32,
        phase: BattlePhase,
        agent: String,
        #[source]
        source: AgentError,
    },

    /// The report store could not be read or written.
    #[error("report store: {0}")]
    Persistence(#[from] StoreError),

    /// Invalid tournament configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl TournamentError {
    /// Battle index the failure belongs to, when it belongs to one.
    pub fn battle(&self) -> Option<u32> {
        match self {
            Self::EmptyUtterance { battle, .. } | Self::CollaboratorUnavailable { battle, .. } => {
                Some(*battle)
            }
            Self::Persistence(StoreError::AlreadyPersisted(battle)) => Some(*battle),
            _ => None,
        }
    }
}

/// Result alias for engine operations.
pub type TournamentResult<T> = Result<T, TournamentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_battle_and_phase() {
        let err = TournamentError::CollaboratorUnavailable {
            battle: 7,
            phase: BattlePhase::Judgment("Roland Barthes".into()),
            agent: "Roland Barthes".into(),
            source: AgentError::Unavailable("connection refused".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("battle 7"));
        assert!(msg.contains("judgment by Roland Barthes"));
        assert_eq!(err.battle(), Some(7));
    }

    #[test]
    fn empty_utterance_reports_turn() {
        let err = TournamentError::EmptyUtterance {
            battle: 3,
            turn: 5,
            speaker: "Jacques Lacan".into(),
        };
        assert!(err.to_string().contains("turn 5"));
        assert_eq!(err.battle(), Some(3));
    }

    #[test]
    fn roster_error_has_no_battle() {
        let err = TournamentError::InsufficientRoster {
            found: 2,
            required: 3,
        };
        assert_eq!(err.battle(), None);
        assert!(err.to_string().contains("at least 3"));
    }
}
