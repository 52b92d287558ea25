//! Agent capability interface.
//!
//! An agent is a named capability provider: it opens a debate, takes
//! follow-up turns and judges other agents' debates. It owns no tournament
//! state. Canned templates, keyword heuristics and remote text generation all
//! sit behind the same trait, so the tournament never depends on which one is
//! in play.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::transcript::{Transcript, TurnPhase};

/// Everything a debater sees when producing a follow-up turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    /// Fixed for the whole battle once established.
    pub topic: &'a str,
    /// Everything said so far, read-only.
    pub transcript: &'a Transcript,
    pub phase: TurnPhase,
    /// 1-based number of the turn being produced.
    pub turn: u32,
    pub total_turns: u32,
}

/// Everything a spectator sees when judging a battle.
#[derive(Debug, Clone, Copy)]
pub struct JudgeContext<'a> {
    pub topic: &'a str,
    pub transcript: &'a Transcript,
    /// First speaker.
    pub debater_a: &'a str,
    /// Second speaker.
    pub debater_b: &'a str,
}

/// A tournament participant.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable short key (profile file name, CLI selection).
    fn id(&self) -> &str;

    /// Unique display name; this is what transcripts, votes and the loss
    /// ledger refer to.
    fn name(&self) -> &str;

    /// Keywords this agent weighs when judging. Feeds the alignment tie
    /// cascade; empty by default.
    fn keywords(&self) -> Vec<String> {
        Vec::new()
    }

    /// Topic derived from the agent's own profile, used when topics are not
    /// taken from the opening declaration.
    fn profile_topic(&self) -> Option<String> {
        None
    }

    /// First turn of a battle. Should contain a `Topic: ...` line.
    async fn opening(&self) -> Result<String, AgentError>;

    /// One follow-up turn reacting to the transcript so far.
    async fn turn(&self, ctx: &TurnContext<'_>) -> Result<String, AgentError>;

    /// Free-form verdict naming the loser and a reason.
    async fn judge(&self, ctx: &JudgeContext<'_>) -> Result<String, AgentError>;
}

/// Shared handle to a roster member.
pub type SharedAgent = Arc<dyn Agent>;
