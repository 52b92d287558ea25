//! Template agent: canned-phrase dialogue and a keyword-scoring judge.
//!
//! Each agent owns a seeded ChaCha stream, so a fresh roster built from the
//! same seed speaks and judges identically.

use std::sync::Mutex;

use arena_engine::{Agent, AgentError, JudgeContext, Transcript, TurnContext, TurnPhase};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::roster::{topic_by_title, Profile, Topic, TOPICS};

const OPENERS: &[&str] = &[
    "I want to show what structure can do here.",
    "This is where I start.",
    "Let us put the focus here.",
    "First, let us pin this problem down.",
];

const RESPONSES: &[&str] = &[
    "Your point matters, but the premise is wrong.",
    "I want to widen that framework.",
    "That sketch leaves something out.",
    "I can agree, but the focus has drifted.",
];

const PUSHES: &[&str] = &[
    "Do not rush the conclusion; look at the layers of structure.",
    "The argument has to be rebuilt from the place of the subject.",
    "The historical conditions cannot be ignored.",
    "The work of discourse is being overlooked.",
];

const CLOSERS: &[&str] = &[
    "On this point I keep the upper hand.",
    "The decisiveness of this point does not move.",
    "Here lies the strength of structure.",
    "The axis of the argument is mine.",
];

const SPECTATOR_REASONS: &[&str] = &[
    "The fit to the topic was weak.",
    "Leaned on abstraction over concrete cases.",
    "Was slow to answer the other side.",
    "The structure presented was inconsistent.",
    "Failed to redefine the point at issue.",
];

/// Weight of one mention of the battle's topic key when judging.
const TOPIC_WEIGHT: u32 = 2;

/// Derive an agent's stream seed from the tournament seed and its id.
pub fn agent_seed(seed: u64, id: &str) -> u64 {
    id.bytes()
        .fold(seed ^ 0xCBF2_9CE4_8422_2325, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01B3)
        })
}

fn pick<'a>(rng: &mut ChaCha8Rng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or("")
}

/// Canned-phrase debater backed by a static [`Profile`].
pub struct TemplateAgent {
    profile: &'static Profile,
    rng: Mutex<ChaCha8Rng>,
}

impl TemplateAgent {
    pub fn new(profile: &'static Profile, seed: u64) -> Self {
        Self {
            profile,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(agent_seed(seed, profile.id))),
        }
    }

    pub fn profile(&self) -> &'static Profile {
        self.profile
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }

    /// Keyword score of `debater`'s turns from this spectator's point of view.
    fn score(&self, debater: &str, topic: &Topic, transcript: &Transcript) -> u32 {
        transcript
            .spoken_by(debater)
            .map(|turn| {
                let text = turn.text.to_lowercase();
                let topic_hits = text.matches(topic.key).count() as u32 * TOPIC_WEIGHT;
                let keyword_hits: u32 = self
                    .profile
                    .strengths
                    .iter()
                    .filter(|(key, _)| text.contains(key))
                    .map(|(_, weight)| *weight)
                    .sum();
                topic_hits + keyword_hits
            })
            .sum()
    }
}

#[async_trait]
impl Agent for TemplateAgent {
    fn id(&self) -> &str {
        self.profile.id
    }

    fn name(&self) -> &str {
        self.profile.name
    }

    fn keywords(&self) -> Vec<String> {
        self.profile.keywords()
    }

    fn profile_topic(&self) -> Option<String> {
        Some(self.profile.home_topic().title.to_string())
    }

    async fn opening(&self) -> Result<String, AgentError> {
        let text = self.with_rng(|rng| {
            let topic = TOPICS.choose(rng).unwrap_or(&TOPICS[0]);
            format!(
                "Topic: {}\nOn {}, {} {}",
                topic.title,
                topic.title.to_lowercase(),
                pick(rng, OPENERS),
                pick(rng, self.profile.voice)
            )
        });
        Ok(text)
    }

    async fn turn(&self, ctx: &TurnContext<'_>) -> Result<String, AgentError> {
        // The two turns before the closing one push; earlier ones respond.
        let pool = match ctx.phase {
            TurnPhase::Opening => OPENERS,
            TurnPhase::Closing => CLOSERS,
            TurnPhase::Mid if ctx.turn + 2 >= ctx.total_turns => PUSHES,
            TurnPhase::Mid => RESPONSES,
        };
        Ok(self.with_rng(|rng| format!("{} {}", pick(rng, pool), pick(rng, self.profile.voice))))
    }

    async fn judge(&self, ctx: &JudgeContext<'_>) -> Result<String, AgentError> {
        let topic = topic_by_title(ctx.topic).unwrap_or(&TOPICS[TOPICS.len() - 1]);
        let (die_a, die_b, reason) = self.with_rng(|rng| {
            (
                rng.gen_range(1..=6u32),
                rng.gen_range(1..=6u32),
                pick(rng, SPECTATOR_REASONS),
            )
        });
        let score_a = die_a + self.score(ctx.debater_a, topic, ctx.transcript);
        let score_b = die_b + self.score(ctx.debater_b, topic, ctx.transcript);
        // Lower score loses; the first speaker loses a level score.
        let loser = if score_a <= score_b {
            ctx.debater_a
        } else {
            ctx.debater_b
        };
        debug!(
            spectator = self.profile.name,
            score_a,
            score_b,
            loser,
            "template verdict"
        );
        Ok(format!("Loser: {loser}\nReason: {reason}"))
    }
}
