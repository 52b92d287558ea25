//! Turn scheduler: drives the alternating dialogue of one battle.
//!
//! ```text
//! draw N in [min_turns, max_turns]
//! turn 1      first.opening()          → topic fixed here
//! turn 2..=N  speaker.turn(topic, log) → a on odd, b on even
//! ```
//!
//! Turns are strictly sequential: turn `t + 1` is requested only after turn
//! `t` has been appended to the transcript.

use tracing::{debug, warn};

use crate::agent::{Agent, TurnContext};
use crate::config::{TopicSource, TournamentConfig};
use crate::error::{AgentError, BattlePhase, TournamentError, TournamentResult};
use crate::rng::RandomSource;
use crate::transcript::{Transcript, TurnPhase};

/// Topic used when the opening declares none (or an unreadable one) and the
/// profile offers none either.
pub const DEFAULT_TOPIC: &str = "Structure and its transformations";

const TOPIC_LABELS: &[&str] = &["topic:", "topic：", "議題:", "議題："];

/// Pull the declared topic out of an opening utterance.
///
/// The first line starting with a `Topic:` label wins; list markers and
/// heading hashes in front of the label are ignored. A label with nothing
/// after it counts as no declaration.
pub fn parse_topic_declaration(text: &str) -> Option<String> {
    for line in text.lines() {
        let line = line
            .trim()
            .trim_start_matches(['-', '*', '#', '>'])
            .trim_start();
        let lower = line.to_lowercase();
        for label in TOPIC_LABELS {
            if lower.starts_with(label) {
                // Labels are ASCII or CJK with identical lowercase byte
                // length, so slicing the original line is safe.
                let topic = line[label.len()..]
                    .trim()
                    .trim_matches(['"', '\'', '「', '」'])
                    .trim();
                return (!topic.is_empty()).then(|| topic.to_string());
            }
        }
    }
    None
}

/// Result of the dialogue phase of a battle.
#[derive(Debug, Clone)]
pub struct Dialogue {
    pub topic: String,
    pub transcript: Transcript,
}

/// Drives turn-taking for a battle.
#[derive(Debug, Clone)]
pub struct TurnScheduler {
    min_turns: u32,
    max_turns: u32,
    topic_source: TopicSource,
}

impl TurnScheduler {
    pub fn new(min_turns: u32, max_turns: u32, topic_source: TopicSource) -> Self {
        Self {
            min_turns,
            max_turns,
            topic_source,
        }
    }

    pub fn from_config(config: &TournamentConfig) -> Self {
        Self::new(config.min_turns, config.max_turns, config.topic_source)
    }

    /// Draw the number of turns for one battle (one draw).
    pub fn draw_turns(&self, rng: &mut dyn RandomSource) -> u32 {
        rng.range_inclusive(self.min_turns, self.max_turns)
    }

    /// Run a full dialogue of `turns` turns between `first` and `second`.
    pub async fn run(
        &self,
        battle: u32,
        first: &dyn Agent,
        second: &dyn Agent,
        turns: u32,
    ) -> TournamentResult<Dialogue> {
        let mut transcript = Transcript::new();

        let opening = first
            .opening()
            .await
            .map_err(|e| collaborator_error(battle, 1, first, e))?;
        let opening = usable(battle, 1, first, opening)?;
        let topic = self.establish_topic(battle, first, &opening);
        debug!(battle, turn = 1, speaker = first.name(), %topic, "opening");
        transcript.push(first.name(), opening);

        for turn in 2..=turns {
            let speaker = if turn % 2 == 1 { first } else { second };
            let ctx = TurnContext {
                topic: &topic,
                transcript: &transcript,
                phase: TurnPhase::classify(turn, turns),
                turn,
                total_turns: turns,
            };
            let text = speaker
                .turn(&ctx)
                .await
                .map_err(|e| collaborator_error(battle, turn, speaker, e))?;
            let text = usable(battle, turn, speaker, text)?;
            debug!(battle, turn, speaker = speaker.name(), phase = %ctx.phase, "turn");
            transcript.push(speaker.name(), text);
        }

        Ok(Dialogue { topic, transcript })
    }

    fn establish_topic(&self, battle: u32, first: &dyn Agent, opening: &str) -> String {
        let topic = match self.topic_source {
            TopicSource::Declared => parse_topic_declaration(opening),
            TopicSource::Profile => first.profile_topic(),
        };
        topic.unwrap_or_else(|| {
            warn!(
                battle,
                speaker = first.name(),
                source = ?self.topic_source,
                "no usable topic, falling back to default"
            );
            DEFAULT_TOPIC.to_string()
        })
    }
}

fn usable(battle: u32, turn: u32, speaker: &dyn Agent, text: String) -> TournamentResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TournamentError::EmptyUtterance {
            battle,
            turn,
            speaker: speaker.name().to_string(),
        });
    }
    Ok(text.to_string())
}

fn collaborator_error(battle: u32, turn: u32, agent: &dyn Agent, source: AgentError) -> TournamentError {
    match source {
        AgentError::EmptyResponse => TournamentError::EmptyUtterance {
            battle,
            turn,
            speaker: agent.name().to_string(),
        },
        source => TournamentError::CollaboratorUnavailable {
            battle,
            phase: BattlePhase::Turn(turn),
            agent: agent.name().to_string(),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::ScriptedAgent;
    use crate::rng::ScriptedRandom;

    #[test]
    fn parses_declared_topic() {
        assert_eq!(
            parse_topic_declaration("Topic: The role of myth\nI begin here."),
            Some("The role of myth".to_string())
        );
        assert_eq!(
            parse_topic_declaration("- **topic:** kinship".replace("**", "").as_str()),
            Some("kinship".to_string())
        );
        assert_eq!(
            parse_topic_declaration("議題: 神話の役割\n本文"),
            Some("神話の役割".to_string())
        );
    }

    #[test]
    fn malformed_declaration_is_none() {
        assert_eq!(parse_topic_declaration("Topic:   \nbody"), None);
        assert_eq!(parse_topic_declaration("no declaration at all"), None);
    }

    #[tokio::test]
    async fn alternates_speakers_without_gaps() {
        let a = ScriptedAgent::new("X");
        let b = ScriptedAgent::new("Y");
        let scheduler = TurnScheduler::new(4, 4, TopicSource::Declared);
        let dialogue = scheduler.run(1, &a, &b, 4).await.unwrap();

        assert_eq!(dialogue.topic, "kinship");
        let turns = dialogue.transcript.turns();
        assert_eq!(turns.len(), 4);
        let speakers: Vec<&str> = turns.iter().map(|t| t.speaker.as_str()).collect();
        assert_eq!(speakers, vec!["X", "Y", "X", "Y"]);
        let seqs: Vec<u32> = turns.iter().map(|t| t.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
        assert!(turns[3].text.contains("closing"));
        assert!(turns[1].text.contains("on kinship"));
    }

    #[tokio::test]
    async fn missing_declaration_falls_back() {
        let mut a = ScriptedAgent::new("X");
        a.opening = "I refuse to name a topic.".into();
        let b = ScriptedAgent::new("Y");
        let scheduler = TurnScheduler::new(2, 2, TopicSource::Declared);
        let dialogue = scheduler.run(1, &a, &b, 2).await.unwrap();
        assert_eq!(dialogue.topic, DEFAULT_TOPIC);
        assert!(dialogue.transcript.turns()[1].text.contains(DEFAULT_TOPIC));
    }

    #[tokio::test]
    async fn profile_source_without_profile_topic_uses_default() {
        let a = ScriptedAgent::new("X");
        let b = ScriptedAgent::new("Y");
        let scheduler = TurnScheduler::new(2, 2, TopicSource::Profile);
        let dialogue = scheduler.run(1, &a, &b, 2).await.unwrap();
        assert_eq!(dialogue.topic, DEFAULT_TOPIC);
    }

    #[tokio::test]
    async fn empty_utterance_is_fatal() {
        let a = ScriptedAgent::new("X");
        let mut b = ScriptedAgent::new("Y");
        b.empty_on_turn = Some(4);
        let scheduler = TurnScheduler::new(6, 6, TopicSource::Declared);
        let err = scheduler.run(9, &a, &b, 6).await.unwrap_err();
        assert!(matches!(
            err,
            TournamentError::EmptyUtterance { battle: 9, turn: 4, ref speaker } if speaker == "Y"
        ));
    }

    #[test]
    fn turn_count_stays_in_bounds() {
        let scheduler = TurnScheduler::new(12, 30, TopicSource::Declared);
        let mut rng = ScriptedRandom::new(vec![0, 18, 19, 1000]);
        let drawn: Vec<u32> = (0..4).map(|_| scheduler.draw_turns(&mut rng)).collect();
        assert_eq!(drawn, vec![12, 30, 12, 12 + (1000 % 19) as u32]);
    }
}
