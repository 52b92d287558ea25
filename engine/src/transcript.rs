//! Turn and transcript model for a single battle.

use serde::{Deserialize, Serialize};

/// Where a turn sits in the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Turn 1. Must declare the topic.
    Opening,
    /// Anything between the opening and the final turn.
    Mid,
    /// The final turn.
    Closing,
}

impl TurnPhase {
    /// Classify turn `turn` (1-based) of a dialogue with `total` turns.
    ///
    /// A single-turn dialogue is an opening.
    pub fn classify(turn: u32, total: u32) -> Self {
        if turn <= 1 {
            Self::Opening
        } else if turn >= total {
            Self::Closing
        } else {
            Self::Mid
        }
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Opening => write!(f, "opening"),
            Self::Mid => write!(f, "mid"),
            Self::Closing => write!(f, "closing"),
        }
    }
}

/// One line of dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based, gap-free within a battle.
    pub sequence: u32,
    pub speaker: String,
    pub text: String,
}

/// Ordered, append-only record of a battle's turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, assigning the next sequence number.
    pub fn push(&mut self, speaker: impl Into<String>, text: impl Into<String>) -> &Turn {
        let sequence = self.turns.len() as u32 + 1;
        self.turns.push(Turn {
            sequence,
            speaker: speaker.into(),
            text: text.into(),
        });
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Turns spoken by `speaker`, in order.
    pub fn spoken_by<'a>(&'a self, speaker: &'a str) -> impl Iterator<Item = &'a Turn> + 'a {
        self.turns.iter().filter(move |t| t.speaker == speaker)
    }

    /// Plain `T01 name: text` lines, one per turn, for prompts.
    pub fn to_log(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("T{:02} {}: {}", t.sequence, t.speaker, t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
