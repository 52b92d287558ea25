//! Fixed roster of structuralist debaters and the topic list they argue over.

use std::path::Path;

use tracing::warn;

/// Static description of one debater.
#[derive(Debug)]
pub struct Profile {
    /// Short key, also the profile file stem (`<id>.md`).
    pub id: &'static str,
    pub name: &'static str,
    /// Signature lines appended to template utterances.
    pub voice: &'static [&'static str],
    /// Weight per topic key, used when judging.
    pub strengths: &'static [(&'static str, u32)],
}

impl Profile {
    pub fn strength(&self, key: &str) -> u32 {
        self.strengths
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, w)| *w)
            .unwrap_or(1)
    }

    /// Topic keys this debater weighs at 2 or more.
    pub fn keywords(&self) -> Vec<String> {
        self.strengths
            .iter()
            .filter(|(_, w)| *w >= 2)
            .map(|(k, _)| k.to_string())
            .collect()
    }

    /// Topic of the debater's strongest key; first in topic order on ties.
    pub fn home_topic(&self) -> &'static Topic {
        TOPICS
            .iter()
            .rev()
            .max_by_key(|t| self.strength(t.key))
            .unwrap_or(&TOPICS[0])
    }

    /// Self-introduction from `<dir>/<id>.md`, or a text assembled from the
    /// voice lines when the file is missing.
    pub fn load_text(&self, dir: Option<&Path>) -> String {
        if let Some(dir) = dir {
            let path = dir.join(format!("{}.md", self.id));
            match std::fs::read_to_string(&path) {
                Ok(text) if !text.trim().is_empty() => return text,
                Ok(_) => warn!(path = %path.display(), "profile file is empty"),
                Err(e) => warn!(path = %path.display(), error = %e, "profile file unreadable"),
            }
        }
        format!("I am {}. {}", self.name, self.voice.join(" "))
    }
}

/// A debate topic and the keyword it is scored on.
#[derive(Debug)]
pub struct Topic {
    pub title: &'static str,
    pub key: &'static str,
}

pub const TOPICS: &[Topic] = &[
    Topic { title: "The role of myth", key: "myth" },
    Topic { title: "Kinship and exchange", key: "kinship" },
    Topic { title: "The place of the subject", key: "subject" },
    Topic { title: "Power and discipline", key: "power" },
    Topic { title: "Ruptures in history", key: "history" },
    Topic { title: "The structure of language", key: "language" },
    Topic { title: "How ideology works", key: "ideology" },
    Topic { title: "Structure and transformation", key: "structure" },
];

/// Topic whose title matches `title`, ignoring case.
pub fn topic_by_title(title: &str) -> Option<&'static Topic> {
    let title = title.trim();
    TOPICS.iter().find(|t| t.title.eq_ignore_ascii_case(title))
}

pub const PROFILES: &[Profile] = &[
    Profile {
        id: "levi",
        name: "Claude Levi-Strauss",
        voice: &[
            "I speak from the comparative method.",
            "Myth is a transformation of differences.",
            "The rules of exchange hold culture together.",
            "Structure is not fixed; it is a rule of transformation.",
        ],
        strengths: &[
            ("myth", 3),
            ("kinship", 3),
            ("structure", 2),
            ("history", 1),
            ("power", 1),
            ("subject", 1),
            ("language", 2),
            ("ideology", 1),
        ],
    },
    Profile {
        id: "lacan",
        name: "Jacques Lacan",
        voice: &[
            "The unconscious is structured like a language.",
            "The subject appears as a split.",
            "The desire of the Other drives the subject.",
            "The symbolic net determines the subject.",
        ],
        strengths: &[
            ("myth", 1),
            ("kinship", 1),
            ("structure", 2),
            ("history", 1),
            ("power", 1),
            ("subject", 3),
            ("language", 3),
            ("ideology", 1),
        ],
    },
    Profile {
        id: "foucault",
        name: "Michel Foucault",
        voice: &[
            "Power is everywhere as a relation.",
            "Discourse produces truth.",
            "The subject is formed in history.",
            "Discipline arranges the body.",
        ],
        strengths: &[
            ("myth", 1),
            ("kinship", 1),
            ("structure", 2),
            ("history", 3),
            ("power", 3),
            ("subject", 2),
            ("language", 2),
            ("ideology", 1),
        ],
    },
    Profile {
        id: "althusser",
        name: "Louis Althusser",
        voice: &[
            "Look at structural causality.",
            "Ideology interpellates the subject.",
            "History is overdetermined.",
            "Theoretical precision supports politics.",
        ],
        strengths: &[
            ("myth", 1),
            ("kinship", 1),
            ("structure", 2),
            ("history", 2),
            ("power", 2),
            ("subject", 2),
            ("language", 1),
            ("ideology", 3),
        ],
    },
    Profile {
        id: "barthes",
        name: "Roland Barthes",
        voice: &[
            "Signs make the myths of everyday life.",
            "The death of the author is the birth of the reader.",
            "Do not forget the pleasure of the text.",
            "Meaning opens up in many voices.",
        ],
        strengths: &[
            ("myth", 2),
            ("kinship", 1),
            ("structure", 2),
            ("history", 1),
            ("power", 1),
            ("subject", 1),
            ("language", 2),
            ("ideology", 2),
        ],
    },
];

pub fn profile(id: &str) -> Option<&'static Profile> {
    PROFILES.iter().find(|p| p.id == id)
}
