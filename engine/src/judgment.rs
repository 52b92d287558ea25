//! Judgment aggregator: spectator verdicts, vote parsing and tally
//! resolution.
//!
//! Every spectator is asked for a verdict; all verdicts are collected before
//! anything is resolved. Raw verdicts that do not cleanly name a debater are
//! recovered with a deterministic fallback and logged as a
//! [`MalformedVoteWarning`]; they never fail the battle.

use std::collections::BTreeSet;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::agent::{JudgeContext, SharedAgent};
use crate::config::BattleTiePolicy;
use crate::error::{AgentError, BattlePhase, TournamentError, TournamentResult};
use crate::transcript::Transcript;

/// Reason recorded when a verdict gives none.
pub const GENERIC_REASON: &str = "No specific reason was given.";

const LOSER_LABELS: &[&str] = &["loser:", "loser：", "敗者:", "敗者："];
const REASON_LABELS: &[&str] = &["reason:", "reason：", "理由:", "理由："];

/// One spectator's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub spectator: String,
    /// Always one of the two debaters.
    pub loser: String,
    pub reason: String,
}

/// How an unclear verdict was turned into a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteFallback {
    /// Only one debater's name appears anywhere in the verdict.
    SoleMention,
    /// Neither or both names appear; the first speaker takes the vote.
    FirstSpeaker,
}

/// Non-fatal notice that a verdict needed a fallback. Logged, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedVoteWarning {
    pub spectator: String,
    pub fallback: VoteFallback,
    pub attributed_to: String,
}

/// A parsed vote plus the warning, if parsing needed a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVote {
    pub vote: Vote,
    pub warning: Option<MalformedVoteWarning>,
}

/// Turn a spectator's raw verdict into a vote against `debater_a` or
/// `debater_b`.
///
/// 1. A `Loser:` line naming exactly one debater is taken as is.
/// 2. Otherwise, if exactly one debater's name appears anywhere in the text,
///    that debater loses.
/// 3. Otherwise the first speaker, `debater_a`, loses.
///
/// A missing or empty `Reason:` becomes [`GENERIC_REASON`].
pub fn parse_vote(spectator: &str, raw: &str, debater_a: &str, debater_b: &str) -> ParsedVote {
    let reason = extract_reason(raw).unwrap_or_else(|| GENERIC_REASON.to_string());

    let declared = loser_line(raw).and_then(|line| sole_mention(line, debater_a, debater_b));
    let (loser, fallback) = match declared {
        Some(loser) => (loser, None),
        None => match sole_mention(raw, debater_a, debater_b) {
            Some(loser) => (loser, Some(VoteFallback::SoleMention)),
            None => (debater_a, Some(VoteFallback::FirstSpeaker)),
        },
    };

    ParsedVote {
        vote: Vote {
            spectator: spectator.to_string(),
            loser: loser.to_string(),
            reason,
        },
        warning: fallback.map(|fallback| MalformedVoteWarning {
            spectator: spectator.to_string(),
            fallback,
            attributed_to: loser.to_string(),
        }),
    }
}

fn loser_line(raw: &str) -> Option<&str> {
    raw.lines().find_map(|line| {
        let line = line
            .trim()
            .trim_start_matches(['-', '*', '#', '>'])
            .trim_start()
            .trim_start_matches('*');
        let lower = line.to_lowercase();
        LOSER_LABELS
            .iter()
            .find(|label| lower.starts_with(*label))
            .map(|label| &line[label.len()..])
    })
}

/// The debater whose name appears in `text` when the other's does not.
///
/// The longer name is matched first and masked out, so a name that contains
/// the other ("Ann" / "Anna") is not counted twice.
fn sole_mention<'a>(text: &str, debater_a: &'a str, debater_b: &'a str) -> Option<&'a str> {
    let (long, short) = if debater_a.len() >= debater_b.len() {
        (debater_a, debater_b)
    } else {
        (debater_b, debater_a)
    };
    let long_in = text.contains(long);
    let short_in = text.replace(long, "").contains(short);
    match (long_in, short_in) {
        (true, false) => Some(long),
        (false, true) => Some(short),
        _ => None,
    }
}

fn extract_reason(raw: &str) -> Option<String> {
    let mut lines = raw.lines();
    let rest = lines.by_ref().find_map(|line| {
        let line = line
            .trim()
            .trim_start_matches(['-', '*', '#', '>'])
            .trim_start()
            .trim_start_matches('*');
        REASON_LABELS.iter().find_map(|label| {
            line.get(..label.len())
                .filter(|head| head.eq_ignore_ascii_case(label))
                .map(|_| &line[label.len()..])
        })
    })?;
    let rest = rest.trim_start_matches('*').trim();
    let reason = if rest.is_empty() {
        lines.map(str::trim).find(|l| !l.is_empty())?
    } else {
        rest
    };
    Some(reason.to_string())
}

/// Vote counts for one battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub debater_a: String,
    pub debater_b: String,
    pub votes_a: u32,
    pub votes_b: u32,
}

impl Tally {
    pub fn count(votes: &[Vote], debater_a: &str, debater_b: &str) -> Self {
        let votes_a = votes.iter().filter(|v| v.loser == debater_a).count() as u32;
        let votes_b = votes.iter().filter(|v| v.loser == debater_b).count() as u32;
        Self {
            debater_a: debater_a.to_string(),
            debater_b: debater_b.to_string(),
            votes_a,
            votes_b,
        }
    }

    /// Debater with strictly more loser votes.
    pub fn majority(&self) -> Option<&str> {
        match self.votes_a.cmp(&self.votes_b) {
            std::cmp::Ordering::Greater => Some(&self.debater_a),
            std::cmp::Ordering::Less => Some(&self.debater_b),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Which cascade step broke an alignment tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStep {
    ScoreSum,
    TopicMentions,
    KeywordOverlap,
    NameOrder,
}

/// How the battle's loser was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Majority,
    FirstSpeakerTie,
    Alignment(CascadeStep),
}

/// A debater's keyword alignment as seen by the spectators.
///
/// Lower alignment loses. Fields compare in declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Alignment {
    /// Keyword occurrences in the debater's turns, summed over spectators.
    pub score_sum: u32,
    /// Debater turns that mention the topic.
    pub topic_mentions: u32,
    /// Distinct spectator keywords the debater used at least once.
    pub keyword_overlap: u32,
}

impl Alignment {
    pub fn measure(
        debater: &str,
        topic: &str,
        transcript: &Transcript,
        spectator_keywords: &[Vec<String>],
    ) -> Self {
        let texts: Vec<&str> = transcript.spoken_by(debater).map(|t| t.text.as_str()).collect();

        let score_sum = spectator_keywords
            .iter()
            .flatten()
            .filter(|kw| !kw.is_empty())
            .map(|kw| texts.iter().map(|t| t.matches(kw.as_str()).count() as u32).sum::<u32>())
            .sum();

        let topic_lower = topic.to_lowercase();
        let topic_mentions = texts
            .iter()
            .filter(|t| !topic_lower.is_empty() && t.to_lowercase().contains(&topic_lower))
            .count() as u32;

        let unique: BTreeSet<&str> = spectator_keywords
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|kw| !kw.is_empty())
            .collect();
        let keyword_overlap = unique
            .iter()
            .filter(|kw| texts.iter().any(|t| t.contains(*kw)))
            .count() as u32;

        Self {
            score_sum,
            topic_mentions,
            keyword_overlap,
        }
    }
}

/// Resolve an alignment tie. Total: falls through to name order, where the
/// lexicographically first name loses.
pub fn cascade_loser<'a>(
    debater_a: &'a str,
    alignment_a: Alignment,
    debater_b: &'a str,
    alignment_b: Alignment,
) -> (&'a str, CascadeStep) {
    let steps = [
        (CascadeStep::ScoreSum, alignment_a.score_sum, alignment_b.score_sum),
        (CascadeStep::TopicMentions, alignment_a.topic_mentions, alignment_b.topic_mentions),
        (CascadeStep::KeywordOverlap, alignment_a.keyword_overlap, alignment_b.keyword_overlap),
    ];
    for (step, a, b) in steps {
        if a != b {
            return (if a < b { debater_a } else { debater_b }, step);
        }
    }
    (debater_a.min(debater_b), CascadeStep::NameOrder)
}

/// Outcome of the judgment phase of one battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// One vote per spectator, in roster order.
    pub votes: Vec<Vote>,
    pub tally: Tally,
    pub loser: String,
    pub resolution: Resolution,
}

/// Collects spectator verdicts and resolves the battle's loser.
#[derive(Debug, Clone, Copy, Default)]
pub struct JudgmentAggregator {
    policy: BattleTiePolicy,
}

impl JudgmentAggregator {
    pub fn new(policy: BattleTiePolicy) -> Self {
        Self { policy }
    }

    /// Ask every spectator for a verdict and resolve the loser.
    ///
    /// Verdict requests are issued together; resolution waits for all of
    /// them. Any collaborator failure aborts with the spectator's name.
    pub async fn judge(
        &self,
        battle: u32,
        spectators: &[SharedAgent],
        topic: &str,
        transcript: &Transcript,
        debater_a: &str,
        debater_b: &str,
    ) -> TournamentResult<Verdict> {
        let ctx = JudgeContext {
            topic,
            transcript,
            debater_a,
            debater_b,
        };
        let raws = join_all(spectators.iter().map(|s| s.judge(&ctx))).await;

        let mut votes = Vec::with_capacity(spectators.len());
        for (spectator, raw) in spectators.iter().zip(raws) {
            let raw = match raw {
                Ok(raw) => raw,
                Err(AgentError::EmptyResponse) => String::new(),
                Err(source) => {
                    return Err(TournamentError::CollaboratorUnavailable {
                        battle,
                        phase: BattlePhase::Judgment(spectator.name().to_string()),
                        agent: spectator.name().to_string(),
                        source,
                    })
                }
            };
            let parsed = parse_vote(spectator.name(), &raw, debater_a, debater_b);
            if let Some(warning) = &parsed.warning {
                warn!(
                    battle,
                    spectator = %warning.spectator,
                    fallback = ?warning.fallback,
                    attributed_to = %warning.attributed_to,
                    "malformed vote, applied fallback"
                );
            }
            debug!(battle, spectator = spectator.name(), loser = %parsed.vote.loser, "vote");
            votes.push(parsed.vote);
        }

        let tally = Tally::count(&votes, debater_a, debater_b);
        let (loser, resolution) = match tally.majority() {
            Some(loser) => (loser.to_string(), Resolution::Majority),
            None => match self.policy {
                BattleTiePolicy::FirstSpeaker => {
                    (debater_a.to_string(), Resolution::FirstSpeakerTie)
                }
                BattleTiePolicy::AlignmentCascade => {
                    let keywords: Vec<Vec<String>> =
                        spectators.iter().map(|s| s.keywords()).collect();
                    let align_a = Alignment::measure(debater_a, topic, transcript, &keywords);
                    let align_b = Alignment::measure(debater_b, topic, transcript, &keywords);
                    let (loser, step) = cascade_loser(debater_a, align_a, debater_b, align_b);
                    (loser.to_string(), Resolution::Alignment(step))
                }
            },
        };

        Ok(Verdict {
            votes,
            tally,
            loser,
            resolution,
        })
    }
}
