//! One battle: pairing, dialogue, judgment.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agent::SharedAgent;
use crate::config::TournamentConfig;
use crate::error::TournamentResult;
use crate::judgment::{JudgmentAggregator, Resolution, Vote};
use crate::pairing::select_pair;
use crate::rng::RandomSource;
use crate::scheduler::TurnScheduler;
use crate::transcript::Transcript;

/// Everything recorded about a finished battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    /// 1-based, never reused.
    pub index: u32,
    /// First speaker.
    pub debater_a: String,
    /// Second speaker.
    pub debater_b: String,
    pub topic: String,
    pub transcript: Transcript,
    /// One per spectator, in roster order.
    pub votes: Vec<Vote>,
    /// `debater_a` or `debater_b`.
    pub loser: String,
    pub resolution: Resolution,
}

impl BattleResult {
    pub fn debaters(&self) -> [&str; 2] {
        [self.debater_a.as_str(), self.debater_b.as_str()]
    }
}

/// Runs a single battle end to end.
#[derive(Debug, Clone)]
pub struct BattleRunner {
    scheduler: TurnScheduler,
    aggregator: JudgmentAggregator,
}

impl BattleRunner {
    pub fn new(scheduler: TurnScheduler, aggregator: JudgmentAggregator) -> Self {
        Self {
            scheduler,
            aggregator,
        }
    }

    pub fn from_config(config: &TournamentConfig) -> Self {
        Self::new(
            TurnScheduler::from_config(config),
            JudgmentAggregator::new(config.battle_tie_policy),
        )
    }

    /// Run battle `index` over `roster`.
    ///
    /// Random draws, in order: the battle re-seed, the pairing (two draws),
    /// the turn count (one draw).
    pub async fn run(
        &self,
        index: u32,
        roster: &[SharedAgent],
        rng: &mut dyn RandomSource,
    ) -> TournamentResult<BattleResult> {
        rng.begin_battle(index);
        let pairing = select_pair(roster, rng)?;
        let turns = self.scheduler.draw_turns(rng);

        let first = &roster[pairing.first];
        let second = &roster[pairing.second];
        info!(
            battle = index,
            first = first.name(),
            second = second.name(),
            turns,
            "battle starting"
        );

        let dialogue = self
            .scheduler
            .run(index, first.as_ref(), second.as_ref(), turns)
            .await?;

        let spectators: Vec<SharedAgent> = pairing
            .spectators
            .iter()
            .map(|&i| roster[i].clone())
            .collect();
        let verdict = self
            .aggregator
            .judge(
                index,
                &spectators,
                &dialogue.topic,
                &dialogue.transcript,
                first.name(),
                second.name(),
            )
            .await?;

        info!(
            battle = index,
            topic = %dialogue.topic,
            loser = %verdict.loser,
            votes_first = verdict.tally.votes_a,
            votes_second = verdict.tally.votes_b,
            resolution = ?verdict.resolution,
            "battle finished"
        );

        Ok(BattleResult {
            index,
            debater_a: first.name().to_string(),
            debater_b: second.name().to_string(),
            topic: dialogue.topic,
            transcript: dialogue.transcript,
            votes: verdict.votes,
            loser: verdict.loser,
            resolution: verdict.resolution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::ScriptedAgent;
    use crate::rng::{ScriptedRandom, SeededRandom};

    #[tokio::test]
    async fn five_agent_scenario() {
        // Pairing draws 0 then 0 → first = A (0), second = B (1).
        let roster: Vec<SharedAgent> = vec![
            ScriptedAgent::new("A").shared(),
            ScriptedAgent::new("B").shared(),
            ScriptedAgent::new("C").voting("Loser: B\nReason: weak").shared(),
            ScriptedAgent::new("D").voting("Loser: A").shared(),
            ScriptedAgent::new("E").voting("B lost").shared(),
        ];
        let config = TournamentConfig::default().with_fixed_turns(4);
        let runner = BattleRunner::from_config(&config);
        let mut rng = ScriptedRandom::new(vec![0, 0, 0]);

        let result = runner.run(1, &roster, &mut rng).await.unwrap();
        assert_eq!(result.debaters(), ["A", "B"]);
        let speakers: Vec<&str> = result
            .transcript
            .turns()
            .iter()
            .map(|t| t.speaker.as_str())
            .collect();
        assert_eq!(speakers, vec!["A", "B", "A", "B"]);
        assert_eq!(result.votes.len(), 3);
        assert_eq!(result.loser, "B");
        assert_eq!(result.resolution, Resolution::Majority);
    }

    #[tokio::test]
    async fn loser_and_votes_always_target_debaters() {
        let roster: Vec<SharedAgent> = ["A", "B", "C", "D"]
            .iter()
            .map(|n| ScriptedAgent::new(n).voting("Loser: nobody in particular").shared())
            .collect();
        let config = TournamentConfig {
            min_turns: 2,
            max_turns: 6,
            ..Default::default()
        };
        let runner = BattleRunner::from_config(&config);
        let mut rng = SeededRandom::new(5);
        for index in 1..=20 {
            let result = runner.run(index, &roster, &mut rng).await.unwrap();
            let debaters = result.debaters();
            assert_ne!(debaters[0], debaters[1]);
            assert!(debaters.contains(&result.loser.as_str()));
            assert_eq!(result.votes.len(), 2);
            assert!(result
                .votes
                .iter()
                .all(|v| debaters.contains(&v.loser.as_str())));
            assert!((2..=6).contains(&(result.transcript.len() as u32)));
        }
    }
}
