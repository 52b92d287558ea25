//! Full tournaments with the template roster.
//!
//! Tests verify:
//! - A default-sized run persists every battle and the aggregate report
//! - Same seed, same reports
//! - Every persisted battle names distinct debaters and one of them as loser
//! - Profile topics and the alignment cascade keep the run total

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use arena_agents::roster::{topic_by_title, PROFILES};
use arena_agents::template_roster;
use arena_engine::{BattleTiePolicy, TopicSource, Tournament, TournamentConfig};

fn config(dir: &Path, battles: u32, seed: u64) -> TournamentConfig {
    TournamentConfig {
        battle_count: battles,
        seed,
        battles_dir: dir.join("battles"),
        final_report: dir.join("final.md"),
        ..TournamentConfig::default()
    }
}

fn read_all(dir: &Path) -> BTreeMap<String, String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap())
        .map(|e| {
            (
                e.file_name().to_string_lossy().into_owned(),
                fs::read_to_string(e.path()).unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn thirty_battles_with_template_agents() {
    let dir = tempfile::tempdir().unwrap();
    let mut tournament = Tournament::new(config(dir.path(), 30, 42), template_roster(42));
    let summary = tournament.run().await.unwrap();

    assert_eq!(summary.battles_run, 30);
    assert_eq!(summary.ledger.total(), 30);
    assert_eq!(summary.ledger.counts().len(), PROFILES.len());
    assert!(summary.outcome.tie_candidates.contains(&summary.outcome.eliminated));

    let store = tournament.store().unwrap();
    for index in 1..=30 {
        let battle = store.read_summary(index).unwrap();
        assert_ne!(battle.debater_a, battle.debater_b);
        assert!(battle.loser == battle.debater_a || battle.loser == battle.debater_b);
        assert!(topic_by_title(&battle.topic).is_some(), "topic {}", battle.topic);

        let report = fs::read_to_string(store.battle_path(index)).unwrap();
        let turns = report
            .lines()
            .filter_map(|l| l.strip_prefix("- T"))
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            .count();
        assert!((12..=30).contains(&turns));
        assert_eq!(report.matches(" judged ").count(), 3);
    }

    let aggregate = fs::read_to_string(dir.path().join("final.md")).unwrap();
    assert!(aggregate.starts_with("# Elimination Result\n\nBattles completed: 30\n"));
    assert_eq!(aggregate.contains("- Tie-break:"), summary.outcome.tie_broken);
}

#[tokio::test]
async fn same_seed_reproduces_reports() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    for dir in [&first, &second] {
        Tournament::new(config(dir.path(), 6, 7), template_roster(7))
            .run()
            .await
            .unwrap();
    }
    assert_eq!(
        read_all(&first.path().join("battles")),
        read_all(&second.path().join("battles"))
    );
    assert_eq!(
        fs::read_to_string(first.path().join("final.md")).unwrap(),
        fs::read_to_string(second.path().join("final.md")).unwrap()
    );
}

#[tokio::test]
async fn profile_topics_and_alignment_cascade() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = TournamentConfig {
        topic_source: TopicSource::Profile,
        battle_tie_policy: BattleTiePolicy::AlignmentCascade,
        min_turns: 4,
        max_turns: 8,
        ..config(dir.path(), 10, 3)
    };
    let mut tournament = Tournament::new(cfg, template_roster(3));
    let summary = tournament.run().await.unwrap();
    assert_eq!(summary.ledger.total(), 10);

    let store = tournament.store().unwrap();
    for index in 1..=10 {
        let battle = store.read_summary(index).unwrap();
        let first = PROFILES.iter().find(|p| p.name == battle.debater_a).unwrap();
        assert_eq!(battle.topic, first.home_topic().title);
    }
}
