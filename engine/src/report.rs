//! Markdown rendering of battle reports and the aggregate report.
//!
//! Layout is fixed; the store parses the `- Loser:` line back, so that label
//! must stay stable.

use crate::battle::BattleResult;
use crate::elimination::{EliminationOutcome, EliminationRule};
use crate::ledger::LossLedger;

pub const LOSER_LABEL: &str = "- Loser: ";
pub const FIRST_LABEL: &str = "- First: ";
pub const SECOND_LABEL: &str = "- Second: ";
pub const TOPIC_HEADING: &str = "## Topic";

/// Collapse any run of whitespace (newlines included) into one space.
pub fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn render_battle(result: &BattleResult) -> String {
    let mut md = format!("# battle-{}\n\n", result.index);
    md.push_str("## Debaters\n");
    md.push_str(&format!("{FIRST_LABEL}{}\n", result.debater_a));
    md.push_str(&format!("{SECOND_LABEL}{}\n\n", result.debater_b));

    md.push_str(&format!("{TOPIC_HEADING}\n- {}\n\n", one_line(&result.topic)));

    md.push_str("## Transcript\n");
    for turn in result.transcript.turns() {
        md.push_str(&format!(
            "- T{:02} {}: {}\n",
            turn.sequence,
            turn.speaker,
            one_line(&turn.text)
        ));
    }
    md.push('\n');

    md.push_str("## Verdicts\n");
    for vote in &result.votes {
        md.push_str(&format!(
            "- {} judged {} the loser. Reason: {}\n",
            vote.spectator,
            vote.loser,
            one_line(&vote.reason)
        ));
    }
    md.push('\n');

    md.push_str("## Result\n");
    md.push_str(&format!("{LOSER_LABEL}{}\n", result.loser));
    md
}

pub fn render_aggregate(ledger: &LossLedger, outcome: &EliminationOutcome) -> String {
    let mut md = String::from("# Elimination Result\n\n");
    md.push_str(&format!("Battles completed: {}\n\n", ledger.total()));

    md.push_str("## Losses\n");
    for (name, count) in ledger.ranked() {
        let unit = if count == 1 { "loss" } else { "losses" };
        md.push_str(&format!("- {name}: {count} {unit}\n"));
    }
    md.push('\n');

    md.push_str("## Eliminated\n");
    md.push_str(&format!("- Eliminated: {}\n", outcome.eliminated));
    if let EliminationRule::TieBreak(policy) = outcome.rule {
        md.push_str(&format!(
            "- Tie-break: {policy} among {}\n",
            outcome.tie_candidates.join(", ")
        ));
    }
    md
}
