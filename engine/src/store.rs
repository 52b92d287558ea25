//! Report store: one markdown file per battle plus the aggregate report,
//! all in one flat directory.
//!
//! Files are written to a hidden temporary sibling and renamed into place, so
//! a report is either complete or absent. The loss ledger can be rebuilt from
//! the reports alone; see [`ReportStore::rebuild_ledger`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::battle::BattleResult;
use crate::elimination::EliminationOutcome;
use crate::error::StoreError;
use crate::ledger::LossLedger;
use crate::report::{self, FIRST_LABEL, LOSER_LABEL, SECOND_LABEL, TOPIC_HEADING};

static BATTLE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^battle-([1-9][0-9]*)\.md$").unwrap());

/// Header fields of a persisted battle report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleSummary {
    pub index: u32,
    pub debater_a: String,
    pub debater_b: String,
    pub topic: String,
    pub loser: String,
}

/// Flat directory of battle reports.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// Open (creating if needed) the report directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn battle_path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("battle-{index}.md"))
    }

    /// Indices of every persisted battle, ascending.
    pub fn completed_indices(&self) -> Result<Vec<u32>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let mut indices = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(caps) = BATTLE_FILE.captures(name) {
                match caps[1].parse::<u32>() {
                    Ok(index) => indices.push(index),
                    Err(_) => warn!(file = name, "battle index out of range, ignoring"),
                }
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }

    /// Highest persisted battle index, or 0 when nothing is persisted.
    pub fn highest_index(&self) -> Result<u32, StoreError> {
        Ok(self.completed_indices()?.last().copied().unwrap_or(0))
    }

    /// Persist a finished battle. Refuses to overwrite an existing report.
    pub fn write_battle(&self, result: &BattleResult) -> Result<PathBuf, StoreError> {
        let path = self.battle_path(result.index);
        if path.exists() {
            return Err(StoreError::AlreadyPersisted(result.index));
        }
        write_atomic(&path, &report::render_battle(result))?;
        debug!(battle = result.index, path = %path.display(), "battle persisted");
        Ok(path)
    }

    /// Loser named by battle `index`'s final line.
    pub fn read_loser(&self, index: u32) -> Result<String, StoreError> {
        let path = self.battle_path(index);
        let text = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        parse_loser(&text).ok_or(StoreError::MissingLoser { path })
    }

    /// Debaters, topic and loser of battle `index`.
    pub fn read_summary(&self, index: u32) -> Result<BattleSummary, StoreError> {
        let path = self.battle_path(index);
        let text = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        let loser = parse_loser(&text).ok_or_else(|| StoreError::MissingLoser {
            path: path.clone(),
        })?;

        let field = |label: &str| {
            text.lines()
                .find_map(|l| l.strip_prefix(label))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };
        let topic = text
            .lines()
            .skip_while(|l| l.trim() != TOPIC_HEADING)
            .nth(1)
            .and_then(|l| l.strip_prefix("- "))
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        Ok(BattleSummary {
            index,
            debater_a: field(FIRST_LABEL),
            debater_b: field(SECOND_LABEL),
            topic,
            loser,
        })
    }

    /// Rebuild the loss ledger purely from persisted reports.
    ///
    /// Every roster name starts at zero; each report adds one loss to the
    /// agent on its loser line. A report naming someone off the roster is an
    /// error rather than a silently dropped loss.
    pub fn rebuild_ledger<I, S>(&self, roster: I) -> Result<LossLedger, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ledger = LossLedger::new(roster);
        for index in self.completed_indices()? {
            let loser = self.read_loser(index)?;
            if ledger.record(&loser).is_none() {
                return Err(StoreError::UnknownAgent {
                    path: self.battle_path(index),
                    name: loser,
                });
            }
        }
        Ok(ledger)
    }

    /// Rewrite the aggregate report at `path`.
    pub fn write_aggregate(
        &self,
        path: &Path,
        ledger: &LossLedger,
        outcome: &EliminationOutcome,
    ) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        write_atomic(path, &report::render_aggregate(ledger, outcome))
    }
}

/// Last `- Loser:` line in a report.
pub fn parse_loser(text: &str) -> Option<String> {
    text.lines()
        .rev()
        .find_map(|l| l.trim_end().strip_prefix(LOSER_LABEL))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    let mut file = fs::File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
    file.write_all(contents.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(|e| StoreError::io(&tmp, e))?;
    drop(file);

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io(path, e));
    }
    sync_parent(path)
}

/// Flush the directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_parent(path: &Path) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::File::open(parent)
        .and_then(|dir| dir.sync_all())
        .map_err(|e| StoreError::io(parent, e))
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::{Resolution, Vote};
    use crate::transcript::Transcript;
    use tempfile::tempdir;

    fn result(index: u32, loser: &str) -> BattleResult {
        let mut transcript = Transcript::new();
        transcript.push("A", "Topic: kinship\nopening");
        transcript.push("B", "reply");
        BattleResult {
            index,
            debater_a: "A".into(),
            debater_b: "B".into(),
            topic: "kinship".into(),
            transcript,
            votes: vec![Vote {
                spectator: "C".into(),
                loser: loser.into(),
                reason: "Loser: Z was a red herring".into(),
            }],
            loser: loser.into(),
            resolution: Resolution::Majority,
        }
    }

    #[test]
    fn empty_store_has_no_battles() {
        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path().join("battles")).unwrap();
        assert_eq!(store.highest_index().unwrap(), 0);
        assert!(store.completed_indices().unwrap().is_empty());
    }

    #[test]
    fn write_then_read_back() {
        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path()).unwrap();
        store.write_battle(&result(2, "B")).unwrap();
        store.write_battle(&result(10, "A")).unwrap();
        fs::write(dir.path().join("notes.md"), "- Loser: nobody").unwrap();
        fs::write(dir.path().join(".battle-11.md.tmp"), "partial").unwrap();

        assert_eq!(store.completed_indices().unwrap(), vec![2, 10]);
        assert_eq!(store.highest_index().unwrap(), 10);
        assert_eq!(store.read_loser(2).unwrap(), "B");

        let summary = store.read_summary(10).unwrap();
        assert_eq!(summary.debater_a, "A");
        assert_eq!(summary.debater_b, "B");
        assert_eq!(summary.topic, "kinship");
        assert_eq!(summary.loser, "A");
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path()).unwrap();
        store.write_battle(&result(1, "A")).unwrap();
        let err = store.write_battle(&result(1, "B")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyPersisted(1)));
        assert_eq!(store.read_loser(1).unwrap(), "A");
    }

    #[test]
    fn rebuild_ledger_counts_reports() {
        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path()).unwrap();
        for (i, loser) in ["A", "B", "A"].iter().enumerate() {
            store.write_battle(&result(i as u32 + 1, loser)).unwrap();
        }
        let ledger = store.rebuild_ledger(["A", "B", "C"]).unwrap();
        assert_eq!(ledger.get("A"), Some(2));
        assert_eq!(ledger.get("B"), Some(1));
        assert_eq!(ledger.get("C"), Some(0));
        assert_eq!(ledger.total(), 3);
    }

    #[test]
    fn rebuild_rejects_unknown_and_missing_loser() {
        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path()).unwrap();
        store.write_battle(&result(1, "A")).unwrap();
        assert!(matches!(
            store.rebuild_ledger(["B", "C"]),
            Err(StoreError::UnknownAgent { ref name, .. }) if name == "A"
        ));

        fs::write(store.battle_path(2), "# battle-2\n\n## Result\n").unwrap();
        assert!(matches!(
            store.rebuild_ledger(["A"]),
            Err(StoreError::MissingLoser { .. })
        ));
    }

    #[test]
    fn loser_line_is_the_last_one() {
        let text = "- Loser: Early\nnoise\n- Loser: Late  \n";
        assert_eq!(parse_loser(text).as_deref(), Some("Late"));
        assert_eq!(parse_loser("- Loser:   \n"), None);
    }

    #[test]
    fn aggregate_lands_in_a_new_nested_directory() {
        use crate::config::EliminationTiePolicy;
        use crate::elimination::EliminationResolver;
        use crate::rng::ScriptedRandom;

        let dir = tempdir().unwrap();
        let store = ReportStore::open(dir.path().join("battles")).unwrap();
        let mut ledger = LossLedger::new(["A", "B", "C"]);
        ledger.record("B");
        let outcome = EliminationResolver::new(EliminationTiePolicy::Lexicographic)
            .resolve(&ledger, &mut ScriptedRandom::default())
            .unwrap();

        let target = dir.path().join("out").join("nested").join("final.md");
        store.write_aggregate(&target, &ledger, &outcome).unwrap();
        store.write_aggregate(&target, &ledger, &outcome).unwrap();

        let written = fs::read_to_string(&target).unwrap();
        assert_eq!(written, report::render_aggregate(&ledger, &outcome));
        let leftovers: Vec<_> = fs::read_dir(target.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
