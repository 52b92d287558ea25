//! Loss ledger: per-agent count of battles lost.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Running loss counts for a fixed roster.
///
/// Every roster member starts at zero; each completed battle adds exactly one
/// loss, so the total always equals the number of battles recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossLedger {
    losses: BTreeMap<String, u32>,
}

impl LossLedger {
    /// Zeroed ledger for the given names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            losses: names.into_iter().map(|n| (n.into(), 0)).collect(),
        }
    }

    /// Add one loss to `name`. Returns the new count, or `None` when the
    /// name is not on the roster (nothing is recorded then).
    pub fn record(&mut self, name: &str) -> Option<u32> {
        let count = self.losses.get_mut(name)?;
        *count += 1;
        Some(*count)
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.losses.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.losses.contains_key(name)
    }

    /// Sum of all losses, i.e. battles recorded.
    pub fn total(&self) -> u32 {
        self.losses.values().sum()
    }

    pub fn counts(&self) -> &BTreeMap<String, u32> {
        &self.losses
    }

    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }

    /// Most losses first; equal counts in name order.
    pub fn ranked(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> =
            self.losses.iter().map(|(n, &c)| (n.as_str(), c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}
