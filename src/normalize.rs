//! Label normalization
//!
//! Fixed correction table for known mislabeled entries (e.g. `BLEW -> BLUE`),
//! applied once before any aggregation. Labels without a rule pass through
//! unchanged.

use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::observations::GroupedObservations;

/// Mapping from a known-erroneous label to its corrected label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizationRules {
    rules: IndexMap<String, String>,
}

impl NormalizationRules {
    /// Rules that change nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// Build rules from `(erroneous, corrected)` pairs
    ///
    /// # Errors
    /// Rejects empty source labels, rules mapping a label onto itself, and a
    /// source label listed twice.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut rules = IndexMap::new();
        for (from, to) in pairs {
            let (from, to) = (from.into(), to.into());
            if rules.contains_key(&from) {
                bail!("Duplicate normalization rule for '{}'", from);
            }
            rules.insert(from, to);
        }
        let rules = Self { rules };
        rules.validate()?;
        Ok(rules)
    }

    /// Check rules loaded through serde
    pub fn validate(&self) -> Result<()> {
        for (from, to) in &self.rules {
            if from.is_empty() {
                bail!("Normalization rule has an empty source label");
            }
            if from == to {
                bail!("Normalization rule maps '{}' onto itself", from);
            }
        }
        Ok(())
    }

    /// Corrected form of `label`, or `label` itself when no rule matches
    pub fn apply<'a>(&'a self, label: &'a str) -> &'a str {
        self.rules.get(label).map(String::as_str).unwrap_or(label)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate `(erroneous, corrected)` pairs in configuration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Substitute every label that has a correction rule
///
/// Group structure and per-group order are preserved. Rules are applied once;
/// a corrected label is not looked up again.
pub fn normalize(raw: &GroupedObservations, rules: &NormalizationRules) -> GroupedObservations {
    let mut corrected = 0usize;
    let normalized: GroupedObservations = raw
        .iter()
        .map(|(key, labels)| {
            let fixed: Vec<String> = labels
                .iter()
                .map(|label| {
                    let out = rules.apply(label);
                    if out != label.as_str() {
                        corrected += 1;
                    }
                    out.to_string()
                })
                .collect();
            (key, fixed)
        })
        .collect();

    tracing::debug!(
        groups = raw.group_count(),
        rules = rules.len(),
        corrected,
        "normalized observations"
    );
    normalized
}
