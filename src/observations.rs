//! Grouped categorical observations
//!
//! Input model for the statistics engine: a group key (e.g. a weekday) mapped
//! to the ordered labels observed in that group. Groups keep insertion order,
//! which fixes the flattening order and therefore mode tie-breaking.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Mapping from group key to the ordered category labels observed in it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupedObservations {
    groups: IndexMap<String, Vec<String>>,
}

impl GroupedObservations {
    /// Create an empty set of observations
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group; a repeated key replaces the earlier labels in place
    pub fn insert_group<K, I, L>(&mut self, key: K, labels: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.groups
            .insert(key.into(), labels.into_iter().map(Into::into).collect());
    }

    /// Builder-style variant of [`insert_group`](Self::insert_group)
    pub fn with_group<K, I, L>(mut self, key: K, labels: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.insert_group(key, labels);
        self
    }

    /// Labels recorded for one group
    pub fn group(&self, key: &str) -> Option<&[String]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Iterate groups in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of labels across every group
    pub fn total_observations(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_observations() == 0
    }

    /// Parse observations from a JSON object of `group -> [labels]`
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse grouped observations JSON")
    }

    /// Load observations from a JSON file
    ///
    /// # Example file
    /// ```json
    /// { "MONDAY": ["GREEN", "BLUE"], "TUESDAY": ["BLEW", "RED"] }
    /// ```
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read observations file: {}", path.as_ref().display())
        })?;
        Self::from_json_str(&content)
    }
}

impl<K, L> FromIterator<(K, Vec<L>)> for GroupedObservations
where
    K: Into<String>,
    L: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, Vec<L>)>>(iter: T) -> Self {
        let mut grouped = Self::new();
        for (key, labels) in iter {
            grouped.insert_group(key, labels);
        }
        grouped
    }
}
