//! JSON output format for analysis reports

use serde::{Deserialize, Serialize};

use crate::stats::StatsReport;

/// Frequency of one category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonFrequency {
    pub category: String,
    pub count: u64,
    /// count / total observations
    pub relative: f64,
}

/// Probability of the configured target category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonTarget {
    pub category: String,
    pub probability: f64,
}

/// Variance of relative frequencies across distinct categories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonVariance {
    pub distinct_count: usize,
    pub variance: f64,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonOutput {
    /// Crate version that produced the report
    pub version: String,
    /// Format name
    pub format: String,
    pub total_observations: usize,
    pub mode: String,
    pub median: String,
    pub variance: JsonVariance,
    pub target: JsonTarget,
    /// Categories in first-seen order
    pub frequencies: Vec<JsonFrequency>,
    /// Normalization rules applied, as `[from, to]` pairs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub corrections: Vec<(String, String)>,
}

impl JsonOutput {
    /// Build the JSON document for a report
    pub fn from_report(report: &StatsReport) -> Self {
        let n = report.total_observations as f64;
        let frequencies = report
            .frequencies
            .iter()
            .map(|(category, count)| JsonFrequency {
                category: category.to_string(),
                count,
                relative: count as f64 / n,
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "catstat-json-v1".to_string(),
            total_observations: report.total_observations,
            mode: report.mode.clone(),
            median: report.median.clone(),
            variance: JsonVariance {
                distinct_count: report.variance.distinct_count,
                variance: report.variance.variance,
            },
            target: JsonTarget {
                category: report.target.clone(),
                probability: report.target_probability,
            },
            frequencies,
            corrections: Vec::new(),
        }
    }

    /// Record the normalization rules that were in effect
    pub fn with_corrections<'a, I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.corrections = rules
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        self
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
