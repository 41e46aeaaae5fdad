//! Descriptive statistics over categorical labels
//!
//! Pipeline: normalize -> flatten -> {mode, median, frequency variance,
//! probability of a target}. Every function here is pure and can be called
//! on its own; [`CategoricalStatsEngine`] strings them together.
//!
//! Two conventions are deliberate and kept as-is:
//! - the median sorts labels lexicographically and takes the lower median
//! - the variance is taken over relative frequencies of distinct categories,
//!   each category weighted equally

use indexmap::IndexMap;
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;

use crate::normalize::{normalize, NormalizationRules};
use crate::observations::GroupedObservations;

/// Errors raised by statistic computations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Invalid input: cannot compute {0} over an empty observation set")]
    InvalidInput(&'static str),
}

/// Result type for statistic computations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Occurrence count per distinct label, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    counts: IndexMap<String, u64>,
}

impl FrequencyTable {
    /// Count labels in a single forward scan
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut counts: IndexMap<String, u64> = IndexMap::new();
        for label in labels {
            let label = label.as_ref();
            match counts.get_mut(label) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(label.to_string(), 1);
                }
            }
        }
        Self { counts }
    }

    /// Count for one label (0 when never observed)
    pub fn count(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Sum of all counts; equals the number of labels scanned
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct labels
    pub fn distinct_count(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate `(label, count)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Label with the highest count; ties go to the label seen first
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        let mut best: Option<(&str, u64)> = None;
        for (label, count) in self.iter() {
            match best {
                Some((_, top)) if count <= top => {}
                _ => best = Some((label, count)),
            }
        }
        best
    }

    /// Rows sorted by count descending, first-seen order among equal counts
    pub fn sorted_by_count(&self) -> Vec<(&str, u64)> {
        let mut rows: Vec<(&str, u64)> = self.iter().collect();
        // stable sort keeps first-seen order for ties
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }
}

/// Distinct category count and unweighted variance of relative frequencies
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyVariance {
    pub distinct_count: usize,
    pub variance: f64,
}

/// Concatenate every group's labels, groups in insertion order
pub fn flatten(grouped: &GroupedObservations) -> Vec<String> {
    let mut labels = Vec::with_capacity(grouped.total_observations());
    for (_, group) in grouped.iter() {
        labels.extend(group.iter().cloned());
    }
    labels
}

/// Most frequent label; ties resolve to the first label reached in `labels`
pub fn mode<S: AsRef<str>>(labels: &[S]) -> Result<String> {
    FrequencyTable::from_labels(labels)
        .most_frequent()
        .map(|(label, _)| label.to_string())
        .ok_or(StatsError::InvalidInput("mode"))
}

/// Lower median in lexicographic label order
///
/// Labels are sorted by byte order and the element at index `(n - 1) / 2` is
/// returned, for odd and even `n` alike.
pub fn median<S: AsRef<str>>(labels: &[S]) -> Result<String> {
    if labels.is_empty() {
        return Err(StatsError::InvalidInput("median"));
    }
    let mut sorted: Vec<&str> = labels.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    Ok(sorted[(sorted.len() - 1) / 2].to_string())
}

/// Population variance of relative frequencies over distinct categories
///
/// `freq[c] = count[c] / n`, `mean = 1 / distinct`, and
/// `variance = sum((freq[c] - mean)^2) / distinct`.
pub fn frequency_variance<S: AsRef<str>>(labels: &[S]) -> Result<FrequencyVariance> {
    variance_of_table(&FrequencyTable::from_labels(labels))
}

fn variance_of_table(table: &FrequencyTable) -> Result<FrequencyVariance> {
    let distinct_count = table.distinct_count();
    if distinct_count == 0 {
        return Err(StatsError::InvalidInput("frequency variance"));
    }

    let n = table.total() as f64;
    let k = distinct_count as f64;
    let mean_freq = 1.0 / k;
    let variance = table
        .iter()
        .map(|(_, count)| {
            let delta = count as f64 / n - mean_freq;
            delta * delta
        })
        .sum::<f64>()
        / k;

    Ok(FrequencyVariance {
        distinct_count,
        variance,
    })
}

/// Empirical probability of `target`; an unseen target yields `0.0`
pub fn probability_of<S: AsRef<str>>(labels: &[S], target: &str) -> Result<f64> {
    if labels.is_empty() {
        return Err(StatsError::InvalidInput("probability"));
    }
    let hits = labels.iter().filter(|l| l.as_ref() == target).count();
    Ok(hits as f64 / labels.len() as f64)
}

/// Every statistic for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub total_observations: usize,
    pub mode: String,
    pub median: String,
    pub variance: FrequencyVariance,
    pub target: String,
    pub target_probability: f64,
    pub frequencies: FrequencyTable,
}

impl StatsReport {
    /// Write a human-readable summary
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "=== Categorical Statistics ===")?;
        writeln!(out)?;
        writeln!(out, "Observations:   {}", self.total_observations)?;
        writeln!(out, "Distinct:       {}", self.variance.distinct_count)?;
        writeln!(out, "Mode:           {}", self.mode)?;
        writeln!(out, "Median:         {}", self.median)?;
        writeln!(out, "Variance:       {:.6}", self.variance.variance)?;
        writeln!(
            out,
            "P({}):{:width$}{:.4}",
            self.target,
            "",
            self.target_probability,
            width = 12usize.saturating_sub(self.target.len())
        )?;
        writeln!(out)?;

        writeln!(out, "category           count  relative")?;
        writeln!(out, "---------------- -------- ---------")?;
        let n = self.total_observations as f64;
        for (label, count) in self.frequencies.sorted_by_count() {
            writeln!(out, "{:<16} {:>8} {:>9.4}", label, count, count as f64 / n)?;
        }
        writeln!(out, "---------------- -------- ---------")?;
        writeln!(out, "{:<16} {:>8} {:>9.4}", "total", self.frequencies.total(), 1.0)?;
        Ok(())
    }
}

/// Runs the normalize -> flatten -> statistics pipeline with fixed rules
#[derive(Debug, Clone, Default)]
pub struct CategoricalStatsEngine {
    rules: NormalizationRules,
}

impl CategoricalStatsEngine {
    /// Create an engine that applies `rules` before aggregation
    pub fn new(rules: NormalizationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &NormalizationRules {
        &self.rules
    }

    /// Normalize and flatten `raw` into one label sequence
    pub fn prepare(&self, raw: &GroupedObservations) -> Vec<String> {
        flatten(&normalize(raw, &self.rules))
    }

    /// Compute every statistic for `raw`
    ///
    /// # Errors
    /// [`StatsError::InvalidInput`] when `raw` holds no observations.
    pub fn analyze(&self, raw: &GroupedObservations, target: &str) -> Result<StatsReport> {
        let labels = self.prepare(raw);
        if labels.is_empty() {
            return Err(StatsError::InvalidInput("statistics"));
        }

        let frequencies = FrequencyTable::from_labels(&labels);
        let mode = frequencies
            .most_frequent()
            .map(|(label, _)| label.to_string())
            .ok_or(StatsError::InvalidInput("mode"))?;
        let median = median(&labels)?;
        let variance = variance_of_table(&frequencies)?;
        let target_probability = probability_of(&labels, target)?;

        if frequencies.count(target) == 0 {
            tracing::warn!(target_label = target, "target category never observed");
        }
        tracing::debug!(
            observations = labels.len(),
            distinct = variance.distinct_count,
            mode = %mode,
            median = %median,
            "computed categorical statistics"
        );

        Ok(StatsReport {
            total_observations: labels.len(),
            mode,
            median,
            variance,
            target: target.to_string(),
            target_probability,
            frequencies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn sample() -> Vec<&'static str> {
        vec!["RED", "BLUE", "RED", "GREEN", "BLUE", "RED"]
    }

    #[test]
    fn test_frequency_table_counts() {
        let table = FrequencyTable::from_labels(&sample());
        assert_eq!(table.count("RED"), 3);
        assert_eq!(table.count("BLUE"), 2);
        assert_eq!(table.count("GREEN"), 1);
        assert_eq!(table.count("PINK"), 0);
        assert_eq!(table.total(), 6);
        assert_eq!(table.distinct_count(), 3);
    }

    #[test]
    fn test_frequency_table_first_seen_order() {
        let table = FrequencyTable::from_labels(&["GREEN", "RED", "GREEN", "BLUE"]);
        let order: Vec<&str> = table.iter().map(|(l, _)| l).collect();
        assert_eq!(order, vec!["GREEN", "RED", "BLUE"]);
    }

    #[test]
    fn test_frequency_table_empty() {
        let table = FrequencyTable::from_labels::<&str>(&[]);
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
        assert!(table.most_frequent().is_none());
    }

    #[test]
    fn test_sorted_by_count_keeps_first_seen_on_ties() {
        let table = FrequencyTable::from_labels(&["PINK", "RED", "RED", "CREAM", "PINK"]);
        let rows = table.sorted_by_count();
        assert_eq!(rows, vec![("PINK", 2), ("RED", 2), ("CREAM", 1)]);
    }

    #[test]
    fn test_flatten_concatenates_in_group_order() {
        let grouped = GroupedObservations::new()
            .with_group("MONDAY", ["RED", "BLUE"])
            .with_group("TUESDAY", ["GREEN"]);
        assert_eq!(flatten(&grouped), vec!["RED", "BLUE", "GREEN"]);
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten(&GroupedObservations::new()).is_empty());
    }

    #[test]
    fn test_mode_basic() {
        assert_eq!(mode(&sample()).unwrap(), "RED");
    }

    #[test]
    fn test_mode_tie_goes_to_first_seen() {
        assert_eq!(mode(&["BLUE", "RED", "RED", "BLUE"]).unwrap(), "BLUE");
        assert_eq!(mode(&["RED", "BLUE", "BLUE", "RED"]).unwrap(), "RED");
    }

    #[test]
    fn test_mode_empty_is_invalid() {
        assert_eq!(
            mode::<&str>(&[]).unwrap_err(),
            StatsError::InvalidInput("mode")
        );
    }

    #[test]
    fn test_median_odd_count() {
        // sorted: BLUE BLUE GREEN RED RED
        assert_eq!(median(&["RED", "BLUE", "GREEN", "RED", "BLUE"]).unwrap(), "GREEN");
    }

    #[test]
    fn test_median_even_count_takes_lower() {
        // sorted: BLUE BLUE GREEN RED RED RED -> index 2
        assert_eq!(median(&sample()).unwrap(), "GREEN");
        assert_eq!(median(&["B", "A"]).unwrap(), "A");
    }

    #[test]
    fn test_median_is_byte_order() {
        // uppercase sorts before lowercase
        assert_eq!(median(&["red", "RED", "blue"]).unwrap(), "blue");
    }

    #[test]
    fn test_median_single() {
        assert_eq!(median(&["PINK"]).unwrap(), "PINK");
    }

    #[test]
    fn test_median_empty_is_invalid() {
        assert!(median::<&str>(&[]).is_err());
    }

    #[test]
    fn test_frequency_variance_example() {
        let v = frequency_variance(&sample()).unwrap();
        assert_eq!(v.distinct_count, 3);
        let expected = ((0.5 - 1.0 / 3.0_f64).powi(2) + (1.0 / 6.0 - 1.0 / 3.0_f64).powi(2)) / 3.0;
        assert!((v.variance - expected).abs() < EPS);
        assert!((v.variance - 0.018_518_518_5).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_variance_all_distinct_is_zero() {
        let v = frequency_variance(&["RED", "BLUE", "GREEN", "PINK"]).unwrap();
        assert_eq!(v.distinct_count, 4);
        assert!(v.variance.abs() < EPS);
    }

    #[test]
    fn test_frequency_variance_single_category_is_zero() {
        let v = frequency_variance(&["RED", "RED", "RED"]).unwrap();
        assert_eq!(v.distinct_count, 1);
        assert!(v.variance.abs() < EPS);
    }

    #[test]
    fn test_frequency_variance_empty_is_invalid() {
        assert_eq!(
            frequency_variance::<&str>(&[]).unwrap_err(),
            StatsError::InvalidInput("frequency variance")
        );
    }

    #[test]
    fn test_probability_of() {
        assert!((probability_of(&sample(), "RED").unwrap() - 0.5).abs() < EPS);
        assert!((probability_of(&sample(), "GREEN").unwrap() - 1.0 / 6.0).abs() < EPS);
    }

    #[test]
    fn test_probability_of_unseen_target_is_zero() {
        assert_eq!(probability_of(&sample(), "PURPLE").unwrap(), 0.0);
    }

    #[test]
    fn test_probability_of_empty_is_invalid() {
        assert!(probability_of::<&str>(&[], "RED").is_err());
    }

    #[test]
    fn test_engine_applies_rules() {
        let rules = NormalizationRules::from_pairs([("BLEW", "BLUE")]).unwrap();
        let engine = CategoricalStatsEngine::new(rules);
        let raw = GroupedObservations::new()
            .with_group("MONDAY", ["BLEW", "RED"])
            .with_group("TUESDAY", ["BLUE", "BLEW"]);

        let report = engine.analyze(&raw, "BLUE").unwrap();
        assert_eq!(report.frequencies.count("BLUE"), 3);
        assert_eq!(report.frequencies.count("BLEW"), 0);
        assert_eq!(report.mode, "BLUE");
        assert!((report.target_probability - 0.75).abs() < EPS);
    }

    #[test]
    fn test_engine_report_matches_free_functions() {
        let raw = GroupedObservations::new()
            .with_group("a", ["RED", "BLUE", "RED"])
            .with_group("b", ["GREEN", "BLUE", "RED"]);
        let report = CategoricalStatsEngine::default().analyze(&raw, "RED").unwrap();
        let labels = sample();

        assert_eq!(report.total_observations, 6);
        assert_eq!(report.mode, mode(&labels).unwrap());
        assert_eq!(report.median, median(&labels).unwrap());
        assert_eq!(report.variance, frequency_variance(&labels).unwrap());
        assert_eq!(report.target, "RED");
        assert!((report.target_probability - 0.5).abs() < EPS);
    }

    #[test]
    fn test_engine_empty_input_is_invalid() {
        let raw = GroupedObservations::new().with_group("MONDAY", Vec::<String>::new());
        let err = CategoricalStatsEngine::default().analyze(&raw, "RED").unwrap_err();
        assert!(matches!(err, StatsError::InvalidInput(_)));
    }

    #[test]
    fn test_write_summary() {
        let raw = GroupedObservations::new().with_group("a", sample());
        let report = CategoricalStatsEngine::default().analyze(&raw, "RED").unwrap();

        let mut out = Vec::new();
        report.write_summary(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Mode:           RED"));
        assert!(text.contains("Median:         GREEN"));
        assert!(text.contains("Variance:       0.018519"));
        assert!(text.contains("P(RED):"));
        assert!(text.contains("0.5000"));
        assert!(text.contains("total"));
    }

    #[test]
    fn test_stats_error_display() {
        let err = StatsError::InvalidInput("probability");
        assert_eq!(
            err.to_string(),
            "Invalid input: cannot compute probability over an empty observation set"
        );
    }
}
