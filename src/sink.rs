//! Frequency table sinks
//!
//! A sink receives one `record(category, frequency)` call per distinct
//! category. Recording a category that is already stored replaces its
//! frequency, so publishing the same table twice leaves a sink unchanged.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::csv_output::{escape_field, split_record, split_records};
use crate::persist::write_atomic;
use crate::stats::FrequencyTable;

/// Header row of the CSV store file
const STORE_HEADER: &str = "category,frequency";

/// Destination for a derived frequency table (upsert by category)
pub trait FrequencySink {
    fn record(&mut self, category: &str, frequency: u64) -> Result<()>;
}

/// Send every row of `table` to `sink`, in first-seen order
pub fn publish<S: FrequencySink + ?Sized>(table: &FrequencyTable, sink: &mut S) -> Result<()> {
    for (category, frequency) in table.iter() {
        sink.record(category, frequency)?;
    }
    tracing::debug!(rows = table.distinct_count(), "published frequency table");
    Ok(())
}

/// In-memory upsert table
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemorySink {
    rows: IndexMap<String, u64>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: &str) -> Option<u64> {
        self.rows.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FrequencySink for MemorySink {
    fn record(&mut self, category: &str, frequency: u64) -> Result<()> {
        self.rows.insert(category.to_string(), frequency);
        Ok(())
    }
}

/// Writes `category: frequency` lines to any writer (e.g. stdout)
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrequencySink for WriterSink<W> {
    fn record(&mut self, category: &str, frequency: u64) -> Result<()> {
        writeln!(self.out, "{}: {}", category, frequency).context("Failed to write frequency row")
    }
}

/// File-backed frequency table keyed by category
///
/// Rows already in the file are loaded on [`open`](Self::open); `record`
/// upserts in memory and [`persist`](Self::persist) rewrites the whole file.
#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    rows: IndexMap<String, u64>,
}

impl CsvStore {
    /// Open a store, loading existing rows; a missing file starts empty
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let rows = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read frequency store: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Corrupt frequency store: {}", path.display()))?
        } else {
            IndexMap::new()
        };

        tracing::debug!(path = %path.display(), rows = rows.len(), "opened frequency store");
        Ok(Self { path, rows })
    }

    fn parse(content: &str) -> Result<IndexMap<String, u64>> {
        let mut rows = IndexMap::new();
        let mut records = split_records(content).into_iter();

        match records.next() {
            Some((_, header)) if header.trim() == STORE_HEADER => {}
            Some((_, header)) => bail!("Unexpected header: {}", header),
            None => return Ok(rows),
        }

        for (line, record) in records {
            if record.trim().is_empty() {
                continue;
            }
            let fields = split_record(&record)
                .with_context(|| format!("Malformed row on line {}", line))?;
            let [category, frequency] = fields.as_slice() else {
                bail!("Expected 2 fields on line {}, found {}", line, fields.len());
            };
            let frequency: u64 = frequency
                .trim()
                .parse()
                .with_context(|| format!("Invalid frequency on line {}: {}", line, frequency))?;
            rows.insert(category.clone(), frequency);
        }
        Ok(rows)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, category: &str) -> Option<u64> {
        self.rows.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the store as CSV text
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(STORE_HEADER);
        output.push('\n');
        for (category, frequency) in &self.rows {
            output.push_str(&escape_field(category));
            output.push(',');
            output.push_str(&frequency.to_string());
            output.push('\n');
        }
        output
    }

    /// Rewrite the backing file with the current rows
    pub fn persist(&self) -> Result<()> {
        write_atomic(&self.path, &self.to_csv())
            .with_context(|| format!("Failed to write frequency store: {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), rows = self.rows.len(), "persisted frequency store");
        Ok(())
    }
}

impl FrequencySink for CsvStore {
    fn record(&mut self, category: &str, frequency: u64) -> Result<()> {
        self.rows.insert(category.to_string(), frequency);
        Ok(())
    }
}
