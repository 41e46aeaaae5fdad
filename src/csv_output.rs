//! CSV output format for frequency tables
//!
//! Spreadsheet-friendly rendering of a [`StatsReport`] plus the field
//! escaping shared with the CSV frequency store.

use anyhow::{bail, Result};

use crate::stats::StatsReport;

/// Escape CSV field (handle commas, quotes, newlines)
pub fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one CSV record into unescaped fields
///
/// Accepts exactly what [`escape_field`] produces: bare fields, or fields
/// wrapped in quotes with embedded quotes doubled.
pub fn split_record(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;
    let mut at_field_start = true;

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => {
                    quoted = false;
                    if !matches!(chars.peek(), None | Some(',')) {
                        bail!("Unexpected character after closing quote");
                    }
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if at_field_start => {
                quoted = true;
                at_field_start = false;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }

    if quoted {
        bail!("Unterminated quoted field");
    }
    fields.push(field);
    Ok(fields)
}

/// Split CSV text into raw records, keeping line breaks inside quotes
///
/// Each record comes with the 1-based line it starts on. Record separators
/// are `\n` or `\r\n` outside a quoted field. An unterminated quote is
/// left for [`split_record`] to report.
pub fn split_records(content: &str) -> Vec<(usize, String)> {
    let mut records = Vec::new();
    let mut record = String::new();
    let mut quoted = false;
    let mut line = 1;
    let mut start_line = 1;

    for c in content.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                record.push(c);
            }
            '\n' if !quoted => {
                if record.ends_with('\r') {
                    record.pop();
                }
                records.push((start_line, std::mem::take(&mut record)));
                line += 1;
                start_line = line;
            }
            '\n' => {
                record.push(c);
                line += 1;
            }
            _ => record.push(c),
        }
    }

    if !record.is_empty() {
        records.push((start_line, record));
    }
    records
}

/// CSV frequency table output formatter
#[derive(Debug)]
pub struct CsvFrequencyOutput {
    rows: Vec<CsvFrequencyRow>,
}

/// One category row
#[derive(Debug, Clone, PartialEq)]
pub struct CsvFrequencyRow {
    pub category: String,
    pub count: u64,
    pub relative_frequency: f64,
}

impl CsvFrequencyOutput {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Rows for every category of `report`, most frequent first
    pub fn from_report(report: &StatsReport) -> Self {
        let n = report.total_observations as f64;
        let mut output = Self::new();
        for (category, count) in report.frequencies.sorted_by_count() {
            output.add_row(CsvFrequencyRow {
                category: category.to_string(),
                count,
                relative_frequency: count as f64 / n,
            });
        }
        output
    }

    pub fn add_row(&mut self, row: CsvFrequencyRow) {
        self.rows.push(row);
    }

    fn header() -> &'static str {
        "category,count,relative_frequency"
    }

    fn format_row(row: &CsvFrequencyRow) -> String {
        format!(
            "{},{},{:.6}",
            escape_field(&row.category),
            row.count,
            row.relative_frequency
        )
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(Self::header());
        output.push('\n');
        for row in &self.rows {
            output.push_str(&Self::format_row(row));
            output.push('\n');
        }
        output
    }
}

impl Default for CsvFrequencyOutput {
    fn default() -> Self {
        Self::new()
    }
}
