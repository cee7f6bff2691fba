use crate::database::row::Row;
use crate::spreadsheet::cell::CellKey;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::criteria::Criteria;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Share of present values that must parse as dates for a DATE column (80%).
const DATE_THRESHOLD: (usize, usize) = (8, 10);
/// Share of present values that must parse as numbers for a NUMBER column (80%).
const NUMBER_THRESHOLD: (usize, usize) = (8, 10);
/// Share of present values that must be booleans for a BOOLEAN column (90%).
const BOOLEAN_THRESHOLD: (usize, usize) = (9, 10);
/// Number of distinct example values kept per column.
pub const EXAMPLE_VALUES: usize = 5;

/// Inferred data type of a profiled column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    /// Free text, and the fallback for mixed or empty columns
    #[default]
    String,
    /// Finite numbers
    Number,
    /// Dates and timestamps
    Date,
    /// Native booleans
    Boolean,
    /// Placeholder, never produced by inference
    Unknown,
}

impl ColumnType {
    /// Returns the string representation of the column type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "STRING",
            ColumnType::Number => "NUMBER",
            ColumnType::Date => "DATE",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Unknown => "UNKNOWN",
        }
    }

    /// Classifies one present value.
    ///
    /// Native timestamps and booleans are taken as they are; anything else is
    /// tried as a number, then (when longer than five characters) as a date.
    pub fn classify(value: &CellValue) -> ColumnType {
        match value {
            CellValue::Timestamp(_) => ColumnType::Date,
            CellValue::Boolean(_) => ColumnType::Boolean,
            _ if value.to_number().is_some() => ColumnType::Number,
            _ if value.to_timestamp().is_some() => ColumnType::Date,
            _ => ColumnType::String,
        }
    }

    /// Picks the column type from per-value classifications.
    ///
    /// Rules are checked in priority order, first match wins:
    /// 1. Date - at least 80% of present values
    /// 2. Number - at least 80% of present values
    /// 3. Boolean - at least 90% of present values
    /// 4. String - everything else, including columns with no present values
    pub fn detect(tally: &TypeTally) -> ColumnType {
        if tally.present == 0 {
            ColumnType::String
        } else if tally.reaches(tally.dates, DATE_THRESHOLD) {
            ColumnType::Date
        } else if tally.reaches(tally.numbers, NUMBER_THRESHOLD) {
            ColumnType::Number
        } else if tally.reaches(tally.booleans, BOOLEAN_THRESHOLD) {
            ColumnType::Boolean
        } else {
            ColumnType::String
        }
    }
}

/// Counts of present values per classified type.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TypeTally {
    pub present: usize,
    pub dates: usize,
    pub numbers: usize,
    pub booleans: usize,
    pub strings: usize,
}

impl TypeTally {
    /// Records the classification of one present value.
    pub fn add(&mut self, kind: ColumnType) {
        self.present += 1;
        match kind {
            ColumnType::Date => self.dates += 1,
            ColumnType::Number => self.numbers += 1,
            ColumnType::Boolean => self.booleans += 1,
            ColumnType::String | ColumnType::Unknown => self.strings += 1,
        }
    }

    /// `count / present >= numerator / denominator`, in integer arithmetic.
    #[inline]
    fn reaches(&self, count: usize, (numerator, denominator): (usize, usize)) -> bool {
        count * denominator >= self.present * numerator
    }
}

/// Statistical summary of one column.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    /// Column name, unique within its table
    pub name: String,
    /// Inferred data type
    pub inferred_type: ColumnType,
    /// Rows whose value is absent or a null literal
    pub null_count: usize,
    /// Distinct present values
    pub unique_count: usize,
    /// Smallest value (NUMBER and DATE only)
    pub min: Option<CellValue>,
    /// Largest value (NUMBER and DATE only)
    pub max: Option<CellValue>,
    /// Sum of valid numbers (NUMBER only)
    pub sum: Option<f64>,
    /// Mean of valid numbers (NUMBER only)
    pub mean: Option<f64>,
    /// Up to five distinct present values in encounter order
    pub example_values: Vec<CellValue>,
}

impl ColumnProfile {
    /// Profiles `name` over the full row set.
    ///
    /// Rows missing the column count as null, so
    /// `null_count + present rows == total_row_count` holds whenever
    /// `total_row_count == rows.len()`.
    pub fn profile(name: &str, rows: &[Row], total_row_count: usize, criteria: &Criteria) -> Self {
        let mut tally = TypeTally::default();
        let mut distinct = HashSet::<CellKey>::new();
        let mut present = Vec::<&CellValue>::new();
        let mut example_values = Vec::<CellValue>::new();

        for row in rows {
            let value = row.value(name);
            if criteria.is_null(value) {
                continue;
            }
            tally.add(ColumnType::classify(value));
            if let Some(key) = value.key() {
                if distinct.insert(key) && example_values.len() < EXAMPLE_VALUES {
                    example_values.push(value.to_owned());
                }
            }
            present.push(value);
        }

        let inferred_type = ColumnType::detect(&tally);
        let mut profile = ColumnProfile {
            name: name.to_owned(),
            inferred_type,
            null_count: total_row_count.saturating_sub(present.len()),
            unique_count: distinct.len(),
            min: None,
            max: None,
            sum: None,
            mean: None,
            example_values,
        };

        match inferred_type {
            ColumnType::Number => profile.summarize_numbers(&present),
            ColumnType::Date => profile.summarize_dates(&present),
            _ => (),
        }
        debug!(
            column = name,
            kind = inferred_type.as_str(),
            nulls = profile.null_count,
            distinct = profile.unique_count,
            "profiled column"
        );
        profile
    }

    /// Computes min, max, sum and mean over the values that coerce to finite numbers.
    fn summarize_numbers(&mut self, values: &[&CellValue]) {
        let numbers: Vec<f64> = values.iter().filter_map(|value| value.to_number()).collect();
        if numbers.is_empty() {
            return;
        }
        let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let sum: f64 = numbers.iter().sum();
        self.min = Some(CellValue::Number(min));
        self.max = Some(CellValue::Number(max));
        self.sum = Some(sum);
        self.mean = Some(sum / numbers.len() as f64);
    }

    /// Computes min and max over the values that coerce to timestamps.
    fn summarize_dates(&mut self, values: &[&CellValue]) {
        let timestamps: Vec<NaiveDateTime> = values.iter().filter_map(|value| value.to_timestamp()).collect();
        self.min = timestamps.iter().min().copied().map(CellValue::Timestamp);
        self.max = timestamps.iter().max().copied().map(CellValue::Timestamp);
    }

    /// Share of rows with a present value, 0.0 for an empty table.
    pub fn completeness(&self, row_count: usize) -> f64 {
        if row_count == 0 {
            0.0
        } else {
            1.0 - self.null_count as f64 / row_count as f64
        }
    }

    /// Distinct values per row, 0.0 for an empty table.
    pub fn uniqueness(&self, row_count: usize) -> f64 {
        if row_count == 0 {
            0.0
        } else {
            self.unique_count as f64 / row_count as f64
        }
    }

    /// Copy of this profile under a different name.
    pub fn renamed(&self, name: String) -> Self {
        ColumnProfile {
            name,
            ..self.to_owned()
        }
    }
}
