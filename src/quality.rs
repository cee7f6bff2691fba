//! # Data Quality Report
//!
//! Completeness, cardinality and duplicate checks over a table or a joined
//! dataset. Counts are taken from the rows themselves, so a report on a
//! dataset reflects the joined population rather than the source profiles.
use crate::database::column::ColumnType;
use crate::database::dataset::Tabular;
use crate::spreadsheet::cell::CellKey;
use crate::spreadsheet::cell::CellValue;
use serde::Serialize;
use std::collections::HashSet;

/// Completeness below which a column is reported as sparse.
const SPARSE_COMPLETENESS: f64 = 0.5;

/// Problems worth surfacing for a single column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityIssue {
    /// No present values at all
    Empty,
    /// Present in fewer than half of the rows
    Sparse,
    /// A single distinct value across at least two rows
    Constant,
    /// Present and distinct in every row
    Identifier,
}

/// Quality summary of one column.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnQuality {
    pub name: String,
    pub inferred_type: ColumnType,
    pub null_count: usize,
    pub distinct_count: usize,
    pub completeness: f64,
    pub issues: Vec<QualityIssue>,
}

/// Quality summary of a whole table or dataset.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub row_count: usize,
    pub column_count: usize,
    /// Present cells over all cells, 1.0 when there are no cells
    pub completeness: f64,
    /// Rows equal to an earlier row in every column
    pub duplicate_rows: usize,
    pub columns: Vec<ColumnQuality>,
}

impl QualityReport {
    /// Builds the report for any table-like value.
    ///
    /// Values the data reads as null (absent or a null literal) count as missing.
    pub fn of<T>(data: &T) -> Self
    where
        T: Tabular + ?Sized,
    {
        let row_count = data.row_count();
        let columns: Vec<ColumnQuality> = data
            .columns()
            .iter()
            .map(|profile| {
                let mut distinct = HashSet::<CellKey>::new();
                let mut null_count = 0usize;
                for row in data.rows() {
                    match present_key(data, row.value(&profile.name)) {
                        Some(key) => {
                            distinct.insert(key);
                        }
                        None => null_count += 1,
                    }
                }
                let completeness = ratio(row_count - null_count, row_count);
                ColumnQuality {
                    name: profile.name.to_owned(),
                    inferred_type: profile.inferred_type,
                    null_count,
                    distinct_count: distinct.len(),
                    completeness,
                    issues: issues(row_count, null_count, distinct.len(), completeness),
                }
            })
            .collect();

        let cells = row_count * columns.len();
        let missing: usize = columns.iter().map(|column| column.null_count).sum();
        QualityReport {
            row_count,
            column_count: columns.len(),
            completeness: ratio(cells - missing, cells),
            duplicate_rows: duplicate_rows(data),
            columns,
        }
    }

    /// Columns reporting the given issue.
    pub fn columns_with(&self, issue: QualityIssue) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|column| column.issues.contains(&issue))
            .map(|column| column.name.as_str())
            .collect()
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        1.0
    } else {
        part as f64 / whole as f64
    }
}

fn issues(row_count: usize, null_count: usize, distinct: usize, completeness: f64) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    if row_count > 0 && null_count == row_count {
        issues.push(QualityIssue::Empty);
    } else if completeness < SPARSE_COMPLETENESS {
        issues.push(QualityIssue::Sparse);
    }
    if row_count >= 2 && distinct == 1 {
        issues.push(QualityIssue::Constant);
    }
    if row_count >= 2 && null_count == 0 && distinct == row_count {
        issues.push(QualityIssue::Identifier);
    }
    issues
}

/// Distinct-value identity of `value`, or `None` if the data reads it as null.
fn present_key<T>(data: &T, value: &CellValue) -> Option<CellKey>
where
    T: Tabular + ?Sized,
{
    if data.is_null(value) {
        None
    } else {
        value.key()
    }
}

/// Counts rows whose values in every profiled column repeat an earlier row.
fn duplicate_rows<T>(data: &T) -> usize
where
    T: Tabular + ?Sized,
{
    let mut seen = HashSet::<Vec<Option<CellKey>>>::new();
    data.rows()
        .iter()
        .filter(|row| {
            let fingerprint = data
                .columns()
                .iter()
                .map(|column| present_key(data, row.value(&column.name)))
                .collect();
            !seen.insert(fingerprint)
        })
        .count()
}
