use crate::database::column::ColumnProfile;
use crate::database::column::ColumnType;
use crate::database::dataset::Tabular;
use crate::database::row::Row;
use crate::spreadsheet::criteria::Criteria;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Highest distinct count a dimension column may have.
const DIMENSION_MAX_UNIQUE: usize = 100;
/// A dimension must repeat: distinct values stay below this share of the rows.
const DIMENSION_MAX_RATIO: f64 = 0.9;

/// A profiled sheet.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Unique table identifier
    pub id: String,
    /// Table/sheet name
    pub table_name: String,
    /// Records in sheet order
    pub rows: Vec<Row>,
    /// Column profiles in column order
    pub columns: Vec<ColumnProfile>,
    /// Number of rows
    pub row_count: usize,
    /// Default time axis
    pub primary_date_column: Option<String>,
    /// Default quantity to aggregate
    pub primary_measure_column: Option<String>,
    /// Grouping candidates, lowest cardinality first
    pub dimensions: Vec<String>,
    /// Text literals read as null when the sheet was profiled
    #[serde(skip)]
    pub nulls: HashSet<String>,
}

impl Table {
    /// Profiles a sheet's rows with the default criteria.
    pub fn analyze(rows: Vec<Row>, sheet_name: &str) -> Self {
        Self::analyze_with(rows, sheet_name, &Criteria::default())
    }

    /// Profiles a sheet's rows.
    ///
    /// The column set is taken from the first row; later rows are assumed to share it.
    pub fn analyze_with(rows: Vec<Row>, sheet_name: &str, criteria: &Criteria) -> Self {
        let row_count = rows.len();
        let columns: Vec<ColumnProfile> = rows
            .first()
            .map(|row| {
                row.columns()
                    .map(|name| ColumnProfile::profile(name, &rows, row_count, criteria))
                    .collect()
            })
            .unwrap_or_default();

        let primary_date_column = primary_date_column(&columns);
        let primary_measure_column = primary_measure_column(&columns, row_count);
        let dimensions = dimensions(&columns, row_count);
        debug!(
            table = sheet_name,
            rows = row_count,
            columns = columns.len(),
            date = ?primary_date_column,
            measure = ?primary_measure_column,
            "analyzed sheet"
        );

        Table {
            id: Uuid::new_v4().to_string(),
            table_name: sheet_name.to_owned(),
            rows,
            columns,
            row_count,
            primary_date_column,
            primary_measure_column,
            dimensions,
            nulls: criteria.nulls.to_owned(),
        }
    }

    /// Profile of the named column.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|column| column.name == name)
    }
}

impl Tabular for Table {
    fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn columns(&self) -> &[ColumnProfile] {
        &self.columns
    }

    fn nulls(&self) -> &HashSet<String> {
        &self.nulls
    }
}

/// First DATE column that is not a single repeated date.
fn primary_date_column(columns: &[ColumnProfile]) -> Option<String> {
    columns
        .iter()
        .find(|column| column.inferred_type == ColumnType::Date && column.unique_count > 1)
        .map(|column| column.name.to_owned())
}

/// NUMBER column with the best `unique_count * completeness` score; earlier columns win ties.
fn primary_measure_column(columns: &[ColumnProfile], row_count: usize) -> Option<String> {
    let mut best: Option<(&ColumnProfile, f64)> = None;
    for column in columns.iter().filter(|column| column.inferred_type == ColumnType::Number) {
        let missing = if row_count > 0 {
            column.null_count as f64 / row_count as f64
        } else {
            0.0
        };
        let score = column.unique_count as f64 * (1.0 - missing);
        if best.map(|(_, best_score)| score > best_score).unwrap_or(true) {
            best = Some((column, score));
        }
    }
    best.map(|(column, _)| column.name.to_owned())
}

/// STRING columns that repeat enough to group by, sorted by ascending distinct count.
fn dimensions(columns: &[ColumnProfile], row_count: usize) -> Vec<String> {
    let mut dimensions: Vec<&ColumnProfile> = columns
        .iter()
        .filter(|column| column.inferred_type == ColumnType::String)
        .filter(|column| 1 < column.unique_count && column.unique_count <= DIMENSION_MAX_UNIQUE)
        .filter(|column| (column.unique_count as f64) < DIMENSION_MAX_RATIO * row_count as f64)
        .collect();
    dimensions.sort_by_key(|column| column.unique_count);
    dimensions.into_iter().map(|column| column.name.to_owned()).collect()
}
