use crate::database::column::ColumnProfile;
use crate::database::row::Row;
use crate::spreadsheet::cell::CellValue;
use serde::Serialize;
use std::collections::HashSet;

/// Row-and-profile view shared by profiled tables and joined datasets.
pub trait Tabular {
    /// Records in order
    fn rows(&self) -> &[Row];

    /// Column profiles in column order
    fn columns(&self) -> &[ColumnProfile];

    /// Text literals that read as null
    fn nulls(&self) -> &HashSet<String>;

    /// Returns true if `value` is absent or a null literal.
    fn is_null(&self, value: &CellValue) -> bool {
        value.is_null(self.nulls())
    }

    /// Number of records
    fn row_count(&self) -> usize {
        self.rows().len()
    }

    /// Column names in order
    fn column_names(&self) -> Vec<&str> {
        self.columns().iter().map(|column| column.name.as_str()).collect()
    }
}

/// The flattened result of executing a data model.
///
/// Columns of joined tables carry a `<tableName>.` prefix. Profiles of joined
/// columns and the primary date/measure columns are taken from the source
/// tables as they were, not recomputed over the joined rows.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Merged records
    pub rows: Vec<Row>,
    /// Base columns followed by each joined table's prefixed columns
    pub columns: Vec<ColumnProfile>,
    /// Number of merged records
    pub row_count: usize,
    /// Base table's time axis
    pub primary_date_column: Option<String>,
    /// Base table's default measure
    pub primary_measure_column: Option<String>,
    /// Base dimensions followed by each joined table's prefixed dimensions
    pub dimensions: Vec<String>,
    /// Null literals of every table taking part
    #[serde(skip)]
    pub nulls: HashSet<String>,
}

impl Dataset {
    /// Profile of the named column.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|column| column.name == name)
    }
}

impl Tabular for Dataset {
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
