//! # Rusty Tabular
//!
//! The data engine behind a spreadsheet analytics tool: it profiles the
//! columns of uploaded sheets, suggests how the sheets relate to each other,
//! and flattens a star of related sheets into one analysis-ready dataset.
//!
//! ## Features
//!
//! - **Type inference**: classifies every column as STRING, NUMBER, DATE or
//!   BOOLEAN from all of its values, with DATE taking priority over NUMBER
//! - **Column profiling**: null and distinct counts, min/max, sum/mean and
//!   example values
//! - **Sheet roles**: picks a primary date column, a primary measure and the
//!   dimensions worth grouping by
//! - **Join suggestion**: proposes keys from matching column names or the
//!   `id` / `<table>_id` naming convention, checked against uniqueness
//! - **Join execution**: sequential LEFT/INNER hash joins with prefixed column
//!   names and loose (string) key comparison
//! - **Quality report**: completeness, constant/identifier columns and
//!   duplicate rows for tables and joined datasets
//!
//! ## Entry Points
//!
//! - [`analyze`]: profile one sheet's rows into a [`Table`]
//! - [`suggest`]: propose [`JoinConfig`]s from a base table to the others
//! - [`execute`]: run a [`DataModel`] into a [`Dataset`]
//!
//! All three are pure: inputs are never mutated, so re-running them against
//! the same tables is safe and yields the same result.
pub mod database;
pub mod error;
pub(crate) mod helpers;
pub mod join;
pub mod quality;
pub mod spreadsheet;

pub use crate::database::column::ColumnProfile;
pub use crate::database::column::ColumnType;
pub use crate::database::dataset::Dataset;
pub use crate::database::dataset::Tabular;
pub use crate::database::row::Row;
pub use crate::database::table::Table;
pub use crate::error::TabularError;
pub use crate::join::engine::JoinEngine;
pub use crate::join::suggest::JoinSuggester;
pub use crate::join::DataModel;
pub use crate::join::JoinConfig;
pub use crate::join::JoinError;
pub use crate::join::JoinType;
pub use crate::quality::QualityReport;
pub use crate::spreadsheet::analyze_sheets;
pub use crate::spreadsheet::cell::CellValue;
pub use crate::spreadsheet::criteria::Criteria;
pub use crate::spreadsheet::sheet::RawSheet;
pub use crate::spreadsheet::SpreadsheetError;
pub use crate::spreadsheet::Workbook;

use crate::error::ResultMessage;

/// Profiles one sheet's rows into a table.
pub fn analyze(rows: Vec<Row>, sheet_name: &str) -> Table {
    Table::analyze(rows, sheet_name)
}

/// Suggests one LEFT join from the base table to each related table.
pub fn suggest(base_table_id: &str, tables: &[Table]) -> Vec<JoinConfig> {
    JoinSuggester::suggest(base_table_id, tables)
}

/// Executes a data model against the tables.
///
/// # Errors
///
/// Returns [`JoinError::MissingBaseTable`] if the model's base table is not
/// among `tables`.
pub fn execute(tables: &[Table], model: &DataModel) -> Result<Dataset, JoinError> {
    JoinEngine::execute(tables, model)
}

/// Parses a JSON workbook and profiles its accepted, non-empty sheets.
///
/// # Errors
///
/// Returns an error if the document is not a workbook or if no sheet is left
/// to analyze.
pub fn analyze_workbook(document: &str, criteria: &Criteria) -> Result<Vec<Table>, TabularError> {
    let workbook = Workbook::from_json(document).with_prefix("Read workbook failed")?;
    Ok(workbook.analyze(criteria)?)
}
