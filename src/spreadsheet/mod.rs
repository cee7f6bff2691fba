//! # Spreadsheet Intake Module
//!
//! Turns the rows handed over by a row source into profiled tables. File
//! formats are parsed elsewhere; this module accepts sheets as ordered
//! records, either directly or as a JSON document of the shape
//! `{ "<sheet>": [ { "<column>": value, ... }, ... ], ... }`.
use crate::database::row::Row;
use crate::database::table::Table;
use crate::error::TabularError;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::sheet::RawSheet;
use crate::spreadsheet::SpreadsheetError::InvalidWorkbook;
use crate::spreadsheet::SpreadsheetError::NoTables;
use thiserror::Error;
use tracing::debug;

pub mod cell;
pub mod criteria;
pub mod sheet;

/// Errors raised while taking in sheets.
#[derive(Error, Debug, PartialEq)]
pub enum SpreadsheetError {
    /// Every sheet was empty or filtered out
    #[error("No non-empty sheets to analyze")]
    NoTables,

    /// The row source document does not have the expected shape
    #[error("Invalid workbook: {message}")]
    InvalidWorkbook { message: String },
}

/// Ordered collection of raw sheets from one upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<RawSheet>,
}

impl Workbook {
    /// Parses a JSON workbook document.
    pub fn from_json(document: &str) -> Result<Self, TabularError> {
        let value: serde_json::Value = serde_json::from_str(document)?;
        Ok(Workbook::try_from(value)?)
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Profiles the accepted sheets of this workbook.
    pub fn analyze(self, criteria: &Criteria) -> Result<Vec<Table>, SpreadsheetError> {
        analyze_sheets(self.sheets, criteria)
    }
}

impl TryFrom<serde_json::Value> for Workbook {
    type Error = SpreadsheetError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let serde_json::Value::Object(sheets) = value else {
            return Err(InvalidWorkbook {
                message: "expected an object of sheet names".to_owned(),
            });
        };
        let sheets = sheets
            .into_iter()
            .map(|(name, rows)| {
                let serde_json::Value::Array(rows) = rows else {
                    return Err(InvalidWorkbook {
                        message: format!("sheet '{name}' is not an array of rows"),
                    });
                };
                let rows = rows
                    .into_iter()
                    .enumerate()
                    .map(|(index, row)| {
                        Row::try_from(row).map_err(|_| InvalidWorkbook {
                            message: format!("row {} of sheet '{name}' is not an object", index + 1),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawSheet::new(name, rows))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Workbook { sheets })
    }
}

/// Profiles every accepted, non-empty sheet in order.
///
/// Sheets with no rows are skipped. Fails with [`SpreadsheetError::NoTables`]
/// when nothing is left to analyze.
pub fn analyze_sheets<I>(sheets: I, criteria: &Criteria) -> Result<Vec<Table>, SpreadsheetError>
where
    I: IntoIterator<Item = RawSheet>,
{
    let mut tables = Vec::new();
    for sheet in sheets {
        if criteria.sheet_limit.is_some_and(|limit| tables.len() >= limit) {
            break;
        }
        if !criteria.accept(&sheet.name) {
            debug!(sheet = sheet.name.as_str(), "sheet filtered out");
            continue;
        }
        if sheet.is_empty() {
            debug!(sheet = sheet.name.as_str(), "empty sheet skipped");
            continue;
        }
        tables.push(Table::analyze_with(sheet.rows, &sheet.name, criteria));
    }
    if tables.is_empty() {
        Err(NoTables)
    } else {
        Ok(tables)
    }
}
