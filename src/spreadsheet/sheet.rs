use crate::database::row::Row;

/// Raw rows of one sheet as delivered by the row source, before profiling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSheet {
    /// Sheet display name
    pub name: String,
    /// Records in sheet order, sharing one set of column names
    pub rows: Vec<Row>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        RawSheet {
            name: name.into(),
            rows,
        }
    }

    /// Returns true if the sheet has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names taken from the first row.
    pub fn header(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.columns().collect())
            .unwrap_or_default()
    }
}
