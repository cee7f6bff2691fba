use crate::spreadsheet::cell::CellValue;
use indexmap::IndexMap;
use serde::Serialize;

/// One record of a sheet: column name to value, in column order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    values: IndexMap<String, CellValue>,
}

impl Row {
    /// Value at `column`, or `None` if the row has no such column.
    #[inline]
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }

    /// Value at `column`, treating a missing column as absent.
    #[inline]
    pub fn value(&self, column: &str) -> &CellValue {
        static ABSENT: CellValue = CellValue::Absent;
        self.values.get(column).unwrap_or(&ABSENT)
    }

    /// Sets `column`, keeping its position if it already exists.
    pub fn insert<V>(&mut self, column: impl Into<String>, value: V)
    where
        V: Into<CellValue>,
    {
        self.values.insert(column.into(), value.into());
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl TryFrom<serde_json::Value> for Row {
    type Error = serde_json::Value;

    /// Converts a JSON object into a row; any other JSON value is handed back.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(other),
        }
    }
}
