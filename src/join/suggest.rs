use crate::database::column::ColumnProfile;
use crate::database::table::Table;
use crate::helpers::string::foreign_key_name;
use crate::helpers::string::key_column_names;
use crate::helpers::string::normalize;
use crate::helpers::string::same_name;
use crate::join::JoinConfig;
use crate::join::JoinType;
use tracing::debug;
use tracing::warn;

/// A right-hand column must have more distinct values than this share of its rows to act as a key.
const KEY_UNIQUENESS: f64 = 0.9;

/// Proposes joins from a base table to every other table using column naming
/// and uniqueness heuristics. Suggestions are advisory and always LEFT joins.
pub struct JoinSuggester;

impl JoinSuggester {
    /// Suggests at most one join per table other than the base.
    /// Tables without a confident relationship get no suggestion.
    pub fn suggest(base_table_id: &str, tables: &[Table]) -> Vec<JoinConfig> {
        let Some(base) = tables.iter().find(|table| table.id == base_table_id) else {
            warn!(base = base_table_id, "base table not found, nothing to suggest");
            return Vec::new();
        };
        tables
            .iter()
            .filter(|table| table.id != base.id)
            .filter_map(|right| {
                let (left_column, right_column) =
                    Self::match_by_name(base, right).or_else(|| Self::match_by_foreign_key(base, right))?;
                debug!(
                    base = base.table_name.as_str(),
                    right = right.table_name.as_str(),
                    left_column = left_column.as_str(),
                    right_column = right_column.as_str(),
                    "suggested join"
                );
                Some(JoinConfig::new(
                    right.id.to_owned(),
                    left_column,
                    right_column,
                    JoinType::Left,
                ))
            })
            .collect()
    }

    /// Same column name on both sides (case-insensitive) with a near-unique right column.
    /// When several pairs qualify the last one in column order wins.
    fn match_by_name(base: &Table, right: &Table) -> Option<(String, String)> {
        let mut found = None;
        for left_column in &base.columns {
            for right_column in &right.columns {
                if same_name(&left_column.name, &right_column.name) && is_key(right_column, right) {
                    found = Some((left_column.name.to_owned(), right_column.name.to_owned()));
                }
            }
        }
        found
    }

    /// Right table has a near-unique `id` / `<table>_id` / `<singular>_id` column and the
    /// base table has a column naming the right table or its foreign key.
    fn match_by_foreign_key(base: &Table, right: &Table) -> Option<(String, String)> {
        let key_names = key_column_names(&right.table_name);
        let right_column = right.columns.iter().find(|column| {
            key_names.contains(&normalize(&column.name)) && is_key(column, right)
        })?;

        let table_name = normalize(&right.table_name);
        let foreign_key = foreign_key_name(&right.table_name);
        let left_column = base.columns.iter().find(|column| {
            let name = normalize(&column.name);
            name.contains(&table_name) || name == foreign_key
        })?;
        Some((left_column.name.to_owned(), right_column.name.to_owned()))
    }
}

/// Distinct values cover more than 90% of the table's rows.
fn is_key(column: &ColumnProfile, table: &Table) -> bool {
    table.row_count > 0 && column.uniqueness(table.row_count) > KEY_UNIQUENESS
}
