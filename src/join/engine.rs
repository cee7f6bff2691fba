use crate::database::column::ColumnProfile;
use crate::database::dataset::Dataset;
use crate::database::row::Row;
use crate::database::table::Table;
use crate::helpers::string::prefixed;
use crate::join::DataModel;
use crate::join::JoinConfig;
use crate::join::JoinError;
use crate::join::JoinType;
use crate::spreadsheet::cell::CellValue;
use std::collections::HashMap;
use std::collections::HashSet;
use tracing::info;
use tracing::warn;

/// Executes a data model as a sequence of hash joins.
///
/// Every join reads the rows accumulated so far as its left side, so later
/// joins may key on columns brought in by earlier ones. Source tables are
/// only read; rows are copied before they are extended.
pub struct JoinEngine;

/// Rows, columns and dimensions accumulated across join steps.
struct Accumulator {
    rows: Vec<Row>,
    columns: Vec<ColumnProfile>,
    dimensions: Vec<String>,
    names: HashSet<String>,
    nulls: HashSet<String>,
}

impl JoinEngine {
    /// Flattens the model's base table and joins into one dataset.
    ///
    /// Fails only when the base table is missing. Joins referencing a missing
    /// table or an unknown column are skipped.
    pub fn execute(tables: &[Table], model: &DataModel) -> Result<Dataset, JoinError> {
        let base = find(tables, &model.base_table_id).ok_or_else(|| JoinError::MissingBaseTable {
            id: model.base_table_id.to_owned(),
        })?;

        let mut accumulator = Accumulator {
            rows: base.rows.to_owned(),
            columns: base.columns.to_owned(),
            dimensions: base.dimensions.to_owned(),
            names: base.columns.iter().map(|column| column.name.to_owned()).collect(),
            nulls: base.nulls.to_owned(),
        };

        for join in &model.joins {
            let Some(right) = find(tables, &join.right_table_id) else {
                warn!(join = join.id.as_str(), table = join.right_table_id.as_str(), "right table not found, join skipped");
                continue;
            };
            if !accumulator.names.contains(&join.left_column) {
                warn!(join = join.id.as_str(), column = join.left_column.as_str(), "left column not found, join skipped");
                continue;
            }
            if right.column(&join.right_column).is_none() {
                warn!(join = join.id.as_str(), column = join.right_column.as_str(), "right column not found, join skipped");
                continue;
            }
            accumulator.join(right, join);
        }

        Ok(Dataset {
            row_count: accumulator.rows.len(),
            rows: accumulator.rows,
            columns: accumulator.columns,
            primary_date_column: base.primary_date_column.to_owned(),
            primary_measure_column: base.primary_measure_column.to_owned(),
            dimensions: accumulator.dimensions,
            nulls: accumulator.nulls,
        })
    }
}

impl Accumulator {
    /// Applies one join step against `right`.
    fn join(&mut self, right: &Table, join: &JoinConfig) {
        let lookup = build_lookup(right, &join.right_column);
        let prefix = self.prefix_for(right);
        let renamed: Vec<(&str, String)> = right
            .columns
            .iter()
            .map(|column| (column.name.as_str(), prefixed(&prefix, &column.name)))
            .collect();

        let rows_before = self.rows.len();
        let mut matched = 0usize;
        let rows = std::mem::take(&mut self.rows);
        self.rows = rows
            .into_iter()
            .filter_map(|mut row| {
                let key = join_key(row.value(&join.left_column), &self.nulls);
                let found = lookup.get(&key).copied();
                match (found, join.join_type) {
                    (Some(right_row), _) => {
                        matched += 1;
                        for (source, target) in &renamed {
                            row.insert(target.to_owned(), right_row.value(source).to_owned());
                        }
                        Some(row)
                    }
                    (None, JoinType::Left) => {
                        for (_, target) in &renamed {
                            row.insert(target.to_owned(), CellValue::Absent);
                        }
                        Some(row)
                    }
                    (None, JoinType::Inner) => None,
                }
            })
            .collect();

        for (column, (_, target)) in right.columns.iter().zip(&renamed) {
            self.columns.push(column.renamed(target.to_owned()));
            self.names.insert(target.to_owned());
        }
        self.nulls.extend(right.nulls.iter().cloned());
        self.dimensions.extend(
            right
                .dimensions
                .iter()
                .map(|dimension| prefixed(&prefix, dimension)),
        );
        info!(
            join = join.id.as_str(),
            table = right.table_name.as_str(),
            kind = join.join_type.as_str(),
            rows_before,
            matched,
            rows_after = self.rows.len(),
            "executed join"
        );
    }

    /// `<tableName>` unless that would clash with an existing column, then
    /// `<tableName>_2`, `<tableName>_3`, ...
    fn prefix_for(&self, right: &Table) -> String {
        let clashes = |prefix: &str| {
            right
                .columns
                .iter()
                .any(|column| self.names.contains(&prefixed(prefix, &column.name)))
        };
        let mut prefix = right.table_name.to_owned();
        let mut suffix = 1;
        while clashes(&prefix) {
            suffix += 1;
            prefix = format!("{}_{suffix}", right.table_name);
        }
        prefix
    }
}

fn find<'a>(tables: &'a [Table], id: &str) -> Option<&'a Table> {
    tables.iter().find(|table| table.id == id)
}

/// Stringified key of `value`. Nulls of any kind share the absent key `""`.
fn join_key(value: &CellValue, nulls: &HashSet<String>) -> String {
    if value.is_null(nulls) {
        String::new()
    } else {
        value.join_key()
    }
}

/// Maps each join key of `column` to its row. Later rows replace earlier rows
/// with the same key.
fn build_lookup<'a>(table: &'a Table, column: &str) -> HashMap<String, &'a Row> {
    let mut lookup = HashMap::<String, &Row>::with_capacity(table.rows.len());
    let mut shadowed = 0usize;
    for row in &table.rows {
        if lookup.insert(join_key(row.value(column), &table.nulls), row).is_some() {
            shadowed += 1;
        }
    }
    if shadowed > 0 {
        warn!(
            table = table.table_name.as_str(),
            column,
            shadowed,
            "duplicate join keys on the right side, last row per key wins"
        );
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::dataset::Tabular;
    use crate::spreadsheet::criteria::Criteria;
    use serde_json::json;
    use serde_json::Value;

    fn table(name: &str, values: Value) -> Table {
        let rows = match values {
            Value::Array(values) => values.into_iter().map(|value| Row::try_from(value).unwrap()).collect(),
            _ => panic!("expected an array of rows"),
        };
        Table::analyze(rows, name)
    }

    fn orders() -> Table {
        table("Orders", json!([
            {"id": 1, "cust": "A", "amt": 100},
            {"id": 2, "cust": "B", "amt": 50},
        ]))
    }

    fn customers() -> Table {
        table("Customers", json!([{"cust": "A", "tier": "gold"}]))
    }

    fn model(base: &Table, joins: Vec<JoinConfig>) -> DataModel {
        DataModel::new(base.id.to_owned(), joins)
    }

    #[test]
    fn left_join_keeps_unmatched_rows() {
        let (orders, customers) = (orders(), customers());
        let model = model(&orders, vec![JoinConfig::new(customers.id.to_owned(), "cust", "cust", JoinType::Left)]);
        let dataset = JoinEngine::execute(&[orders, customers], &model).unwrap();
        assert_eq!(dataset.row_count, 2);
        assert_eq!(dataset.rows[0].value("Customers.tier"), &CellValue::from("gold"));
        assert_eq!(dataset.rows[1].value("Customers.tier"), &CellValue::Absent);
        assert_eq!(dataset.rows[1].get("Customers.tier"), Some(&CellValue::Absent));
        assert_eq!(
            dataset.column_names(),
            vec!["id", "cust", "amt", "Customers.cust", "Customers.tier"]
        );
        assert_eq!(dataset.primary_measure_column.as_deref(), Some("id"));
    }

    #[test]
    fn inner_join_drops_unmatched_rows() {
        let (orders, customers) = (orders(), customers());
        let model = model(&orders, vec![JoinConfig::new(customers.id.to_owned(), "cust", "cust", JoinType::Inner)]);
        let dataset = JoinEngine::execute(&[orders, customers], &model).unwrap();
        assert_eq!(dataset.row_count, 1);
        assert_eq!(dataset.rows[0].value("cust"), &CellValue::from("A"));
    }

    #[test]
    fn missing_base_table_fails() {
        let result = JoinEngine::execute(&[orders()], &DataModel::new("nope", Vec::new()));
        assert_eq!(result.unwrap_err(), JoinError::MissingBaseTable { id: "nope".to_owned() });
    }

    #[test]
    fn missing_right_table_is_skipped() {
        let orders = orders();
        let model = model(&orders, vec![JoinConfig::new("nope", "cust", "cust", JoinType::Inner)]);
        let dataset = JoinEngine::execute(&[orders], &model).unwrap();
        assert_eq!(dataset.row_count, 2);
        assert_eq!(dataset.column_names(), vec!["id", "cust", "amt"]);
    }

    #[test]
    fn unknown_columns_are_skipped() {
        let (orders, customers) = (orders(), customers());
        let model = model(&orders, vec![
            JoinConfig::new(customers.id.to_owned(), "nope", "cust", JoinType::Inner),
            JoinConfig::new(customers.id.to_owned(), "cust", "nope", JoinType::Inner),
        ]);
        let dataset = JoinEngine::execute(&[orders, customers], &model).unwrap();
        assert_eq!(dataset.row_count, 2);
        assert_eq!(dataset.columns.len(), 3);
    }

    #[test]
    fn numeric_and_text_keys_match() {
        let orders = table("Orders", json!([{"cust_id": 7}, {"cust_id": 8}]));
        let customers = table("Customers", json!([{"code": "7", "name": "Ann"}]));
        let model = model(&orders, vec![JoinConfig::new(customers.id.to_owned(), "cust_id", "code", JoinType::Inner)]);
        let dataset = JoinEngine::execute(&[orders, customers], &model).unwrap();
        assert_eq!(dataset.row_count, 1);
        assert_eq!(dataset.rows[0].value("Customers.name"), &CellValue::from("Ann"));
    }

    #[test]
    fn duplicate_right_keys_last_row_wins() {
        let orders = orders();
        let customers = table("Customers", json!([
            {"cust": "A", "tier": "gold"},
            {"cust": "A", "tier": "silver"},
        ]));
        let model = model(&orders, vec![JoinConfig::new(customers.id.to_owned(), "cust", "cust", JoinType::Left)]);
        let dataset = JoinEngine::execute(&[orders, customers], &model).unwrap();
        assert_eq!(dataset.row_count, 2);
        assert_eq!(dataset.rows[0].value("Customers.tier"), &CellValue::from("silver"));
    }

    #[test]
    fn null_keys_match_each_other() {
        let orders = table("Orders", json!([{"cust": null, "amt": 1}, {"cust": "A", "amt": 2}, {"cust": "", "amt": 3}]));
        let customers = table("Customers", json!([{"cust": null, "tier": "none"}, {"cust": "A", "tier": "gold"}]));
        let model = model(&orders, vec![JoinConfig::new(customers.id.to_owned(), "cust", "cust", JoinType::Inner)]);
        let dataset = JoinEngine::execute(&[orders, customers], &model).unwrap();
        assert_eq!(dataset.row_count, 3);
        assert_eq!(dataset.rows[0].value("Customers.tier"), &CellValue::from("none"));
        assert_eq!(dataset.rows[1].value("Customers.tier"), &CellValue::from("gold"));
        assert_eq!(dataset.rows[2].value("Customers.tier"), &CellValue::from("none"));
    }

    #[test]
    fn null_literals_join_as_null() {
        let criteria = Criteria {
            nulls: HashSet::from(["".to_owned(), "N/A".to_owned()]),
            ..Criteria::default()
        };
        let orders = Table::analyze_with(
            vec![[("cust", "N/A")].into_iter().collect(), [("cust", "A")].into_iter().collect()],
            "Orders",
            &criteria,
        );
        let customers = table("Customers", json!([{"cust": null, "tier": "none"}, {"cust": "N/A", "tier": "literal"}]));
        let model = model(&orders, vec![JoinConfig::new(customers.id.to_owned(), "cust", "cust", JoinType::Left)]);
        let dataset = JoinEngine::execute(&[orders, customers], &model).unwrap();
        assert_eq!(dataset.rows[0].value("Customers.tier"), &CellValue::from("none"));
        assert_eq!(dataset.rows[1].value("Customers.tier"), &CellValue::Absent);
        assert!(dataset.nulls.contains("N/A"));
    }

    #[test]
    fn negative_zero_matches_text_zero() {
        let orders = table("Orders", json!([{"code": -0.0}]));
        let codes = table("Codes", json!([{"code": "0", "label": "zero"}]));
        let model = model(&orders, vec![JoinConfig::new(codes.id.to_owned(), "code", "code", JoinType::Inner)]);
        let dataset = JoinEngine::execute(&[orders, codes], &model).unwrap();
        assert_eq!(dataset.row_count, 1);
        assert_eq!(dataset.rows[0].value("Codes.label"), &CellValue::from("zero"));
    }

    #[test]
    fn chained_join_uses_accumulated_columns() {
        let orders = orders();
        let customers = table("Customers", json!([
            {"cust": "A", "region": "N"},
            {"cust": "B", "region": "S"},
        ]));
        let regions = table("Regions", json!([
            {"code": "N", "label": "North"},
            {"code": "S", "label": "South"},
        ]));
        let model = model(&orders, vec![
            JoinConfig::new(customers.id.to_owned(), "cust", "cust", JoinType::Left),
            JoinConfig::new(regions.id.to_owned(), "Customers.region", "code", JoinType::Left),
        ]);
        let dataset = JoinEngine::execute(&[orders, customers, regions], &model).unwrap();
        assert_eq!(dataset.rows[1].value("Regions.label"), &CellValue::from("South"));
    }

    #[test]
    fn same_table_twice_gets_distinct_prefix() {
        let (orders, customers) = (orders(), customers());
        let model = model(&orders, vec![
            JoinConfig::new(customers.id.to_owned(), "cust", "cust", JoinType::Left),
            JoinConfig::new(customers.id.to_owned(), "cust", "cust", JoinType::Left),
        ]);
        let dataset = JoinEngine::execute(&[orders, customers], &model).unwrap();
        let names = dataset.column_names();
        assert_eq!(
            names,
            vec!["id", "cust", "amt", "Customers.cust", "Customers.tier", "Customers_2.cust", "Customers_2.tier"]
        );
        assert_eq!(names.iter().collect::<HashSet<_>>().len(), names.len());
    }

    #[test]
    fn sources_are_not_mutated() {
        let (orders, customers) = (orders(), customers());
        let model = model(&orders, vec![JoinConfig::new(customers.id.to_owned(), "cust", "cust", JoinType::Left)]);
        let tables = [orders, customers];
        JoinEngine::execute(&tables, &model).unwrap();
        assert_eq!(tables[0].rows[0].len(), 3);
        assert_eq!(tables[0].columns.len(), 3);
    }

    #[test]
    fn prefixed_dimensions_are_appended() {
        let orders = table("Orders", json!([
            {"cust": "A", "channel": "web"},
            {"cust": "B", "channel": "shop"},
            {"cust": "A", "channel": "web"},
        ]));
        let customers = table("Customers", json!([
            {"cust": "A", "tier": "gold"},
            {"cust": "B", "tier": "silver"},
            {"cust": "C", "tier": "gold"},
        ]));
        let model = model(&orders, vec![JoinConfig::new(customers.id.to_owned(), "cust", "cust", JoinType::Left)]);
        let dataset = JoinEngine::execute(&[orders, customers], &model).unwrap();
        assert_eq!(dataset.dimensions, vec!["cust", "channel", "Customers.tier"]);
    }
}
