//! Column and table name utilities used by the join heuristics.
//! All comparisons are ASCII case-insensitive, matching how sheet headers are typed by hand.

/// Separator between a joined table's name and its column name.
pub(crate) const PREFIX_SEPARATOR: char = '.';

/// Returns the lower-cased form of a name used for heuristic comparisons.
#[inline]
pub(crate) fn normalize(name: &str) -> String {
    name.to_lowercase()
}

/// Checks two names for equality ignoring case.
#[inline]
pub(crate) fn same_name(left: &str, right: &str) -> bool {
    normalize(left) == normalize(right)
}

/// Naive singular form: drops the last character ("customers" -> "customer").
/// Names of one character or less are returned unchanged.
pub(crate) fn singular(name: &str) -> String {
    let mut chars = name.chars();
    if chars.clone().count() > 1 {
        chars.next_back();
        chars.as_str().to_owned()
    } else {
        name.to_owned()
    }
}

/// Foreign-key column name conventionally pointing at a table (`orders` -> `order_id`).
pub(crate) fn foreign_key_name(table_name: &str) -> String {
    format!("{}_id", singular(&normalize(table_name)))
}

/// Candidate key column names on the table itself: `id`, `<table>_id`, `<singular>_id`.
pub(crate) fn key_column_names(table_name: &str) -> [String; 3] {
    let table_name = normalize(table_name);
    [
        "id".to_owned(),
        format!("{table_name}_id"),
        foreign_key_name(&table_name),
    ]
}

/// Builds the qualified column name `<table>.<column>`.
#[inline]
pub(crate) fn prefixed(table_name: &str, column: &str) -> String {
    format!("{table_name}{PREFIX_SEPARATOR}{column}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_strips_last_char() {
        assert_eq!(singular("customers"), "customer");
        assert_eq!(singular("s"), "s");
        assert_eq!(singular(""), "");
        assert_eq!(singular("cafés"), "café");
    }

    #[test]
    fn key_names_follow_convention() {
        assert_eq!(foreign_key_name("Customers"), "customer_id");
        assert_eq!(
            key_column_names("Customers"),
            ["id".to_owned(), "customers_id".to_owned(), "customer_id".to_owned()]
        );
    }

    #[test]
    fn same_name_ignores_case() {
        assert!(same_name("Customer_ID", "customer_id"));
        assert!(!same_name("customer", "customer_id"));
        assert!(!same_name(" id", "id"));
        assert_eq!(prefixed("Customers", "tier"), "Customers.tier");
    }
}
