//! Nested-loop equi-join.

use compile::ast::{ColumnRef, JoinSpec};
use ty::{Row, Value};

/// Joins `left` (rows of `from_table`) with `right` (rows of the joined
/// table) on equality of the two referenced columns.
///
/// The reference naming the joined table reads from `right`; if neither names
/// it, the references are used as written. `Null` or missing values never
/// match. Every output row carries the left keys prefixed with
/// `<from_table>.` followed by the right keys prefixed with `<join table>.`.
pub fn equi_join(from_table: &str, left: &[Row], join: &JoinSpec, right: &[Row]) -> Vec<Row> {
    let (left_ref, right_ref) = sides(join);

    let mut joined = Vec::new();
    for left_row in left {
        let Some(left_value) = join_value(left_row, left_ref) else {
            continue;
        };
        for right_row in right {
            let matched = join_value(right_row, right_ref)
                .map_or(false, |right_value| left_value.loosely_eq(right_value));
            if matched {
                joined.push(merge(from_table, left_row, &join.table, right_row));
            }
        }
    }
    joined
}

fn sides(join: &JoinSpec) -> (&ColumnRef, &ColumnRef) {
    if join.left.table == join.table && join.right.table != join.table {
        (&join.right, &join.left)
    } else {
        (&join.left, &join.right)
    }
}

fn join_value<'a>(row: &'a Row, column: &ColumnRef) -> Option<&'a Value> {
    row.get(&column.column).filter(|value| !value.is_null())
}

fn merge(left_table: &str, left: &Row, right_table: &str, right: &Row) -> Row {
    let mut row = Row::with_capacity(left.len() + right.len());
    for (key, value) in left.iter() {
        row.insert(format!("{}.{}", left_table, key), value.clone());
    }
    for (key, value) in right.iter() {
        row.insert(format!("{}.{}", right_table, key), value.clone());
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;

    fn row(fields: &[(&str, Value)]) -> Row {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn column(table: &str, column: &str) -> ColumnRef {
        ColumnRef {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    fn users_orders(left: ColumnRef, right: ColumnRef) -> JoinSpec {
        JoinSpec {
            table: "orders".to_string(),
            left,
            right,
        }
    }

    fn users() -> Vec<Row> {
        vec![
            row(&[("id", Value::Integer(1)), ("name", Value::Text("John".into()))]),
            row(&[("id", Value::Integer(2)), ("name", Value::Text("Jane".into()))]),
            row(&[("name", Value::Text("Nobody".into()))]),
        ]
    }

    fn orders() -> Vec<Row> {
        vec![
            row(&[("user_id", Value::Integer(1)), ("total", Value::Float(9.5))]),
            row(&[("user_id", Value::Null), ("total", Value::Integer(3))]),
        ]
    }

    #[test]
    fn test_matching_rows_are_prefixed() {
        let join = users_orders(column("users", "id"), column("orders", "user_id"));
        let joined = equi_join("users", &users(), &join, &orders());

        assert_eq!(
            joined,
            vec![row(&[
                ("users.id", Value::Integer(1)),
                ("users.name", Value::Text("John".into())),
                ("orders.user_id", Value::Integer(1)),
                ("orders.total", Value::Float(9.5)),
            ])]
        );
    }

    #[test]
    fn test_references_may_be_written_backwards() {
        let join = users_orders(column("orders", "user_id"), column("users", "id"));
        let joined = equi_join("users", &users(), &join, &orders());
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].get("users.name"), Some(&Value::Text("John".into())));
    }

    #[test]
    fn test_nulls_and_missing_values_never_match() {
        let join = users_orders(column("users", "missing"), column("orders", "missing"));
        assert!(equi_join("users", &users(), &join, &orders()).is_empty());
    }

    #[test]
    fn test_numeric_match_across_kinds() {
        let left = vec![row(&[("id", Value::Integer(7))])];
        let right = vec![row(&[("user_id", Value::Float(7.0))])];
        let join = users_orders(column("users", "id"), column("orders", "user_id"));
        assert_eq!(equi_join("users", &left, &join, &right).len(), 1);
    }
}
