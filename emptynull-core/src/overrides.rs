//! Sparse column overrides and the row rewrite that applies them.

use crate::{NullifyError, NullifyResult, Row, TableSchema, Value};
use std::collections::BTreeSet;

/// Columns selected for nulling, by 1-based attribute number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementSet {
    columns: BTreeSet<usize>,
}

impl ReplacementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a column. Returns false if it was already recorded.
    pub fn insert(&mut self, attnum: usize) -> bool {
        self.columns.insert(attnum)
    }

    pub fn contains(&self, attnum: usize) -> bool {
        self.columns.contains(&attnum)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Attribute numbers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.iter().copied()
    }

    /// Parallel column-number and null-flag arrays for a host tuple rewrite.
    pub fn to_column_arrays(&self) -> (Vec<i32>, Vec<bool>) {
        let columns = self.iter().map(|attnum| attnum as i32).collect::<Vec<_>>();
        let nulls = vec![true; columns.len()];
        (columns, nulls)
    }
}

impl FromIterator<usize> for ReplacementSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Fail unless the row has exactly one value per schema column.
pub fn check_row_width(row: &Row, schema: &TableSchema) -> NullifyResult<()> {
    if row.len() != schema.natts() {
        return Err(NullifyError::Shape {
            reason: format!(
                "row has {} values, table \"{}\" has {} columns",
                row.len(),
                schema.name,
                schema.natts()
            ),
        });
    }
    Ok(())
}

/// Build a new row with every recorded column set to null.
///
/// The identity and all other values are copied unchanged.
pub fn apply_overrides(
    row: &Row,
    schema: &TableSchema,
    overrides: &ReplacementSet,
) -> NullifyResult<Row> {
    check_row_width(row, schema)?;
    let natts = schema.natts();

    if let Some(bad) = overrides.iter().find(|&attnum| attnum == 0 || attnum > natts) {
        return Err(NullifyError::Shape {
            reason: format!("attribute number {} outside 1..={}", bad, natts),
        });
    }

    let values = row
        .values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            if overrides.contains(i + 1) {
                Value::Null
            } else {
                value.clone()
            }
        })
        .collect();

    Ok(Row {
        identity: row.identity,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnDescriptor, ItemPointer, RowIdentity};

    fn schema() -> TableSchema {
        TableSchema::new(
            "people",
            vec![
                ColumnDescriptor::new("id", "int4"),
                ColumnDescriptor::new("name", "text"),
                ColumnDescriptor::new("note", "text"),
            ],
        )
    }

    #[test]
    fn test_insert_is_position_unique() {
        let mut set = ReplacementSet::new();
        assert!(set.insert(3));
        assert!(set.insert(1));
        assert!(!set.insert(3));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_column_arrays() {
        let set: ReplacementSet = [2, 5].into_iter().collect();
        let (columns, nulls) = set.to_column_arrays();
        assert_eq!(columns, vec![2, 5]);
        assert_eq!(nulls, vec![true, true]);
    }

    #[test]
    fn test_apply_overrides_nulls_selected_positions() {
        let identity = RowIdentity {
            tid: Some(ItemPointer { block: 1, offset: 9 }),
            oid: None,
        };
        let row = Row::new(vec![Value::Int(1), Value::from(""), Value::from("hello")])
            .with_identity(identity);
        let set: ReplacementSet = [2].into_iter().collect();

        let out = apply_overrides(&row, &schema(), &set).unwrap();
        assert_eq!(out.values, vec![Value::Int(1), Value::Null, Value::from("hello")]);
        assert_eq!(out.identity, identity);
    }

    #[test]
    fn test_apply_empty_overrides_copies_row() {
        let row = Row::new(vec![Value::Int(1), Value::from("a"), Value::Null]);
        let out = apply_overrides(&row, &schema(), &ReplacementSet::new()).unwrap();
        assert_eq!(out, row);
    }

    #[test]
    fn test_width_mismatch_is_shape_error() {
        let row = Row::new(vec![Value::Int(1)]);
        let err = apply_overrides(&row, &schema(), &ReplacementSet::new()).unwrap_err();
        assert!(matches!(err, NullifyError::Shape { .. }));
    }

    #[test]
    fn test_check_row_width_message() {
        let row = Row::new(vec![Value::Int(1), Value::Null]);
        assert_eq!(check_row_width(&Row::new(vec![Value::Null; 3]), &schema()), Ok(()));
        assert_eq!(
            check_row_width(&row, &schema()),
            Err(NullifyError::Shape {
                reason: "row has 2 values, table \"people\" has 3 columns".to_string()
            })
        );
    }

    #[test]
    fn test_out_of_range_position_is_shape_error() {
        let row = Row::new(vec![Value::Int(1), Value::from(""), Value::from("")]);
        for bad in [0, 4] {
            let set: ReplacementSet = [bad].into_iter().collect();
            assert!(matches!(
                apply_overrides(&row, &schema(), &set),
                Err(NullifyError::Shape { .. })
            ));
        }
    }
}
