//! The column scan.
//!
//! [`scan_empty_strings`] walks a row through a [`TupleView`], so the same
//! loop runs over in-process [`Row`]s and over host tuples.

use crate::{NullifierConfig, NullifyResult, ReplacementSet, Row, TableSchema, TypeCatalog};
use std::fmt;

/// Read-only view of one row and its column metadata.
///
/// Attribute numbers are 1-based and range over `1..=natts()`.
pub trait TupleView {
    fn natts(&self) -> usize;

    fn column_name(&self, attnum: usize) -> String;

    /// Whether the column's base type is in the string category.
    fn is_string_like(&self, attnum: usize) -> bool;

    /// Length in bytes of a non-null string value, `None` when null or not
    /// measurable as a string. Errors come from the host, never from data.
    fn text_len(&self, attnum: usize) -> NullifyResult<Option<usize>>;
}

/// [`TupleView`] over an in-process schema and row.
pub struct SchemaRowView<'a, C: TypeCatalog> {
    schema: &'a TableSchema,
    row: &'a Row,
    catalog: C,
}

impl<'a, C: TypeCatalog> SchemaRowView<'a, C> {
    pub fn new(schema: &'a TableSchema, row: &'a Row, catalog: C) -> Self {
        Self {
            schema,
            row,
            catalog,
        }
    }
}

impl<C: TypeCatalog> TupleView for SchemaRowView<'_, C> {
    fn natts(&self) -> usize {
        self.schema.natts()
    }

    fn column_name(&self, attnum: usize) -> String {
        self.schema
            .column(attnum)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    fn is_string_like(&self, attnum: usize) -> bool {
        self.schema
            .column(attnum)
            .is_some_and(|c| self.catalog.is_string_like(&c.column_type))
    }

    fn text_len(&self, attnum: usize) -> NullifyResult<Option<usize>> {
        Ok(self.row.get(attnum).and_then(|v| v.text_len()))
    }
}

/// Notice that a column's empty string was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyStringWarning {
    pub column: String,
    pub table: String,
}

impl fmt::Display for EmptyStringWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Field \"{}\" of table \"{}\" is empty string (replaced by NULL).",
            self.column, self.table
        )
    }
}

/// Result of scanning one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub replacements: ReplacementSet,
    pub warnings: Vec<EmptyStringWarning>,
}

/// Select every string-like column holding a non-null empty string.
pub fn scan_empty_strings<V: TupleView + ?Sized>(
    view: &V,
    table: &str,
    config: NullifierConfig,
) -> NullifyResult<ScanReport> {
    let mut report = ScanReport::default();

    for attnum in 1..=view.natts() {
        if !view.is_string_like(attnum) {
            continue;
        }
        if view.text_len(attnum)? != Some(0) {
            continue;
        }
        if report.replacements.insert(attnum) && config.warn_on_replace {
            report.warnings.push(EmptyStringWarning {
                column: view.column_name(attnum),
                table: table.to_string(),
            });
        }
    }

    Ok(report)
}
