//! Empty-string to NULL row transform.

use crate::{
    apply_overrides, check_row_width, scan_empty_strings, EmptyStringWarning, NullifierConfig,
    NullifyResult, Row, SchemaRowView, TableSchema, TriggerEvent, TypeCatalog,
};
use std::borrow::Cow;

/// Output of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Nullified<'r> {
    /// Borrowed when nothing was replaced, so callers can hand the original
    /// row back untouched.
    pub row: Cow<'r, Row>,
    pub warnings: Vec<EmptyStringWarning>,
}

impl Nullified<'_> {
    pub fn is_modified(&self) -> bool {
        matches!(self.row, Cow::Owned(_))
    }
}

/// Row trigger that replaces empty strings in string-typed columns with null.
#[derive(Debug, Clone, Default)]
pub struct EmptyStringNullifier<C: TypeCatalog> {
    catalog: C,
}

impl<C: TypeCatalog> EmptyStringNullifier<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Process one row mutation.
    ///
    /// `row` is the subject row the host picked for the event: the new row
    /// for INSERT, the proposed new version for UPDATE. Attachment errors
    /// come back as [`NullifyError::Invocation`](crate::NullifyError) before
    /// the row is looked at; a row whose width differs from the schema is a
    /// `NullifyError::Shape`.
    pub fn process<'r, S: AsRef<str>>(
        &self,
        event: TriggerEvent,
        schema: &TableSchema,
        row: &'r Row,
        args: &[S],
    ) -> NullifyResult<Nullified<'r>> {
        event.validate()?;

        check_row_width(row, schema)?;

        let config = NullifierConfig::from_trigger_args(args);
        let view = SchemaRowView::new(schema, row, &self.catalog);
        let report = scan_empty_strings(&view, &schema.name, config)?;

        for warning in &report.warnings {
            tracing::warn!(column = %warning.column, table = %warning.table, "{}", warning);
        }
        tracing::debug!(
            table = %schema.name,
            operation = %event.operation,
            replaced = report.replacements.len(),
            "empty string scan complete"
        );

        let row = if report.replacements.is_empty() {
            Cow::Borrowed(row)
        } else {
            Cow::Owned(apply_overrides(row, schema, &report.replacements)?)
        };

        Ok(Nullified {
            row,
            warnings: report.warnings,
        })
    }

    /// Same as [`process`](Self::process), decoding a packed host event word first.
    pub fn process_raw<'r, S: AsRef<str>>(
        &self,
        event_bits: u32,
        schema: &TableSchema,
        row: &'r Row,
        args: &[S],
    ) -> NullifyResult<Nullified<'r>> {
        let event = TriggerEvent::from_bits(event_bits)?;
        self.process(event, schema, row, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EVENT_BEFORE, EVENT_DELETE, EVENT_ROW, EVENT_UPDATE};
    use crate::{
        BuiltinTypeCatalog, ColumnDescriptor, InvocationError, ItemPointer, NullifyError,
        RowIdentity, TriggerLevel, TriggerOperation, TriggerTiming, Value,
    };

    const NO_ARGS: [&str; 0] = [];

    fn schema() -> TableSchema {
        TableSchema::new(
            "people",
            vec![
                ColumnDescriptor::new("id", "int4"),
                ColumnDescriptor::new("name", "text"),
                ColumnDescriptor::new("email", "email"),
            ],
        )
    }

    fn nullifier() -> EmptyStringNullifier<BuiltinTypeCatalog> {
        EmptyStringNullifier::new(BuiltinTypeCatalog::new().with_domain("email", "text"))
    }

    #[test]
    fn test_unmodified_row_is_borrowed() {
        let row = Row::new(vec![Value::Int(1), Value::from("a"), Value::Null]);
        let out = nullifier()
            .process(TriggerEvent::before_row_insert(), &schema(), &row, &["on"])
            .unwrap();
        assert!(!out.is_modified());
        assert!(std::ptr::eq(&*out.row, &row));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_domain_over_text_is_replaced() {
        let identity = RowIdentity {
            tid: Some(ItemPointer { block: 4, offset: 2 }),
            oid: Some(77),
        };
        let row = Row::new(vec![Value::Int(1), Value::from("a"), Value::from("")])
            .with_identity(identity);
        let out = nullifier()
            .process(TriggerEvent::before_row_update(), &schema(), &row, &["on"])
            .unwrap();
        assert!(out.is_modified());
        assert_eq!(out.row.values[2], Value::Null);
        assert_eq!(out.row.identity, identity);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].column, "email");
    }

    #[test]
    fn test_precondition_failure_produces_no_row() {
        let row = Row::new(vec![Value::Int(1), Value::from(""), Value::from("")]);
        let event = TriggerEvent::new(
            TriggerOperation::Insert,
            TriggerTiming::After,
            TriggerLevel::Row,
        );
        let err = nullifier().process(event, &schema(), &row, &NO_ARGS).unwrap_err();
        assert_eq!(err, NullifyError::Invocation(InvocationError::NotBefore));
    }

    #[test]
    fn test_process_raw_decodes_event() {
        let row = Row::new(vec![Value::Int(1), Value::from(""), Value::Null]);
        let out = nullifier()
            .process_raw(EVENT_UPDATE | EVENT_ROW | EVENT_BEFORE, &schema(), &row, &NO_ARGS)
            .unwrap();
        assert_eq!(out.row.values[1], Value::Null);

        let err = nullifier()
            .process_raw(EVENT_DELETE | EVENT_ROW | EVENT_BEFORE, &schema(), &row, &NO_ARGS)
            .unwrap_err();
        assert_eq!(err, NullifyError::Invocation(InvocationError::DeleteNotSupported));
    }

    #[test]
    fn test_row_width_mismatch() {
        let row = Row::new(vec![Value::Int(1)]);
        let err = nullifier()
            .process(TriggerEvent::before_row_insert(), &schema(), &row, &NO_ARGS)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Row shape mismatch: row has 1 values, table \"people\" has 3 columns"
        );
    }
}
