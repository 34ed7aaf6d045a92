//! emptynull Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Proptest generators for values, schemas, rows, events and trigger args
//! - Fixtures for the common `people` table scenarios
//! - Assertions over transform results

pub use emptynull_core::{
    BuiltinTypeCatalog, ColumnDescriptor, ColumnType, EmptyStringNullifier, InvocationError,
    ItemPointer, Nullified, NullifyError, NullifyResult, Row, RowIdentity, TableSchema,
    TriggerEvent, TriggerLevel, TriggerOperation, TriggerTiming, TypeCatalog, TypeCategory,
    Value,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for rows, schemas and invocation inputs.

    use super::*;
    use proptest::prelude::*;

    /// Declared type names understood by [`fixtures::test_catalog`], string-like ones first.
    pub const STRING_TYPES: &[&str] = &["text", "varchar", "bpchar", "name", "email"];
    pub const OTHER_TYPES: &[&str] = &["int4", "int8", "bool", "jsonb", "bytea", "text[]", "work_email"];

    /// Generate a declared column type, string-like or not.
    pub fn arb_column_type() -> impl Strategy<Value = ColumnType> {
        prop_oneof![
            prop::sample::select(STRING_TYPES).prop_map(ColumnType::new),
            prop::sample::select(OTHER_TYPES).prop_map(ColumnType::new),
        ]
    }

    /// Generate a short string, empty about a third of the time.
    pub fn arb_text() -> impl Strategy<Value = String> {
        prop_oneof![Just(String::new()), "[a-z ]{1,8}", "\\PC{0,4}"]
    }

    /// Generate any column value.
    pub fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            (-1.0e6f64..1.0e6).prop_map(Value::Float),
            arb_text().prop_map(Value::Text),
            prop::collection::vec(any::<u8>(), 0..8).prop_map(Value::Bytes),
        ]
    }

    pub fn arb_identity() -> impl Strategy<Value = RowIdentity> {
        (
            prop::option::of((any::<u32>(), any::<u16>())),
            prop::option::of(any::<u32>()),
        )
            .prop_map(|(tid, oid)| RowIdentity {
                tid: tid.map(|(block, offset)| ItemPointer { block, offset }),
                oid,
            })
    }

    /// Generate a schema and a row of matching width.
    pub fn arb_schema_and_row() -> impl Strategy<Value = (TableSchema, Row)> {
        (
            prop::collection::vec((arb_column_type(), arb_value()), 0..12),
            arb_identity(),
        )
            .prop_map(|(columns, identity)| {
                let (descriptors, values): (Vec<_>, Vec<_>) = columns
                    .into_iter()
                    .enumerate()
                    .map(|(i, (ty, value))| (ColumnDescriptor::new(format!("c{}", i + 1), ty), value))
                    .unzip();
                (
                    TableSchema::new("generated", descriptors),
                    Row::new(values).with_identity(identity),
                )
            })
    }

    /// Generate a trigger argument list.
    pub fn arb_trigger_args() -> impl Strategy<Value = Vec<String>> {
        prop_oneof![
            Just(vec![]),
            Just(vec!["on".to_string()]),
            prop::collection::vec(
                prop_oneof![Just("on".to_string()), Just("ON".to_string()), "[a-zA-Z]{0,4}"],
                1..4,
            ),
        ]
    }

    /// Generate any trigger event, valid or not.
    pub fn arb_event() -> impl Strategy<Value = TriggerEvent> {
        (
            prop_oneof![
                Just(TriggerOperation::Insert),
                Just(TriggerOperation::Update),
                Just(TriggerOperation::Delete),
                Just(TriggerOperation::Truncate),
            ],
            prop_oneof![
                Just(TriggerTiming::Before),
                Just(TriggerTiming::After),
                Just(TriggerTiming::InsteadOf),
            ],
            prop_oneof![Just(TriggerLevel::Row), Just(TriggerLevel::Statement)],
        )
            .prop_map(|(operation, timing, level)| TriggerEvent::new(operation, timing, level))
    }

    /// Generate a BEFORE ROW INSERT or UPDATE event.
    pub fn arb_valid_event() -> impl Strategy<Value = TriggerEvent> {
        prop_oneof![
            Just(TriggerEvent::before_row_insert()),
            Just(TriggerEvent::before_row_update()),
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common scenarios.

    use super::*;

    /// Built-in catalog plus `email` (domain over text) and `work_email`
    /// (domain over `email`).
    pub fn test_catalog() -> BuiltinTypeCatalog {
        BuiltinTypeCatalog::new()
            .with_domain("email", "text")
            .with_domain("work_email", "email")
    }

    pub fn nullifier() -> EmptyStringNullifier<BuiltinTypeCatalog> {
        EmptyStringNullifier::new(test_catalog())
    }

    /// `people (id int4, name text, note text)`.
    pub fn people_schema() -> TableSchema {
        TableSchema::new(
            "people",
            vec![
                ColumnDescriptor::new("id", "int4"),
                ColumnDescriptor::new("name", "text"),
                ColumnDescriptor::new("note", "text"),
            ],
        )
    }

    pub fn people_row(id: i64, name: Option<&str>, note: Option<&str>) -> Row {
        Row::new(vec![Value::Int(id), Value::from(name), Value::from(note)])
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over transform results.

    use super::*;

    /// Assert that an invocation failed with the given attachment error.
    #[track_caller]
    pub fn assert_invocation_error<T: std::fmt::Debug>(
        result: &NullifyResult<T>,
        expected: InvocationError,
    ) {
        match result {
            Err(NullifyError::Invocation(err)) => assert_eq!(*err, expected),
            other => panic!("Expected invocation error {:?}, got: {:?}", expected, other),
        }
    }

    /// Assert that the output row differs from `input` only by nulls at `positions`.
    #[track_caller]
    pub fn assert_nulled_only(input: &Row, output: &Nullified<'_>, positions: &[usize]) {
        assert_eq!(output.row.identity, input.identity, "row identity changed");
        assert_eq!(output.row.len(), input.len(), "row width changed");
        for (i, (before, after)) in input.values.iter().zip(&output.row.values).enumerate() {
            if positions.contains(&(i + 1)) {
                assert_eq!(*after, Value::Null, "column {} should be null", i + 1);
            } else {
                assert_eq!(after, before, "column {} should be unchanged", i + 1);
            }
        }
    }
}
