//! emptynull core - host-independent empty-string to NULL transform
//!
//! A before-row trigger scans every string-typed column of the row being
//! inserted or updated and replaces empty strings with NULL, optionally
//! warning once per replaced column. This crate holds the transform and the
//! narrow types a host passes across the invocation boundary; the
//! PostgreSQL binding lives in `emptynull-pg`.
//!
//! ```
//! use emptynull_core::{
//!     BuiltinTypeCatalog, ColumnDescriptor, EmptyStringNullifier, Row, TableSchema,
//!     TriggerEvent, Value,
//! };
//!
//! let schema = TableSchema::new(
//!     "people",
//!     vec![ColumnDescriptor::new("id", "int4"), ColumnDescriptor::new("name", "text")],
//! );
//! let row = Row::new(vec![Value::Int(1), Value::from("")]);
//!
//! let nullifier = EmptyStringNullifier::new(BuiltinTypeCatalog::new());
//! let out = nullifier
//!     .process(TriggerEvent::before_row_insert(), &schema, &row, &["on"])
//!     .unwrap();
//!
//! assert_eq!(out.row.values, vec![Value::Int(1), Value::Null]);
//! assert_eq!(out.warnings.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod nullifier;
pub mod overrides;
pub mod scan;
pub mod schema;
pub mod value;

pub use config::{NullifierConfig, WARN_ARGUMENT};
pub use error::{InvocationError, NullifyError, NullifyResult};
pub use event::{SubjectRow, TriggerEvent, TriggerLevel, TriggerOperation, TriggerTiming};
pub use nullifier::{EmptyStringNullifier, Nullified};
pub use overrides::{apply_overrides, check_row_width, ReplacementSet};
pub use scan::{scan_empty_strings, EmptyStringWarning, SchemaRowView, ScanReport, TupleView};
pub use schema::{
    BuiltinTypeCatalog, ColumnDescriptor, ColumnType, TableSchema, TypeCatalog, TypeCategory,
};
pub use value::{ItemPointer, Row, RowIdentity, Value};
