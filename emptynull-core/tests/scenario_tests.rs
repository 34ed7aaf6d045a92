//! End-to-end scenarios over the `people` table.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use emptynull_core::{InvocationError, TriggerEvent, Value};
use emptynull_test_utils::assertions::{assert_invocation_error, assert_nulled_only};
use emptynull_test_utils::fixtures::{nullifier, people_row, people_schema};
use emptynull_test_utils::{TriggerLevel, TriggerOperation, TriggerTiming};
use tracing_subscriber::fmt::MakeWriter;

const NO_ARGS: [&str; 0] = [];

#[test]
fn test_empty_name_replaced_with_warning() {
    let row = people_row(1, Some(""), Some("hello"));
    let out = nullifier()
        .process(TriggerEvent::before_row_insert(), &people_schema(), &row, &["on"])
        .unwrap();

    assert_eq!(out.row.values, vec![Value::Int(1), Value::Null, Value::from("hello")]);
    assert_nulled_only(&row, &out, &[2]);
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].column, "name");
    assert_eq!(
        out.warnings[0].to_string(),
        "Field \"name\" of table \"people\" is empty string (replaced by NULL)."
    );
}

#[test]
fn test_empty_note_replaced_silently_without_args() {
    let row = people_row(2, Some("x"), Some(""));
    let out = nullifier()
        .process(TriggerEvent::before_row_insert(), &people_schema(), &row, &NO_ARGS)
        .unwrap();

    assert_eq!(out.row.values, vec![Value::Int(2), Value::from("x"), Value::Null]);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_null_name_left_alone() {
    let row = people_row(3, None, Some("y"));
    let out = nullifier()
        .process(TriggerEvent::before_row_insert(), &people_schema(), &row, &["on"])
        .unwrap();

    assert!(!out.is_modified());
    assert!(std::ptr::eq(&*out.row, &row));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_update_uses_new_version() {
    let new_version = people_row(4, Some(""), Some(""));
    let out = nullifier()
        .process(TriggerEvent::before_row_update(), &people_schema(), &new_version, &["on", "ignored"])
        .unwrap();

    assert_nulled_only(&new_version, &out, &[2, 3]);
    let columns: Vec<_> = out.warnings.iter().map(|w| w.column.as_str()).collect();
    assert_eq!(columns, vec!["name", "note"]);
}

#[test]
fn test_uppercase_on_does_not_warn() {
    let row = people_row(5, Some(""), None);
    let out = nullifier()
        .process(TriggerEvent::before_row_insert(), &people_schema(), &row, &["ON"])
        .unwrap();
    assert!(out.is_modified());
    assert!(out.warnings.is_empty());
}

#[test]
fn test_delete_rejected() {
    let row = people_row(6, Some(""), None);
    let event = TriggerEvent::new(TriggerOperation::Delete, TriggerTiming::Before, TriggerLevel::Row);
    let result = nullifier().process(event, &people_schema(), &row, &NO_ARGS);
    assert_invocation_error(&result, InvocationError::DeleteNotSupported);
}

#[test]
fn test_after_trigger_rejected() {
    let row = people_row(7, Some(""), None);
    let event = TriggerEvent::new(TriggerOperation::Update, TriggerTiming::After, TriggerLevel::Row);
    let result = nullifier().process(event, &people_schema(), &row, &NO_ARGS);
    assert_invocation_error(&result, InvocationError::NotBefore);
}

#[test]
fn test_statement_trigger_rejected() {
    let row = people_row(8, Some(""), None);
    let event = TriggerEvent::new(
        TriggerOperation::Insert,
        TriggerTiming::Before,
        TriggerLevel::Statement,
    );
    let result = nullifier().process(event, &people_schema(), &row, &NO_ARGS);
    assert_invocation_error(&result, InvocationError::NotRowLevel);
}

/// In-memory sink for formatted tracing output.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_warnings_reach_tracing_subscriber() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let row = people_row(9, Some(""), Some(""));
        let out = nullifier()
            .process(TriggerEvent::before_row_insert(), &people_schema(), &row, &["on"])
            .unwrap();
        assert_eq!(out.warnings.len(), 2);
    });

    let output = logs.contents();
    let warn_lines: Vec<_> = output.lines().filter(|l| l.contains("WARN")).collect();
    assert_eq!(warn_lines.len(), 2, "log output:\n{output}");
    assert!(warn_lines[0].contains(
        "Field \"name\" of table \"people\" is empty string (replaced by NULL)."
    ));
    assert!(warn_lines[0].contains("column=name"));
    assert!(warn_lines[1].contains("column=note"));
    assert!(warn_lines.iter().all(|l| l.contains("table=people")));
}

#[test]
fn test_no_warn_events_without_on_argument() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let row = people_row(10, Some(""), None);
        nullifier()
            .process(TriggerEvent::before_row_insert(), &people_schema(), &row, &NO_ARGS)
            .unwrap();
    });

    assert!(!logs.contents().contains("WARN"));
}
