//! emptynull-pg - PostgreSQL extension providing `replace_empty_string()`
//!
//! A BEFORE ROW trigger function that replaces empty strings with NULL in
//! every column whose base type is in the string category. Passing `'on'`
//! as the first trigger argument emits a WARNING per replaced column.
//!
//! ```sql
//! CREATE EXTENSION emptynull;
//!
//! CREATE TRIGGER people_empty_strings
//!     BEFORE INSERT OR UPDATE ON people
//!     FOR EACH ROW
//!     EXECUTE FUNCTION replace_empty_string('on');
//! ```
//!
//! Attaching it AFTER, FOR EACH STATEMENT, or to DELETE raises an ERROR
//! when it fires.

use pgrx::prelude::*;
use pgrx::{pg_sys, AllocatedByPostgres, PgTupleDesc};

use emptynull_core::{
    scan_empty_strings, InvocationError, NullifierConfig, NullifyError, NullifyResult,
    SubjectRow, TriggerEvent,
};

mod heap_ops;
mod tuple_extract;

use tuple_extract::HeapTupleView;

// Initialize pgrx extension
pgrx::pg_module_magic!();

/// Extension initialization hook.
/// Called when the extension library is loaded.
#[pg_guard]
pub extern "C" fn _PG_init() {
    pgrx::log!("emptynull extension loaded");
}

/// Extension version.
#[pg_extern]
fn emptynull_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TRIGGER
// ============================================================================

/// Replace empty strings with NULL in the row being inserted or updated.
///
/// Attachment errors are raised as a PostgreSQL ERROR carrying the
/// `replace_empty_string: ...` message.
#[pg_trigger]
fn replace_empty_string<'a>(
    trigger: &'a pgrx::PgTrigger<'a>,
) -> Result<Option<PgHeapTuple<'a, AllocatedByPostgres>>, NullifyError> {
    match nullify_trigger_tuple(trigger) {
        Ok((tuple_desc, tuple)) => Ok(Some(unsafe {
            PgHeapTuple::from_heap_tuple(PgTupleDesc::from_pg_unchecked(tuple_desc), tuple)
        })),
        Err(e) => pgrx::error!("{}", e),
    }
}

/// Scan the subject row and return it, or a copy with empty strings nulled.
fn nullify_trigger_tuple(
    trigger: &pgrx::PgTrigger<'_>,
) -> NullifyResult<(pg_sys::TupleDesc, *mut pg_sys::HeapTupleData)> {
    let trigger_data = trigger.trigger_data();
    if trigger_data.tg_relation.is_null() || trigger_data.tg_trigger.is_null() {
        return Err(InvocationError::NotCalledAsTrigger.into());
    }

    let subject = TriggerEvent::from_bits(trigger_data.tg_event)?.validate()?;
    let tuple = match subject {
        SubjectRow::Inserted => trigger_data.tg_trigtuple,
        SubjectRow::UpdatedNew => trigger_data.tg_newtuple,
    };

    let table = trigger.table_name().map_err(host_error)?;
    let args = trigger.extra_args().map_err(host_error)?;
    let config = NullifierConfig::from_trigger_args(&args);

    let tuple_desc = unsafe { (*trigger_data.tg_relation).rd_att };
    let view = unsafe { HeapTupleView::new(tuple, tuple_desc) }?;
    let report = scan_empty_strings(&view, &table, config)?;

    for warning in &report.warnings {
        pgrx::warning!("{}", warning);
    }

    if report.replacements.is_empty() {
        return Ok((tuple_desc, tuple));
    }
    let modified = unsafe { heap_ops::null_columns(tuple, tuple_desc, &report.replacements) }?;
    Ok((tuple_desc, modified))
}

fn host_error(e: impl std::fmt::Display) -> NullifyError {
    NullifyError::Host {
        reason: e.to_string(),
    }
}

// ============================================================================
// PGRX INTEGRATION TESTS
// ============================================================================

#[cfg(any(test, feature = "pg_test"))]
#[pg_schema]
mod tests {
    use pgrx::prelude::*;

    fn create_people(timing: &str, events: &str, level: &str, args: &str) {
        Spi::run(
            "CREATE TABLE people (id int4 PRIMARY KEY, name text, note varchar(20), age int4)",
        )
        .expect("create table");
        Spi::run(&format!(
            "CREATE TRIGGER people_empty {timing} {events} ON people \
             FOR EACH {level} EXECUTE FUNCTION replace_empty_string({args})"
        ))
        .expect("create trigger");
    }

    fn is_null(column: &str, id: i32) -> bool {
        Spi::get_one::<bool>(&format!("SELECT {column} IS NULL FROM people WHERE id = {id}"))
            .expect("select")
            .expect("row exists")
    }

    #[pg_test]
    fn test_emptynull_version() {
        assert!(!crate::emptynull_version().is_empty());
    }

    #[pg_test]
    fn test_insert_replaces_empty_strings() {
        create_people("BEFORE", "INSERT OR UPDATE", "ROW", "");
        Spi::run("INSERT INTO people VALUES (1, '', 'hello', 30)").expect("insert");

        assert!(is_null("name", 1));
        assert!(!is_null("note", 1));
        assert_eq!(
            Spi::get_one::<i32>("SELECT age FROM people WHERE id = 1").expect("select"),
            Some(30)
        );
    }

    #[pg_test]
    fn test_insert_with_warnings_on() {
        create_people("BEFORE", "INSERT OR UPDATE", "ROW", "'on'");
        Spi::run("INSERT INTO people VALUES (1, '', '', NULL)").expect("insert");

        assert!(is_null("name", 1));
        assert!(is_null("note", 1));
    }

    #[pg_test]
    fn test_update_replaces_new_version() {
        create_people("BEFORE", "INSERT OR UPDATE", "ROW", "");
        Spi::run("INSERT INTO people VALUES (2, 'x', 'y', 1)").expect("insert");
        Spi::run("UPDATE people SET note = '' WHERE id = 2").expect("update");

        assert!(!is_null("name", 2));
        assert!(is_null("note", 2));
    }

    #[pg_test]
    fn test_non_empty_and_null_untouched() {
        create_people("BEFORE", "INSERT", "ROW", "'on'");
        Spi::run("INSERT INTO people VALUES (3, NULL, ' ', 5)").expect("insert");

        assert!(is_null("name", 3));
        assert_eq!(
            Spi::get_one::<String>("SELECT note::text FROM people WHERE id = 3").expect("select"),
            Some(" ".to_string())
        );
    }

    #[pg_test]
    fn test_domain_over_text_replaced() {
        Spi::run("CREATE DOMAIN email AS text").expect("create domain");
        Spi::run("CREATE TABLE contacts (id int4, address email, tags text[])")
            .expect("create table");
        Spi::run(
            "CREATE TRIGGER contacts_empty BEFORE INSERT ON contacts \
             FOR EACH ROW EXECUTE FUNCTION replace_empty_string()",
        )
        .expect("create trigger");
        Spi::run("INSERT INTO contacts VALUES (1, '', '{}')").expect("insert");

        assert_eq!(
            Spi::get_one::<bool>("SELECT address IS NULL FROM contacts WHERE id = 1")
                .expect("select"),
            Some(true)
        );
        assert_eq!(
            Spi::get_one::<bool>("SELECT tags IS NULL FROM contacts WHERE id = 1")
                .expect("select"),
            Some(false)
        );
    }

    #[pg_test]
    fn test_fixed_length_name_column_replaced() {
        Spi::run("CREATE TABLE handles (id int4, handle name)").expect("create table");
        Spi::run(
            "CREATE TRIGGER handles_empty BEFORE INSERT ON handles \
             FOR EACH ROW EXECUTE FUNCTION replace_empty_string()",
        )
        .expect("create trigger");
        Spi::run("INSERT INTO handles VALUES (1, ''), (2, 'bob')").expect("insert");

        assert_eq!(
            Spi::get_one::<bool>("SELECT handle IS NULL FROM handles WHERE id = 1")
                .expect("select"),
            Some(true)
        );
        assert_eq!(
            Spi::get_one::<String>("SELECT handle::text FROM handles WHERE id = 2")
                .expect("select"),
            Some("bob".to_string())
        );
    }

    #[pg_test(error = "replace_empty_string: must be fired before event")]
    fn test_after_trigger_rejected() {
        create_people("AFTER", "INSERT", "ROW", "");
        Spi::run("INSERT INTO people VALUES (4, '', '', 1)").expect("insert");
    }

    #[pg_test(error = "replace_empty_string: must be fired for row")]
    fn test_statement_trigger_rejected() {
        create_people("BEFORE", "INSERT", "STATEMENT", "");
        Spi::run("INSERT INTO people VALUES (5, '', '', 1)").expect("insert");
    }

    #[pg_test(error = "replace_empty_string: cannot process DELETE events")]
    fn test_delete_trigger_rejected() {
        create_people("BEFORE", "DELETE", "ROW", "");
        Spi::run("INSERT INTO people VALUES (6, 'a', 'b', 1)").expect("insert");
        Spi::run("DELETE FROM people WHERE id = 6").expect("delete");
    }
}

/// This module is required by `cargo pgrx test` invocations.
/// It must be visible at the root of your extension crate.
#[cfg(any(test, feature = "pg_test"))]
pub mod pg_test {
    pub fn setup(_options: Vec<&str>) {
        // perform one-off initialization when the pg_test framework starts
    }

    #[must_use]
    pub fn postgresql_conf_options() -> Vec<&'static str> {
        // return any postgresql.conf settings that are required for your tests
        vec![]
    }
}
