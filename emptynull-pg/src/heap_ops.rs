//! Heap tuple rewrite helpers.
//!
//! # Safety
//!
//! The functions here wrap PostgreSQL C functions. Callers must pass a tuple
//! formed with the given tuple descriptor. Returned tuples are allocated in
//! the current memory context and are freed with it.

use pgrx::pg_sys;

use emptynull_core::{NullifyError, NullifyResult, ReplacementSet};

/// Build a copy of `tuple` with every column in `replacements` set to NULL.
///
/// `heap_modify_tuple_by_cols` copies `t_self`, `t_tableOid` and the header
/// identity fields from the source tuple, so the result stands in for the
/// original row.
///
/// # Safety
/// `tuple` and `tuple_desc` must be valid and correspond to each other.
pub unsafe fn null_columns(
    tuple: *mut pg_sys::HeapTupleData,
    tuple_desc: pg_sys::TupleDesc,
    replacements: &ReplacementSet,
) -> NullifyResult<*mut pg_sys::HeapTupleData> {
    let natts = (*tuple_desc).natts as usize;
    if let Some(bad) = replacements.iter().find(|&attnum| attnum == 0 || attnum > natts) {
        return Err(NullifyError::Shape {
            reason: format!("attribute number {} outside 1..={}", bad, natts),
        });
    }

    let (mut columns, mut nulls) = replacements.to_column_arrays();
    let mut values = vec![pg_sys::Datum::from(0usize); columns.len()];

    let modified = pg_sys::heap_modify_tuple_by_cols(
        tuple,
        tuple_desc,
        columns.len() as i32,
        columns.as_mut_ptr(),
        values.as_mut_ptr(),
        nulls.as_mut_ptr(),
    );

    if modified.is_null() {
        return Err(NullifyError::Host {
            reason: "heap_modify_tuple_by_cols returned NULL".to_string(),
        });
    }

    Ok(modified)
}
