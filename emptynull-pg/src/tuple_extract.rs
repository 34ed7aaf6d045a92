//! Reading trigger tuples through the core [`TupleView`] interface.
//!
//! [`HeapTupleView`] pairs a heap tuple with its relation's tuple descriptor
//! and answers the questions the column scan asks: how many attributes,
//! what each is called, whether its base type is in the string category,
//! and how long a non-null string value is.

use std::ffi::CStr;

use pgrx::pg_sys;
use pgrx::PgTupleDesc;

use emptynull_core::{NullifyError, NullifyResult, TupleView, TypeCategory};

/// Extract a single datum value from a heap tuple at the specified attribute number.
///
/// # Arguments
/// * `tuple` - The heap tuple to extract from
/// * `tuple_desc` - The tuple descriptor for the relation
/// * `attnum` - The attribute number (1-based column index)
///
/// # Returns
/// * `Ok((datum, is_null))` - The datum value and null flag
/// * `Err(NullifyError)` - If the tuple or attribute number is invalid
///
/// # Safety
/// The tuple and tuple_desc must be valid and correspond to each other.
pub unsafe fn extract_datum(
    tuple: *mut pg_sys::HeapTupleData,
    tuple_desc: pg_sys::TupleDesc,
    attnum: usize,
) -> NullifyResult<(pg_sys::Datum, bool)> {
    if tuple.is_null() || tuple_desc.is_null() {
        return Err(NullifyError::Host {
            reason: "Cannot extract datum from null tuple or descriptor".to_string(),
        });
    }

    let natts = (*tuple_desc).natts as usize;
    if attnum < 1 || attnum > natts {
        return Err(NullifyError::Host {
            reason: format!(
                "Invalid attribute number {}: must be between 1 and {}",
                attnum, natts
            ),
        });
    }

    let mut is_null: bool = false;
    let datum = pg_sys::heap_getattr(tuple, attnum as i32, tuple_desc, &mut is_null);

    Ok((datum, is_null))
}

/// Category of a type after resolving domains to their base type.
pub fn base_type_category(typid: pg_sys::Oid) -> TypeCategory {
    let mut category: std::os::raw::c_char = 0;
    let mut preferred = false;

    unsafe {
        let base = pg_sys::getBaseType(typid);
        pg_sys::get_type_category_preferred(base, &mut category, &mut preferred);
    }

    TypeCategory::from_code(category as u8 as char)
}

/// Byte length of a string datum, excluding any varlena header.
///
/// `None` for by-value storage, which has no bytes to measure.
///
/// # Safety
/// `datum` must be a non-null value of an attribute with the given storage
/// length (`attlen`) and by-value flag.
pub unsafe fn string_datum_len(
    datum: pg_sys::Datum,
    attlen: i16,
    attbyval: bool,
) -> Option<usize> {
    if attbyval {
        return None;
    }

    match attlen {
        // varlena: text, varchar, bpchar and domains over them
        -1 => {
            let detoasted = pg_sys::pg_detoast_datum_packed(datum.cast_mut_ptr());
            Some(pgrx::varlena::varsize_any_exhdr(detoasted))
        }
        // cstring
        -2 => Some(
            CStr::from_ptr(datum.cast_mut_ptr::<std::os::raw::c_char>())
                .to_bytes()
                .len(),
        ),
        // fixed-length, NUL-padded (name); never read past attlen
        n if n > 0 => {
            let bytes = std::slice::from_raw_parts(datum.cast_mut_ptr::<u8>(), n as usize);
            Some(bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len()))
        }
        _ => None,
    }
}

/// A trigger tuple plus the descriptor needed to read it.
pub struct HeapTupleView<'a> {
    tuple: *mut pg_sys::HeapTupleData,
    tuple_desc: pg_sys::TupleDesc,
    desc: PgTupleDesc<'a>,
}

impl<'a> HeapTupleView<'a> {
    /// # Safety
    /// `tuple` must be a valid heap tuple formed with `tuple_desc`, and both
    /// must outlive the view.
    pub unsafe fn new(
        tuple: *mut pg_sys::HeapTupleData,
        tuple_desc: pg_sys::TupleDesc,
    ) -> NullifyResult<Self> {
        if tuple.is_null() || tuple_desc.is_null() {
            return Err(NullifyError::Host {
                reason: "trigger tuple or tuple descriptor is null".to_string(),
            });
        }

        Ok(Self {
            tuple,
            tuple_desc,
            desc: PgTupleDesc::from_pg_unchecked(tuple_desc),
        })
    }

    fn attribute(&self, attnum: usize) -> Option<&pg_sys::FormData_pg_attribute> {
        attnum
            .checked_sub(1)
            .and_then(|i| self.desc.get(i))
            .filter(|att| !att.is_dropped())
    }
}

impl TupleView for HeapTupleView<'_> {
    fn natts(&self) -> usize {
        self.desc.len()
    }

    fn column_name(&self, attnum: usize) -> String {
        self.attribute(attnum)
            .map(|att| att.name().to_string())
            .unwrap_or_default()
    }

    fn is_string_like(&self, attnum: usize) -> bool {
        self.attribute(attnum)
            .is_some_and(|att| base_type_category(att.atttypid).is_string_like())
    }

    fn text_len(&self, attnum: usize) -> NullifyResult<Option<usize>> {
        let Some(att) = self.attribute(attnum) else {
            return Ok(None);
        };

        let (datum, is_null) = unsafe { extract_datum(self.tuple, self.tuple_desc, attnum) }?;
        if is_null {
            return Ok(None);
        }
        Ok(unsafe { string_datum_len(datum, att.attlen, att.attbyval) })
    }
}
