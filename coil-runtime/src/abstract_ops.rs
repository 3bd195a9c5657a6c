//! Generic dispatch - type-independent entry points for object operations
//!
//! Every helper checks the relevant slot or capability first and signals a
//! type error when the operand's type does not provide it.

use std::cmp::Ordering;
use std::io;
use std::ptr;

use crate::errors::{RuntimeError, RuntimeResult};
use crate::logging::log_dispatch_error;
use crate::object::ObjRef;
use crate::types::{MappingMethods, NumberMethods, PrintMode, SequenceMethods};

fn missing(operation: &'static str, obj: &ObjRef) -> RuntimeError {
    log_dispatch_error(operation, obj.type_of().name);
    RuntimeError::unsupported(operation, obj)
}

pub fn get_attr(obj: &ObjRef, name: &str) -> RuntimeResult<ObjRef> {
    match obj.type_of().get_attr {
        Some(get_attr) => get_attr(obj, name),
        None => Err(missing("attribute lookup", obj)),
    }
}

/// Set an attribute; `None` deletes it
pub fn set_attr(obj: &ObjRef, name: &str, value: Option<ObjRef>) -> RuntimeResult<()> {
    match obj.type_of().set_attr {
        Some(set_attr) => set_attr(obj, name, value),
        None => Err(missing("attribute assignment", obj)),
    }
}

/// Three-way comparison
///
/// An object always equals itself. Objects of different types are not
/// comparable.
pub fn compare(a: &ObjRef, b: &ObjRef) -> RuntimeResult<Ordering> {
    if a.is(b) {
        return Ok(Ordering::Equal);
    }
    if !ptr::eq(a.type_of(), b.type_of()) {
        log_dispatch_error("comparison", a.type_of().name);
        return Err(RuntimeError::Type(format!(
            "cannot compare '{}' and '{}' objects",
            a.type_of().name,
            b.type_of().name
        )));
    }
    match a.type_of().compare {
        Some(compare) => compare(a, b),
        None => Err(missing("comparison", a)),
    }
}

/// String object holding the printable representation
pub fn repr(obj: &ObjRef) -> RuntimeResult<ObjRef> {
    match obj.type_of().repr {
        Some(repr) => repr(obj),
        None => Err(missing("repr", obj)),
    }
}

/// Write the object; types without a print slot fall back to their repr
pub fn print(obj: &ObjRef, out: &mut dyn io::Write, mode: PrintMode) -> RuntimeResult<()> {
    let ty = obj.type_of();
    if let Some(print) = ty.print {
        return print(obj, out, mode);
    }
    if ty.repr.is_some() {
        let text = repr(obj)?;
        out.write_all(crate::builtins::string::as_bytes(&text)?)?;
        return Ok(());
    }
    Err(missing("print", obj))
}

fn number(obj: &ObjRef) -> RuntimeResult<&'static dyn NumberMethods> {
    obj.type_of().number.ok_or_else(|| missing("arithmetic", obj))
}

fn sequence(obj: &ObjRef) -> RuntimeResult<&'static dyn SequenceMethods> {
    obj.type_of().sequence.ok_or_else(|| missing("sequence operation", obj))
}

fn mapping(obj: &ObjRef) -> RuntimeResult<&'static dyn MappingMethods> {
    obj.type_of().mapping.ok_or_else(|| missing("mapping operation", obj))
}

// ============================================================================
// Number suite
// ============================================================================

pub fn add(a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
    number(a)?.add(a, b)
}

pub fn sub(a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
    number(a)?.sub(a, b)
}

pub fn mul(a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
    number(a)?.mul(a, b)
}

pub fn div(a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
    number(a)?.div(a, b)
}

pub fn rem(a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
    number(a)?.rem(a, b)
}

pub fn pow(a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
    number(a)?.pow(a, b)
}

pub fn neg(a: &ObjRef) -> RuntimeResult<ObjRef> {
    number(a)?.neg(a)
}

pub fn pos(a: &ObjRef) -> RuntimeResult<ObjRef> {
    number(a)?.pos(a)
}

// ============================================================================
// Sequence suite
// ============================================================================

pub fn length(seq: &ObjRef) -> RuntimeResult<usize> {
    sequence(seq)?.length(seq)
}

pub fn concat(a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
    sequence(a)?.concat(a, b)
}

pub fn repeat(seq: &ObjRef, count: isize) -> RuntimeResult<ObjRef> {
    sequence(seq)?.repeat(seq, count)
}

pub fn item(seq: &ObjRef, index: usize) -> RuntimeResult<ObjRef> {
    sequence(seq)?.item(seq, index)
}

pub fn slice(seq: &ObjRef, low: usize, high: usize) -> RuntimeResult<ObjRef> {
    sequence(seq)?.slice(seq, low, high)
}

pub fn assign_item(seq: &ObjRef, index: usize, value: Option<ObjRef>) -> RuntimeResult<()> {
    sequence(seq)?.assign_item(seq, index, value)
}

pub fn assign_slice(seq: &ObjRef, low: usize, high: usize, value: Option<ObjRef>) -> RuntimeResult<()> {
    sequence(seq)?.assign_slice(seq, low, high, value)
}

// ============================================================================
// Mapping suite
// ============================================================================

pub fn mapping_length(map: &ObjRef) -> RuntimeResult<usize> {
    mapping(map)?.length(map)
}

pub fn subscript(map: &ObjRef, key: &ObjRef) -> RuntimeResult<ObjRef> {
    mapping(map)?.subscript(map, key)
}

/// Store into a mapping; `None` deletes the key
pub fn assign_subscript(map: &ObjRef, key: &ObjRef, value: Option<ObjRef>) -> RuntimeResult<()> {
    mapping(map)?.assign(map, key, value)
}
