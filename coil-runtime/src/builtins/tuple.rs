//! Tuple type - immutable fixed-length sequences of object references

use std::cmp::Ordering;
use std::io;
use std::mem::size_of;

use crate::abstract_ops;
use crate::errors::{RuntimeError, RuntimeResult};
use crate::object::{free_object, ObjRef, Object, Payload};
use crate::types::{PrintMode, SequenceMethods, TypeObject};

use super::string;

pub static TUPLE_TYPE: TypeObject = TypeObject {
    dealloc: Some(free_object),
    print: Some(tuple_print),
    compare: Some(tuple_compare),
    repr: Some(tuple_repr),
    sequence: Some(&TupleSequence),
    ..TypeObject::new("tuple", size_of::<Object>(), size_of::<ObjRef>())
};

/// Build a tuple that takes ownership of `items`
pub fn new(items: Vec<ObjRef>) -> ObjRef {
    ObjRef::new(&TUPLE_TYPE, Payload::Tuple(items.into_boxed_slice()))
}

pub fn empty() -> ObjRef {
    new(Vec::new())
}

#[inline]
pub fn is_tuple(obj: &ObjRef) -> bool {
    obj.is_type(&TUPLE_TYPE)
}

/// Borrow the elements of a tuple
pub fn items(obj: &ObjRef) -> RuntimeResult<&[ObjRef]> {
    match obj.payload() {
        Payload::Tuple(items) => Ok(items),
        _ => Err(RuntimeError::BadCall),
    }
}

pub fn len(obj: &ObjRef) -> RuntimeResult<usize> {
    items(obj).map(<[ObjRef]>::len)
}

/// New reference to element `index`
pub fn get(obj: &ObjRef, index: usize) -> RuntimeResult<ObjRef> {
    items(obj)?
        .get(index)
        .cloned()
        .ok_or_else(|| RuntimeError::Index("tuple index out of range".to_string()))
}

struct TupleSequence;

impl SequenceMethods for TupleSequence {
    fn length(&self, seq: &ObjRef) -> RuntimeResult<usize> {
        len(seq)
    }

    fn concat(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        if !is_tuple(b) {
            return Err(RuntimeError::BadArgument);
        }
        let left = items(a)?;
        let right = items(b)?;
        Ok(new(left.iter().chain(right).cloned().collect()))
    }

    fn repeat(&self, seq: &ObjRef, count: isize) -> RuntimeResult<ObjRef> {
        let elements = items(seq)?;
        let count = count.max(0) as usize;
        if count == 1 {
            return Ok(seq.clone());
        }
        let total = elements
            .len()
            .checked_mul(count)
            .ok_or_else(|| RuntimeError::Overflow("repeated tuple is too long".to_string()))?;

        let mut repeated = Vec::with_capacity(total);
        for _ in 0..count {
            repeated.extend(elements.iter().cloned());
        }
        Ok(new(repeated))
    }

    fn item(&self, seq: &ObjRef, index: usize) -> RuntimeResult<ObjRef> {
        get(seq, index)
    }

    fn slice(&self, seq: &ObjRef, low: usize, high: usize) -> RuntimeResult<ObjRef> {
        let elements = items(seq)?;
        let size = elements.len();
        let high = high.min(size);

        if low == 0 && high == size {
            return Ok(seq.clone());
        }

        let low = low.min(size);
        let high = high.max(low);
        Ok(new(elements[low..high].to_vec()))
    }
}

/// Element-wise comparison; a proper prefix sorts first
fn tuple_compare(a: &ObjRef, b: &ObjRef) -> RuntimeResult<Ordering> {
    let left = items(a)?;
    let right = items(b)?;

    for (x, y) in left.iter().zip(right) {
        match abstract_ops::compare(x, y)? {
            Ordering::Equal => continue,
            unequal => return Ok(unequal),
        }
    }
    Ok(left.len().cmp(&right.len()))
}

fn render(obj: &ObjRef) -> RuntimeResult<Vec<u8>> {
    let elements = items(obj)?;
    let mut out = vec![b'('];
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(b", ");
        }
        let text = abstract_ops::repr(element)?;
        out.extend_from_slice(string::as_bytes(&text)?);
    }
    if elements.len() == 1 {
        out.push(b',');
    }
    out.push(b')');
    Ok(out)
}

fn tuple_repr(obj: &ObjRef) -> RuntimeResult<ObjRef> {
    Ok(string::new(render(obj)?))
}

fn tuple_print(obj: &ObjRef, out: &mut dyn io::Write, _mode: PrintMode) -> RuntimeResult<()> {
    out.write_all(&render(obj)?)?;
    Ok(())
}
