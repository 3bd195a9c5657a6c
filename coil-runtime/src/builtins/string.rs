//! String type - immutable byte strings
//!
//! Design: size-delimited bytes with a trailing NUL kept for interop.
//! - Size fixed at allocation; "resizing" always makes a new object
//! - Concatenation with an empty operand returns the other operand itself
//! - Whole-range slices return the same object (strings are immutable)

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::io;
use std::mem::size_of;

use crate::errors::{RuntimeError, RuntimeResult};
use crate::object::{free_object, ObjRef, Object, Payload};
use crate::types::{PrintMode, SequenceMethods, TypeObject};

/// String payload: contents followed by a NUL byte
pub struct StrData {
    bytes: Box<[u8]>,
}

impl StrData {
    fn new(contents: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(contents.len() + 1);
        bytes.extend_from_slice(contents);
        bytes.push(0);
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }

    /// Contents without the terminator
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 1]
    }

    /// Contents including the NUL terminator
    #[inline]
    pub fn as_c_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub static STRING_TYPE: TypeObject = TypeObject {
    dealloc: Some(free_object),
    print: Some(string_print),
    compare: Some(string_compare),
    repr: Some(string_repr),
    sequence: Some(&StringSequence),
    ..TypeObject::new("string", size_of::<Object>(), 1)
};

/// Create a string object holding a copy of `contents`
pub fn new(contents: impl AsRef<[u8]>) -> ObjRef {
    ObjRef::new(&STRING_TYPE, Payload::Str(StrData::new(contents.as_ref())))
}

#[inline]
pub fn is_string(obj: &ObjRef) -> bool {
    obj.is_type(&STRING_TYPE)
}

fn data(obj: &ObjRef) -> RuntimeResult<&StrData> {
    match obj.payload() {
        Payload::Str(data) => Ok(data),
        _ => Err(RuntimeError::BadCall),
    }
}

/// Contents of a string object
pub fn as_bytes(obj: &ObjRef) -> RuntimeResult<&[u8]> {
    data(obj).map(StrData::as_bytes)
}

/// Contents plus the NUL terminator
pub fn as_c_bytes(obj: &ObjRef) -> RuntimeResult<&[u8]> {
    data(obj).map(StrData::as_c_bytes)
}

/// Contents decoded as UTF-8, replacing invalid sequences
pub fn to_string_lossy(obj: &ObjRef) -> RuntimeResult<String> {
    as_bytes(obj).map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

pub fn len(obj: &ObjRef) -> RuntimeResult<usize> {
    as_bytes(obj).map(<[u8]>::len)
}

struct StringSequence;

impl SequenceMethods for StringSequence {
    fn length(&self, seq: &ObjRef) -> RuntimeResult<usize> {
        len(seq)
    }

    fn concat(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        if !is_string(b) {
            return Err(RuntimeError::BadArgument);
        }
        let left = as_bytes(a)?;
        let right = as_bytes(b)?;

        if left.is_empty() {
            return Ok(b.clone());
        }
        if right.is_empty() {
            return Ok(a.clone());
        }

        let mut joined = Vec::with_capacity(left.len() + right.len());
        joined.extend_from_slice(left);
        joined.extend_from_slice(right);
        Ok(new(joined))
    }

    fn repeat(&self, seq: &ObjRef, count: isize) -> RuntimeResult<ObjRef> {
        let contents = as_bytes(seq)?;
        let count = count.max(0) as usize;
        if count == 1 {
            return Ok(seq.clone());
        }
        contents
            .len()
            .checked_mul(count)
            .ok_or_else(|| RuntimeError::Overflow("repeated string is too long".to_string()))?;
        Ok(new(contents.repeat(count)))
    }

    fn item(&self, seq: &ObjRef, index: usize) -> RuntimeResult<ObjRef> {
        if index >= len(seq)? {
            return Err(RuntimeError::Index("string index out of range".to_string()));
        }
        self.slice(seq, index, index + 1)
    }

    /// `seq[low:high]`: bytes `low` up to, not including, `high`
    fn slice(&self, seq: &ObjRef, low: usize, high: usize) -> RuntimeResult<ObjRef> {
        let contents = as_bytes(seq)?;
        let size = contents.len();
        let high = high.min(size);

        if low == 0 && high == size {
            return Ok(seq.clone());
        }

        let low = low.min(size);
        let high = high.max(low);
        Ok(new(&contents[low..high]))
    }
}

fn string_compare(a: &ObjRef, b: &ObjRef) -> RuntimeResult<Ordering> {
    Ok(as_bytes(a)?.cmp(as_bytes(b)?))
}

/// Quote and escape the contents the way a literal would be written
pub fn quote(contents: &[u8]) -> String {
    let mut out = String::with_capacity(contents.len() + 2);
    out.push('\'');
    for &byte in contents {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\x{:02x}", byte);
            }
        }
    }
    out.push('\'');
    out
}

fn string_repr(obj: &ObjRef) -> RuntimeResult<ObjRef> {
    Ok(new(quote(as_bytes(obj)?)))
}

fn string_print(obj: &ObjRef, out: &mut dyn io::Write, mode: PrintMode) -> RuntimeResult<()> {
    let contents = as_bytes(obj)?;
    match mode {
        PrintMode::Raw => out.write_all(contents)?,
        PrintMode::Normal => out.write_all(quote(contents).as_bytes())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_ops;

    #[test]
    fn test_string_keeps_nul_terminator() {
        let s = new("abc");
        assert_eq!(as_bytes(&s).unwrap(), b"abc");
        assert_eq!(as_c_bytes(&s).unwrap(), b"abc\0");
        assert_eq!(s.size(), 3);
    }

    #[test]
    fn test_embedded_nul_is_size_delimited() {
        let s = new(b"a\0b");
        assert_eq!(len(&s).unwrap(), 3);
        assert_eq!(to_string_lossy(&s).unwrap(), "a\u{0}b");
    }

    #[test]
    fn test_repeat() {
        let s = new("ab");
        let r = abstract_ops::repeat(&s, 3).unwrap();
        assert_eq!(as_bytes(&r).unwrap(), b"ababab");

        let same = abstract_ops::repeat(&s, 1).unwrap();
        assert!(same.is(&s));

        let empty = abstract_ops::repeat(&s, -2).unwrap();
        assert_eq!(len(&empty).unwrap(), 0);
    }

    #[test]
    fn test_repr_escapes() {
        let s = new(b"it's\n\x01");
        let r = abstract_ops::repr(&s).unwrap();
        assert_eq!(as_bytes(&r).unwrap(), br"'it\'s\n\x01'");
    }

    #[test]
    fn test_slice_past_end_is_empty() {
        let s = new("abc");
        let r = abstract_ops::slice(&s, 5, 9).unwrap();
        assert_eq!(len(&r).unwrap(), 0);
    }

    #[test]
    fn test_concat_rejects_non_string() {
        let s = new("abc");
        let t = crate::builtins::tuple::empty();
        assert_eq!(abstract_ops::concat(&s, &t).unwrap_err(), RuntimeError::BadArgument);
    }
}
