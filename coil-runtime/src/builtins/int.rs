//! Int type - 64-bit signed integers with checked arithmetic
//!
//! Division and modulo floor toward negative infinity, so the remainder
//! always has the sign of the divisor.

use std::cmp::Ordering;
use std::io;
use std::mem::size_of;

use crate::errors::{RuntimeError, RuntimeResult};
use crate::object::{free_object, ObjRef, Object, Payload};
use crate::types::{NumberMethods, PrintMode, TypeObject};

use super::string;

pub static INT_TYPE: TypeObject = TypeObject {
    dealloc: Some(free_object),
    print: Some(int_print),
    compare: Some(int_compare),
    repr: Some(int_repr),
    number: Some(&IntNumber),
    ..TypeObject::new("int", size_of::<Object>(), 0)
};

pub fn new(value: i64) -> ObjRef {
    ObjRef::new(&INT_TYPE, Payload::Int(value))
}

#[inline]
pub fn is_int(obj: &ObjRef) -> bool {
    obj.is_type(&INT_TYPE)
}

pub fn value(obj: &ObjRef) -> RuntimeResult<i64> {
    match obj.payload() {
        Payload::Int(v) => Ok(*v),
        _ => Err(RuntimeError::BadCall),
    }
}

fn operands(op: &str, a: &ObjRef, b: &ObjRef) -> RuntimeResult<(i64, i64)> {
    if !is_int(b) {
        return Err(RuntimeError::unsupported_binary(op, a, b));
    }
    Ok((value(a)?, value(b)?))
}

fn overflow(op: &str) -> RuntimeError {
    RuntimeError::Overflow(format!("integer {}", op))
}

fn floor_div(x: i64, y: i64) -> RuntimeResult<i64> {
    if y == 0 {
        return Err(RuntimeError::ZeroDivision("integer division".to_string()));
    }
    let q = x.checked_div(y).ok_or_else(|| overflow("division"))?;
    if x % y != 0 && ((x < 0) != (y < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn floor_mod(x: i64, y: i64) -> RuntimeResult<i64> {
    if y == 0 {
        return Err(RuntimeError::ZeroDivision("integer modulo".to_string()));
    }
    // i64::MIN % -1 overflows in hardware but is mathematically zero
    let r = x.checked_rem(y).unwrap_or(0);
    if r != 0 && ((r < 0) != (y < 0)) {
        Ok(r + y)
    } else {
        Ok(r)
    }
}

struct IntNumber;

impl NumberMethods for IntNumber {
    fn add(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        let (x, y) = operands("+", a, b)?;
        x.checked_add(y).map(new).ok_or_else(|| overflow("addition"))
    }

    fn sub(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        let (x, y) = operands("-", a, b)?;
        x.checked_sub(y).map(new).ok_or_else(|| overflow("subtraction"))
    }

    fn mul(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        let (x, y) = operands("*", a, b)?;
        x.checked_mul(y).map(new).ok_or_else(|| overflow("multiplication"))
    }

    fn div(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        let (x, y) = operands("/", a, b)?;
        floor_div(x, y).map(new)
    }

    fn rem(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        let (x, y) = operands("%", a, b)?;
        floor_mod(x, y).map(new)
    }

    fn pow(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        let (x, y) = operands("**", a, b)?;
        if y < 0 {
            return Err(RuntimeError::Value("integer to the negative power".to_string()));
        }
        let exponent = u32::try_from(y).map_err(|_| overflow("power"))?;
        x.checked_pow(exponent).map(new).ok_or_else(|| overflow("power"))
    }

    fn neg(&self, a: &ObjRef) -> RuntimeResult<ObjRef> {
        value(a)?.checked_neg().map(new).ok_or_else(|| overflow("negation"))
    }

    fn pos(&self, a: &ObjRef) -> RuntimeResult<ObjRef> {
        value(a)?;
        Ok(a.clone())
    }
}

fn int_compare(a: &ObjRef, b: &ObjRef) -> RuntimeResult<Ordering> {
    Ok(value(a)?.cmp(&value(b)?))
}

fn int_repr(obj: &ObjRef) -> RuntimeResult<ObjRef> {
    Ok(string::new(value(obj)?.to_string()))
}

fn int_print(obj: &ObjRef, out: &mut dyn io::Write, _mode: PrintMode) -> RuntimeResult<()> {
    write!(out, "{}", value(obj)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_ops;

    fn int_of(obj: RuntimeResult<ObjRef>) -> i64 {
        value(&obj.unwrap()).unwrap()
    }

    #[test]
    fn test_floor_division() {
        assert_eq!(int_of(abstract_ops::div(&new(7), &new(2))), 3);
        assert_eq!(int_of(abstract_ops::div(&new(-7), &new(2))), -4);
        assert_eq!(int_of(abstract_ops::div(&new(7), &new(-2))), -4);
        assert_eq!(int_of(abstract_ops::div(&new(-7), &new(-2))), 3);
    }

    #[test]
    fn test_modulo_takes_divisor_sign() {
        assert_eq!(int_of(abstract_ops::rem(&new(-7), &new(3))), 2);
        assert_eq!(int_of(abstract_ops::rem(&new(7), &new(-3))), -2);
        assert_eq!(int_of(abstract_ops::rem(&new(i64::MIN), &new(-1))), 0);
    }

    #[test]
    fn test_zero_division() {
        let err = abstract_ops::div(&new(1), &new(0)).unwrap_err();
        assert!(matches!(err, RuntimeError::ZeroDivision(_)));
        let err = abstract_ops::rem(&new(1), &new(0)).unwrap_err();
        assert!(matches!(err, RuntimeError::ZeroDivision(_)));
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = abstract_ops::add(&new(i64::MAX), &new(1)).unwrap_err();
        assert!(matches!(err, RuntimeError::Overflow(_)));
        let err = abstract_ops::div(&new(i64::MIN), &new(-1)).unwrap_err();
        assert!(matches!(err, RuntimeError::Overflow(_)));
        let err = abstract_ops::neg(&new(i64::MIN)).unwrap_err();
        assert!(matches!(err, RuntimeError::Overflow(_)));
    }

    #[test]
    fn test_pow() {
        assert_eq!(int_of(abstract_ops::pow(&new(2), &new(10))), 1024);
        let err = abstract_ops::pow(&new(2), &new(-1)).unwrap_err();
        assert!(matches!(err, RuntimeError::Value(_)));
    }

    #[test]
    fn test_mixed_operands_are_type_errors() {
        let err = abstract_ops::add(&new(1), &string::new("x")).unwrap_err();
        assert!(matches!(err, RuntimeError::Type(_)));
    }

    #[test]
    fn test_pos_returns_same_object() {
        let n = new(5);
        assert!(abstract_ops::pos(&n).unwrap().is(&n));
    }
}
