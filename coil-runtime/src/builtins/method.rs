//! Builtin method type - native functions, optionally bound to a receiver
//!
//! Design: a method object pairs a name with a Rust function pointer.
//! - Bound methods own a reference to their receiver (`self`)
//! - Objects expose their native methods through a static `MethodDef` table
//!   searched by `find`

use std::borrow::Cow;
use std::io;
use std::mem::size_of;

use crate::errors::{RuntimeError, RuntimeResult};
use crate::object::{free_object, ObjRef, Object, Payload};
use crate::types::{PrintMode, TypeObject};

use super::string;

/// Native implementation: receives the bound receiver (if any) and the
/// argument object
pub type NativeFn = fn(Option<&ObjRef>, &ObjRef) -> RuntimeResult<ObjRef>;

pub struct MethodData {
    name: Cow<'static, str>,
    method: NativeFn,
    receiver: Option<ObjRef>,
}

/// One entry of a native method table
#[derive(Debug, Clone, Copy)]
pub struct MethodDef {
    pub name: &'static str,
    pub method: NativeFn,
}

pub static METHOD_TYPE: TypeObject = TypeObject {
    dealloc: Some(free_object),
    print: Some(method_print),
    repr: Some(method_repr),
    ..TypeObject::new("method", size_of::<Object>(), 0)
};

/// Create a method object; names may be static or built at runtime
pub fn new(name: impl Into<Cow<'static, str>>, method: NativeFn, receiver: Option<ObjRef>) -> ObjRef {
    ObjRef::new(
        &METHOD_TYPE,
        Payload::Method(MethodData {
            name: name.into(),
            method,
            receiver,
        }),
    )
}

#[inline]
pub fn is_method(obj: &ObjRef) -> bool {
    obj.is_type(&METHOD_TYPE)
}

fn data(obj: &ObjRef) -> RuntimeResult<&MethodData> {
    match obj.payload() {
        Payload::Method(data) => Ok(data),
        _ => Err(RuntimeError::BadCall),
    }
}

pub fn get_function(obj: &ObjRef) -> RuntimeResult<NativeFn> {
    data(obj).map(|m| m.method)
}

/// New reference to the receiver, `None` for unbound functions
pub fn get_self(obj: &ObjRef) -> RuntimeResult<Option<ObjRef>> {
    data(obj).map(|m| m.receiver.clone())
}

pub fn name(obj: &ObjRef) -> RuntimeResult<&str> {
    data(obj).map(|m| m.name.as_ref())
}

/// Invoke the native function with its bound receiver
pub fn call(obj: &ObjRef, args: &ObjRef) -> RuntimeResult<ObjRef> {
    let m = data(obj)?;
    (m.method)(m.receiver.as_ref(), args)
}

/// Bind the entry named `name` in `table` to `receiver`
pub fn find(table: &[MethodDef], receiver: &ObjRef, name: &str) -> RuntimeResult<ObjRef> {
    table
        .iter()
        .find(|def| def.name == name)
        .map(|def| new(def.name, def.method, Some(receiver.clone())))
        .ok_or_else(|| RuntimeError::Name(name.to_string()))
}

fn describe(obj: &ObjRef) -> RuntimeResult<String> {
    let m = data(obj)?;
    Ok(match &m.receiver {
        None => format!("<built-in function '{}'>", m.name),
        Some(receiver) => format!(
            "<built-in method '{}' of some {} object>",
            m.name,
            receiver.type_of().name
        ),
    })
}

fn method_print(obj: &ObjRef, out: &mut dyn io::Write, _mode: PrintMode) -> RuntimeResult<()> {
    out.write_all(describe(obj)?.as_bytes())?;
    Ok(())
}

fn method_repr(obj: &ObjRef) -> RuntimeResult<ObjRef> {
    Ok(string::new(describe(obj)?))
}
