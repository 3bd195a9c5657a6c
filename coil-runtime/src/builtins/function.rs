//! Function type - compiled code paired with the globals it runs in
//!
//! The code object and globals dict belong to the external compiler and
//! evaluator; this type only owns references to them.

use std::mem::size_of;

use crate::errors::{RuntimeError, RuntimeResult};
use crate::object::{free_object, ObjRef, Object, Payload};
use crate::types::TypeObject;

pub struct FunctionData {
    code: ObjRef,
    globals: ObjRef,
}

pub static FUNCTION_TYPE: TypeObject = TypeObject {
    dealloc: Some(free_object),
    get_attr: Some(function_get_attr),
    ..TypeObject::new("function", size_of::<Object>(), 0)
};

pub fn new(code: ObjRef, globals: ObjRef) -> ObjRef {
    ObjRef::new(&FUNCTION_TYPE, Payload::Function(FunctionData { code, globals }))
}

#[inline]
pub fn is_function(obj: &ObjRef) -> bool {
    obj.is_type(&FUNCTION_TYPE)
}

fn data(obj: &ObjRef) -> RuntimeResult<&FunctionData> {
    match obj.payload() {
        Payload::Function(data) => Ok(data),
        _ => Err(RuntimeError::BadCall),
    }
}

pub fn get_code(func: &ObjRef) -> RuntimeResult<ObjRef> {
    data(func).map(|f| f.code.clone())
}

pub fn get_globals(func: &ObjRef) -> RuntimeResult<ObjRef> {
    data(func).map(|f| f.globals.clone())
}

fn function_get_attr(func: &ObjRef, name: &str) -> RuntimeResult<ObjRef> {
    match name {
        "func_code" => get_code(func),
        "func_globals" => get_globals(func),
        _ => Err(RuntimeError::Name(name.to_string())),
    }
}
