//! Class methods - functions bound to an instance

use std::mem::size_of;

use crate::builtins::function;
use crate::errors::{RuntimeError, RuntimeResult};
use crate::object::{free_object, ObjRef, Object, Payload};
use crate::types::TypeObject;

pub struct BoundMethodData {
    func: ObjRef,
    receiver: ObjRef,
}

pub static CLASS_METHOD_TYPE: TypeObject = TypeObject {
    dealloc: Some(free_object),
    ..TypeObject::new("instance method", size_of::<Object>(), 0)
};

pub fn new(func: &ObjRef, receiver: &ObjRef) -> RuntimeResult<ObjRef> {
    if !function::is_function(func) {
        return Err(RuntimeError::BadCall);
    }
    Ok(ObjRef::new(
        &CLASS_METHOD_TYPE,
        Payload::ClassMethod(BoundMethodData {
            func: func.clone(),
            receiver: receiver.clone(),
        }),
    ))
}

#[inline]
pub fn is_class_method(obj: &ObjRef) -> bool {
    obj.is_type(&CLASS_METHOD_TYPE)
}

fn data(obj: &ObjRef) -> RuntimeResult<&BoundMethodData> {
    match obj.payload() {
        Payload::ClassMethod(data) => Ok(data),
        _ => Err(RuntimeError::BadCall),
    }
}

pub fn get_func(bound: &ObjRef) -> RuntimeResult<ObjRef> {
    data(bound).map(|m| m.func.clone())
}

pub fn get_self(bound: &ObjRef) -> RuntimeResult<ObjRef> {
    data(bound).map(|m| m.receiver.clone())
}
