//! Class members - instances with their own attribute dict

use std::mem::size_of;

use crate::builtins::{dict, function};
use crate::errors::{RuntimeError, RuntimeResult};
use crate::object::{free_object, ObjRef, Object, Payload};
use crate::types::TypeObject;

use super::{is_class, method};

pub struct MemberData {
    class: ObjRef,
    attrs: ObjRef,
}

pub static CLASS_MEMBER_TYPE: TypeObject = TypeObject {
    dealloc: Some(free_object),
    get_attr: Some(get_attr),
    set_attr: Some(set_attr),
    ..TypeObject::new("instance", size_of::<Object>(), 0)
};

/// Create an instance of `class` with an empty attribute dict
pub fn new(class: &ObjRef) -> RuntimeResult<ObjRef> {
    if !is_class(class) {
        return Err(RuntimeError::BadCall);
    }
    Ok(ObjRef::new(
        &CLASS_MEMBER_TYPE,
        Payload::ClassMember(MemberData {
            class: class.clone(),
            attrs: dict::new(),
        }),
    ))
}

#[inline]
pub fn is_class_member(obj: &ObjRef) -> bool {
    obj.is_type(&CLASS_MEMBER_TYPE)
}

fn data(obj: &ObjRef) -> RuntimeResult<&MemberData> {
    match obj.payload() {
        Payload::ClassMember(data) => Ok(data),
        _ => Err(RuntimeError::BadCall),
    }
}

pub fn get_class(member: &ObjRef) -> RuntimeResult<ObjRef> {
    data(member).map(|m| m.class.clone())
}

/// Own attributes first, then the class
///
/// A function found on the class comes back bound to `member`. Any other
/// class attribute is reported as missing.
pub fn get_attr(member: &ObjRef, name: &str) -> RuntimeResult<ObjRef> {
    let m = data(member)?;
    if let Some(own) = dict::lookup(&m.attrs, name)? {
        return Ok(own);
    }

    let found = super::get_attr(&m.class, name)?;
    if function::is_function(&found) {
        return method::new(&found, member);
    }
    Err(RuntimeError::Name(name.to_string()))
}

/// Store an own attribute; `None` removes it
pub fn set_attr(member: &ObjRef, name: &str, value: Option<ObjRef>) -> RuntimeResult<()> {
    let attrs = &data(member)?.attrs;
    match value {
        Some(value) => dict::insert(attrs, name, value),
        None => dict::remove(attrs, name),
    }
}
