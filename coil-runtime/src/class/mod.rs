//! Class system - classes, instances, and bound methods
//!
//! Design: three object types built on dicts and tuples.
//! - Class: a method dict plus a tuple of base classes
//! - Member (instance): its class plus an own attribute dict
//! - Bound method: an immutable (function, self) pair
//!
//! Attribute lookup through bases is a pure depth-first, left-to-right
//! search. Bases are fixed at creation, so the inheritance graph is acyclic.

mod member;
mod method;


pub use member::{MemberData, CLASS_MEMBER_TYPE};
pub use method::{BoundMethodData, CLASS_METHOD_TYPE};

pub mod class_member {
    pub use super::member::{get_attr, get_class, is_class_member, new, set_attr};
}

pub mod class_method {
    pub use super::method::{get_func, get_self, is_class_method, new};
}

use std::mem::size_of;

use crate::builtins::{dict, tuple};
use crate::errors::{RuntimeError, RuntimeResult};
use crate::logging::log_class_created;
use crate::object::{free_object, ObjRef, Object, Payload};
use crate::types::TypeObject;

pub struct ClassData {
    bases: Option<ObjRef>,
    methods: ObjRef,
}

pub static CLASS_TYPE: TypeObject = TypeObject {
    dealloc: Some(free_object),
    get_attr: Some(get_attr),
    ..TypeObject::new("class", size_of::<Object>(), 0)
};

/// Create a class from an optional tuple of base classes and a method dict
pub fn new(bases: Option<ObjRef>, methods: ObjRef) -> RuntimeResult<ObjRef> {
    if !dict::is_dict(&methods) {
        return Err(RuntimeError::BadCall);
    }
    let base_count = match &bases {
        Some(bases) => {
            let items = tuple::items(bases)?;
            if !items.iter().all(is_class) {
                return Err(RuntimeError::BadCall);
            }
            items.len()
        }
        None => 0,
    };

    log_class_created(base_count, dict::len(&methods)?);
    Ok(ObjRef::new(&CLASS_TYPE, Payload::Class(ClassData { bases, methods })))
}

#[inline]
pub fn is_class(obj: &ObjRef) -> bool {
    obj.is_type(&CLASS_TYPE)
}

fn data(obj: &ObjRef) -> RuntimeResult<&ClassData> {
    match obj.payload() {
        Payload::Class(data) => Ok(data),
        _ => Err(RuntimeError::BadCall),
    }
}

/// New reference to the method dict
pub fn methods(class: &ObjRef) -> RuntimeResult<ObjRef> {
    data(class).map(|c| c.methods.clone())
}

/// New reference to the bases tuple, if the class has one
pub fn bases(class: &ObjRef) -> RuntimeResult<Option<ObjRef>> {
    data(class).map(|c| c.bases.clone())
}

/// Find `name` in the class or its bases
pub fn lookup(class: &ObjRef, name: &str) -> RuntimeResult<Option<ObjRef>> {
    let class = data(class)?;
    if let Some(found) = dict::lookup(&class.methods, name)? {
        return Ok(Some(found));
    }
    if let Some(bases) = &class.bases {
        for base in tuple::items(bases)? {
            if let Some(found) = lookup(base, name)? {
                return Ok(Some(found));
            }
        }
    }
    Ok(None)
}

/// `lookup`, with a miss reported as a name error
pub fn get_attr(class: &ObjRef, name: &str) -> RuntimeResult<ObjRef> {
    lookup(class, name)?.ok_or_else(|| RuntimeError::Name(name.to_string()))
}
