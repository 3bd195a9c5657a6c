//! Dict type - string-keyed attribute tables
//!
//! Design: the store behind class method tables and instance attributes.
//! - `insert` takes ownership of the value it is given
//! - `lookup` hands back a new reference
//! - Entries are kept sorted by key so printing is deterministic
//!
//! The table lives in a `RefCell`; every operation releases its borrow before
//! a displaced value is dropped, since dropping may run arbitrary deallocators.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::mem::size_of;

use crate::abstract_ops;
use crate::errors::{RuntimeError, RuntimeResult};
use crate::object::{free_object, ObjRef, Object, Payload};
use crate::types::{MappingMethods, PrintMode, TypeObject};

use super::string;

#[derive(Default)]
pub struct DictData {
    entries: BTreeMap<String, ObjRef>,
}

pub static DICT_TYPE: TypeObject = TypeObject {
    dealloc: Some(free_object),
    print: Some(dict_print),
    repr: Some(dict_repr),
    mapping: Some(&DictMapping),
    ..TypeObject::new("dictionary", size_of::<Object>(), 0)
};

pub fn new() -> ObjRef {
    ObjRef::new(&DICT_TYPE, Payload::Dict(RefCell::new(DictData::default())))
}

#[inline]
pub fn is_dict(obj: &ObjRef) -> bool {
    obj.is_type(&DICT_TYPE)
}

fn table(obj: &ObjRef) -> RuntimeResult<&RefCell<DictData>> {
    match obj.payload() {
        Payload::Dict(data) => Ok(data),
        _ => Err(RuntimeError::BadCall),
    }
}

/// New reference to the value stored under `key`, if any
pub fn lookup(dict: &ObjRef, key: &str) -> RuntimeResult<Option<ObjRef>> {
    Ok(table(dict)?.borrow().entries.get(key).cloned())
}

/// Store `value` under `key`, replacing any previous value
pub fn insert(dict: &ObjRef, key: &str, value: ObjRef) -> RuntimeResult<()> {
    let previous = table(dict)?.borrow_mut().entries.insert(key.to_string(), value);
    drop(previous);
    Ok(())
}

/// Remove `key`; a missing key is a name error
pub fn remove(dict: &ObjRef, key: &str) -> RuntimeResult<()> {
    let removed = table(dict)?.borrow_mut().entries.remove(key);
    match removed {
        Some(value) => {
            drop(value);
            Ok(())
        }
        None => Err(RuntimeError::Name(key.to_string())),
    }
}

pub fn len(dict: &ObjRef) -> RuntimeResult<usize> {
    Ok(table(dict)?.borrow().entries.len())
}

/// Keys in sorted order
pub fn keys(dict: &ObjRef) -> RuntimeResult<Vec<String>> {
    Ok(table(dict)?.borrow().entries.keys().cloned().collect())
}

fn key_of(key: &ObjRef) -> RuntimeResult<String> {
    if !string::is_string(key) {
        return Err(RuntimeError::Type("dictionary keys must be strings".to_string()));
    }
    string::to_string_lossy(key)
}

struct DictMapping;

impl MappingMethods for DictMapping {
    fn length(&self, map: &ObjRef) -> RuntimeResult<usize> {
        len(map)
    }

    fn subscript(&self, map: &ObjRef, key: &ObjRef) -> RuntimeResult<ObjRef> {
        let key = key_of(key)?;
        lookup(map, &key)?.ok_or(RuntimeError::Name(key))
    }

    fn assign(&self, map: &ObjRef, key: &ObjRef, value: Option<ObjRef>) -> RuntimeResult<()> {
        let key = key_of(key)?;
        match value {
            Some(value) => insert(map, &key, value),
            None => remove(map, &key),
        }
    }
}

fn render(dict: &ObjRef) -> RuntimeResult<Vec<u8>> {
    // Snapshot first: a value's repr must not run while the table is borrowed
    let entries: Vec<(String, ObjRef)> = table(dict)?
        .borrow()
        .entries
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut out = vec![b'{'];
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(b", ");
        }
        out.extend_from_slice(string::quote(key.as_bytes()).as_bytes());
        out.extend_from_slice(b": ");
        let text = abstract_ops::repr(value)?;
        out.extend_from_slice(string::as_bytes(&text)?);
    }
    out.push(b'}');
    Ok(out)
}

fn dict_repr(obj: &ObjRef) -> RuntimeResult<ObjRef> {
    Ok(string::new(render(obj)?))
}

fn dict_print(obj: &ObjRef, out: &mut dyn io::Write, _mode: PrintMode) -> RuntimeResult<()> {
    out.write_all(&render(obj)?)?;
    Ok(())
}
