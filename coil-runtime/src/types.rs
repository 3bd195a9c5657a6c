//! Type table - per-type slots and capability suites
//!
//! Design: a `TypeObject` is an immutable static record:
//! - Allocation parameters (`basicsize`, `itemsize`)
//! - Optional operation slots (dealloc, print, get_attr, set_attr, compare, repr)
//! - Optional capability suites (number, sequence, mapping)
//!
//! A suite is a trait whose methods default to a type error, so a type
//! declares a capability by implementing the trait and opts into individual
//! operations by overriding them. Generic dispatch lives in `abstract_ops`.

use std::cmp::Ordering;
use std::fmt;
use std::io;
use std::mem::size_of;

use crate::errors::{RuntimeError, RuntimeResult};
use crate::object::{self, free_object, Object, ObjRef};

pub type DeallocFn = fn(Box<Object>);
pub type PrintFn = fn(&ObjRef, &mut dyn io::Write, PrintMode) -> RuntimeResult<()>;
pub type GetAttrFn = fn(&ObjRef, &str) -> RuntimeResult<ObjRef>;
pub type SetAttrFn = fn(&ObjRef, &str, Option<ObjRef>) -> RuntimeResult<()>;
pub type CompareFn = fn(&ObjRef, &ObjRef) -> RuntimeResult<Ordering>;
pub type ReprFn = fn(&ObjRef) -> RuntimeResult<ObjRef>;

/// How `print` renders strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    /// Quoted, as a literal would be written
    Normal,
    /// Bare contents
    Raw,
}

/// Arithmetic suite
pub trait NumberMethods: Sync {
    fn add(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported_binary("+", a, b))
    }

    fn sub(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported_binary("-", a, b))
    }

    fn mul(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported_binary("*", a, b))
    }

    fn div(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported_binary("/", a, b))
    }

    fn rem(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported_binary("%", a, b))
    }

    fn pow(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported_binary("**", a, b))
    }

    fn neg(&self, a: &ObjRef) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported("unary -", a))
    }

    fn pos(&self, a: &ObjRef) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported("unary +", a))
    }
}

/// Sequence suite; `length` is the one required operation
pub trait SequenceMethods: Sync {
    fn length(&self, seq: &ObjRef) -> RuntimeResult<usize>;

    fn concat(&self, a: &ObjRef, b: &ObjRef) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported_binary("concatenation", a, b))
    }

    fn repeat(&self, seq: &ObjRef, _count: isize) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported("repetition", seq))
    }

    fn item(&self, seq: &ObjRef, _index: usize) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported("indexing", seq))
    }

    fn slice(&self, seq: &ObjRef, _low: usize, _high: usize) -> RuntimeResult<ObjRef> {
        Err(RuntimeError::unsupported("slicing", seq))
    }

    fn assign_item(&self, seq: &ObjRef, _index: usize, _value: Option<ObjRef>) -> RuntimeResult<()> {
        Err(RuntimeError::unsupported("item assignment", seq))
    }

    fn assign_slice(
        &self,
        seq: &ObjRef,
        _low: usize,
        _high: usize,
        _value: Option<ObjRef>,
    ) -> RuntimeResult<()> {
        Err(RuntimeError::unsupported("slice assignment", seq))
    }
}

/// Mapping suite
pub trait MappingMethods: Sync {
    fn length(&self, map: &ObjRef) -> RuntimeResult<usize>;

    fn subscript(&self, map: &ObjRef, key: &ObjRef) -> RuntimeResult<ObjRef>;

    fn assign(&self, map: &ObjRef, _key: &ObjRef, _value: Option<ObjRef>) -> RuntimeResult<()> {
        Err(RuntimeError::unsupported("subscript assignment", map))
    }
}

/// Which suites a type implements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub number: bool,
    pub sequence: bool,
    pub mapping: bool,
}

/// Immutable per-type record shared by all instances
pub struct TypeObject {
    pub name: &'static str,
    pub basicsize: usize,
    pub itemsize: usize,
    pub dealloc: Option<DeallocFn>,
    pub print: Option<PrintFn>,
    pub get_attr: Option<GetAttrFn>,
    pub set_attr: Option<SetAttrFn>,
    pub compare: Option<CompareFn>,
    pub repr: Option<ReprFn>,
    pub number: Option<&'static dyn NumberMethods>,
    pub sequence: Option<&'static dyn SequenceMethods>,
    pub mapping: Option<&'static dyn MappingMethods>,
}

impl TypeObject {
    /// Type with no slots filled; extend with struct update syntax
    pub const fn new(name: &'static str, basicsize: usize, itemsize: usize) -> Self {
        Self {
            name,
            basicsize,
            itemsize,
            dealloc: None,
            print: None,
            get_attr: None,
            set_attr: None,
            compare: None,
            repr: None,
            number: None,
            sequence: None,
            mapping: None,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            number: self.number.is_some(),
            sequence: self.sequence.is_some(),
            mapping: self.mapping.is_some(),
        }
    }
}

impl fmt::Debug for TypeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeObject")
            .field("name", &self.name)
            .field("basicsize", &self.basicsize)
            .field("itemsize", &self.itemsize)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// The type of type objects; its own type object is itself
pub static TYPE_TYPE: TypeObject = TypeObject {
    print: Some(type_print),
    repr: Some(type_repr),
    ..TypeObject::new("type", size_of::<TypeObject>(), 0)
};

/// Type of the None singleton, which is never deallocated
pub static NONE_TYPE: TypeObject = TypeObject {
    print: Some(none_print),
    repr: Some(none_repr),
    ..TypeObject::new("None", size_of::<Object>(), 0)
};

/// Type for tests and external collaborators that only need storage
pub static OPAQUE_TYPE: TypeObject = TypeObject {
    dealloc: Some(free_object),
    ..TypeObject::new("opaque", size_of::<Object>(), 0)
};

fn type_name_of(obj: &ObjRef) -> RuntimeResult<&'static str> {
    object::as_type(obj).map(|ty| ty.name).ok_or(RuntimeError::BadCall)
}

fn type_print(obj: &ObjRef, out: &mut dyn io::Write, _mode: PrintMode) -> RuntimeResult<()> {
    write!(out, "<type '{}'>", type_name_of(obj)?)?;
    Ok(())
}

fn type_repr(obj: &ObjRef) -> RuntimeResult<ObjRef> {
    let name = type_name_of(obj)?;
    Ok(crate::builtins::string::new(format!("<type '{:.80}'>", name)))
}

fn none_print(_obj: &ObjRef, out: &mut dyn io::Write, _mode: PrintMode) -> RuntimeResult<()> {
    write!(out, "None")?;
    Ok(())
}

fn none_repr(_obj: &ObjRef) -> RuntimeResult<ObjRef> {
    Ok(crate::builtins::string::new("None"))
}
