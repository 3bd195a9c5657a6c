//! Object system - counted handles to heap objects
//!
//! Design: every value is a heap `Object` carrying an inline reference count,
//! a pointer to its immutable `TypeObject`, and a typed payload:
//! - `ObjRef` is the only way to hold an object; `Clone` increments the count
//!   and `Drop` decrements it
//! - Reaching zero runs the type's `dealloc` slot exactly once
//! - Payloads own their sub-objects through `ObjRef`s, so dealloc releases them
//! - Counts are plain cells: one logical thread, no atomics
//!
//! Reference cycles are never reclaimed.

mod refcount;

#[cfg(test)]
mod tests;

pub use refcount::{decref, incref, ref_stats, RefStats};

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};

use crate::builtins::dict::DictData;
use crate::builtins::function::FunctionData;
use crate::builtins::method::MethodData;
use crate::builtins::string::StrData;
use crate::class::{BoundMethodData, ClassData, MemberData};
use crate::logging::log_allocation;
use crate::types::{TypeObject, NONE_TYPE, TYPE_TYPE};

/// Heap-allocated object: header followed by the type-specific payload
pub struct Object {
    refcount: Cell<usize>,
    ty: &'static TypeObject,
    payload: Payload,
}

impl Object {
    #[inline]
    pub fn type_of(&self) -> &'static TypeObject {
        self.ty
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Consume the object, handing back its payload (used by deallocators)
    #[inline]
    pub fn into_payload(self) -> Payload {
        self.payload
    }
}

/// Object data - one representation per built-in type
pub enum Payload {
    None,
    Type(&'static TypeObject),
    Int(i64),
    Str(StrData),
    Tuple(Box<[ObjRef]>),
    Dict(RefCell<DictData>),
    Function(FunctionData),
    Method(MethodData),
    Class(ClassData),
    ClassMember(MemberData),
    ClassMethod(BoundMethodData),
    /// Data of types defined outside this crate
    Opaque(Box<dyn Any>),
}

impl Payload {
    /// Number of items in the variable part (0 for fixed-size objects)
    pub fn item_count(&self) -> usize {
        match self {
            Payload::Str(data) => data.as_bytes().len(),
            Payload::Tuple(items) => items.len(),
            _ => 0,
        }
    }
}

/// Owned reference to a heap object
///
/// Exactly one count is held per live `ObjRef`. Cloning is the `incref`
/// operation, dropping is the `decref` operation.
pub struct ObjRef {
    ptr: NonNull<Object>,
}

impl ObjRef {
    /// Allocate a new object of `ty` with refcount 1
    ///
    /// Unlike a raw allocation, the payload must be fully initialized up
    /// front, so no operation can ever observe undefined fields.
    pub fn new(ty: &'static TypeObject, payload: Payload) -> Self {
        let size = ty.basicsize + ty.itemsize * payload.item_count();
        let boxed = Box::new(Object {
            refcount: Cell::new(1),
            ty,
            payload,
        });
        let ptr = NonNull::from(Box::leak(boxed));

        log_allocation(ty.name, size, ptr.as_ptr() as *const u8);
        refcount::record_allocation();

        Self { ptr }
    }

    #[inline]
    fn object(&self) -> &Object {
        // SAFETY: a live handle owns a count, so the object has not been freed
        unsafe { self.ptr.as_ref() }
    }

    #[inline]
    pub fn type_of(&self) -> &'static TypeObject {
        self.object().ty
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.object().payload
    }

    /// Check whether this object's type is exactly `ty`
    #[inline]
    pub fn is_type(&self, ty: &'static TypeObject) -> bool {
        ptr::eq(self.type_of(), ty)
    }

    /// Current reference count
    #[inline]
    pub fn refcount(&self) -> usize {
        self.object().refcount.get()
    }

    /// Identity comparison
    #[inline]
    pub fn is(&self, other: &ObjRef) -> bool {
        self.ptr == other.ptr
    }

    /// Size of the variable part, fixed at allocation
    #[inline]
    pub fn size(&self) -> usize {
        self.payload().item_count()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const Object {
        self.ptr.as_ptr()
    }

    /// Downcast an opaque payload
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self.payload() {
            Payload::Opaque(data) => data.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Convert to a raw pointer, keeping the count owned by this handle
    #[inline]
    pub fn into_raw(self) -> NonNull<Object> {
        let ptr = self.ptr;
        std::mem::forget(self);
        ptr
    }

    /// Re-adopt a pointer produced by `into_raw`
    ///
    /// # Safety
    /// `ptr` must come from `into_raw` and its count must not have been
    /// reclaimed by another `from_raw`.
    #[inline]
    pub unsafe fn from_raw(ptr: NonNull<Object>) -> Self {
        Self { ptr }
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object at {:p}>", self.type_of().name, self.as_ptr())
    }
}

/// Standard deallocator: release the payload's references, then the storage
pub fn free_object(object: Box<Object>) {
    drop(object);
}

thread_local! {
    static NONE: ManuallyDrop<ObjRef> = ManuallyDrop::new(ObjRef::new(&NONE_TYPE, Payload::None));
    static TYPE_OBJECTS: RefCell<HashMap<usize, ManuallyDrop<ObjRef>>> = RefCell::new(HashMap::new());
}

/// New reference to the None singleton
pub fn none() -> ObjRef {
    NONE.with(|singleton| ObjRef::clone(singleton))
}

pub fn is_none(obj: &ObjRef) -> bool {
    obj.is_type(&NONE_TYPE)
}

/// New reference to the object representing `ty`
///
/// Type objects are created on first request and never deallocated. Their
/// own type is `TYPE_TYPE`, whose type object is itself.
pub fn type_object(ty: &'static TypeObject) -> ObjRef {
    let key = ty as *const TypeObject as usize;
    if let Some(existing) = TYPE_OBJECTS.with(|cache| cache.borrow().get(&key).map(|obj| ObjRef::clone(obj))) {
        return existing;
    }

    let obj = ObjRef::new(&TYPE_TYPE, Payload::Type(ty));
    TYPE_OBJECTS.with(|cache| {
        cache.borrow_mut().insert(key, ManuallyDrop::new(obj.clone()));
    });
    obj
}

/// The `TypeObject` a type object stands for
pub fn as_type(obj: &ObjRef) -> Option<&'static TypeObject> {
    match obj.payload() {
        Payload::Type(ty) => Some(*ty),
        _ => None,
    }
}
