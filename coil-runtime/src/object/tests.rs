//! Tests for object lifetimes and reference accounting

use super::*;
use crate::builtins::{string, tuple};
use crate::types::OPAQUE_TYPE;
use std::rc::Rc;

/// Payload that counts how many times it has been dropped
struct DropCounter(Rc<Cell<u32>>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

fn counted() -> (ObjRef, Rc<Cell<u32>>) {
    let drops = Rc::new(Cell::new(0));
    let obj = ObjRef::new(&OPAQUE_TYPE, Payload::Opaque(Box::new(DropCounter(drops.clone()))));
    (obj, drops)
}

#[test]
fn test_new_object_has_one_reference() {
    let (obj, drops) = counted();
    assert_eq!(obj.refcount(), 1);
    drop(obj);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_clone_and_drop_adjust_count() {
    let (obj, drops) = counted();
    let second = incref(&obj);
    assert_eq!(obj.refcount(), 2);
    assert!(second.is(&obj));

    decref(second);
    assert_eq!(obj.refcount(), 1);
    assert_eq!(drops.get(), 0);

    decref(obj);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_container_releases_elements_exactly_once() {
    let (a, a_drops) = counted();
    let (b, b_drops) = counted();

    let t = tuple::new(vec![a.clone(), b, a]);
    assert_eq!(a_drops.get(), 0);

    let inner = tuple::get(&t, 0).unwrap();
    drop(t);
    assert_eq!(a_drops.get(), 0, "element still referenced");
    assert_eq!(b_drops.get(), 1);

    drop(inner);
    assert_eq!(a_drops.get(), 1);
}

#[test]
fn test_ref_stats_balance() {
    // Warm the singletons so they don't show up in the delta
    drop(none());
    let before = ref_stats();

    {
        let s = string::new("hello");
        let t = tuple::new(vec![s.clone(), s, none()]);
        let _copy = t.clone();
    }

    let after = ref_stats();
    assert_eq!(after.allocations - before.allocations, 2);
    assert_eq!(after.deallocations - before.deallocations, 2);
    assert_eq!(after.total_refs, before.total_refs);
}

#[test]
fn test_none_is_never_deallocated() {
    let first = none();
    let baseline = first.refcount();
    let second = none();
    assert!(first.is(&second));
    assert_eq!(second.refcount(), baseline + 1);

    let before = ref_stats();
    drop(first);
    drop(second);
    assert_eq!(ref_stats().deallocations, before.deallocations);
    assert!(is_none(&none()));
}

#[test]
fn test_type_of_type_is_itself() {
    let type_type = type_object(&TYPE_TYPE);
    assert!(type_type.is_type(&TYPE_TYPE));
    assert!(std::ptr::eq(as_type(&type_type).unwrap(), &TYPE_TYPE));

    let string_type = type_object(&string::STRING_TYPE);
    assert!(string_type.is_type(&TYPE_TYPE));
    assert!(type_object(&string::STRING_TYPE).is(&string_type));
}

#[test]
fn test_raw_round_trip_keeps_count() {
    let (obj, drops) = counted();
    let raw = obj.into_raw();

    let obj = unsafe { ObjRef::from_raw(raw) };
    assert_eq!(obj.refcount(), 1);
    drop(obj);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_downcast_opaque_payload() {
    let obj = ObjRef::new(&OPAQUE_TYPE, Payload::Opaque(Box::new(42u32)));
    assert_eq!(obj.downcast_ref::<u32>(), Some(&42));
    assert_eq!(obj.downcast_ref::<i64>(), None);
    assert_eq!(string::new("x").downcast_ref::<u32>(), None);
}

#[test]
fn test_debug_names_type() {
    let s = string::new("x");
    assert!(format!("{:?}", s).starts_with("<string object at "));
}
