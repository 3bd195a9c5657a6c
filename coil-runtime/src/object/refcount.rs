//! Reference counting - increment, decrement, and exactly-once destruction
//!
//! Hot path operations are inlined; destruction is split into a cold function.
//! Per-thread totals mirror a reference-debugging build: they let tests prove
//! every allocation is matched by exactly one deallocation.

use std::cell::Cell;
use std::ptr::NonNull;

use super::{ObjRef, Object};
use crate::logging::{log_deallocation, log_missing_dealloc};

thread_local! {
    static STATS: Cell<RefStats> = const { Cell::new(RefStats::ZERO) };
}

/// Reference accounting for the current thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefStats {
    pub allocations: u64,
    pub deallocations: u64,
    /// Sum of all reference counts currently held
    pub total_refs: i64,
}

impl RefStats {
    const ZERO: Self = Self {
        allocations: 0,
        deallocations: 0,
        total_refs: 0,
    };

    /// Objects allocated and not yet deallocated (leaked ones included)
    pub fn live_objects(&self) -> u64 {
        self.allocations - self.deallocations
    }
}

/// Snapshot of the current thread's reference accounting
pub fn ref_stats() -> RefStats {
    STATS.with(Cell::get)
}

#[inline]
fn update(f: impl FnOnce(&mut RefStats)) {
    STATS.with(|cell| {
        let mut stats = cell.get();
        f(&mut stats);
        cell.set(stats);
    });
}

#[inline]
pub(super) fn record_allocation() {
    update(|s| {
        s.allocations += 1;
        s.total_refs += 1;
    });
}

/// Take a new reference to `obj`
#[inline]
pub fn incref(obj: &ObjRef) -> ObjRef {
    obj.clone()
}

/// Give up a reference; the object is deallocated if it was the last one
#[inline]
pub fn decref(obj: ObjRef) {
    drop(obj);
}

impl Clone for ObjRef {
    #[inline]
    fn clone(&self) -> Self {
        let cell = &self.object().refcount;
        cell.set(cell.get() + 1);
        update(|s| s.total_refs += 1);
        Self { ptr: self.ptr }
    }
}

impl Drop for ObjRef {
    #[inline]
    fn drop(&mut self) {
        let cell = &self.object().refcount;
        let count = cell.get();
        debug_assert!(count > 0, "refcount underflow");

        cell.set(count - 1);
        update(|s| s.total_refs -= 1);

        if count == 1 {
            // SAFETY: this was the last handle; nobody can observe the object again
            unsafe { destroy(self.ptr) }
        }
    }
}

/// Run the type's deallocator (cold path)
#[cold]
#[inline(never)]
unsafe fn destroy(ptr: NonNull<Object>) {
    let ty = ptr.as_ref().ty;
    let address = ptr.as_ptr() as *const u8;

    match ty.dealloc {
        Some(dealloc) => {
            log_deallocation(ty.name, address);
            update(|s| s.deallocations += 1);
            dealloc(Box::from_raw(ptr.as_ptr()));
        }
        None => log_missing_dealloc(ty.name, address),
    }
}
