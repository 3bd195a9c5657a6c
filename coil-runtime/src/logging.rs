//! Logging - structured runtime events
//!
//! The runtime never installs a subscriber; the embedding program does (see
//! `coil::logging`). Events here are `trace` on the hot paths so they cost
//! nothing unless explicitly enabled.

pub use tracing::{debug, error, info, trace, warn};

/// Log object allocation
#[inline]
pub fn log_allocation(type_name: &'static str, size: usize, address: *const u8) {
    trace!(
        event = "allocation",
        type_name,
        size_bytes = size,
        address = ?address,
        "Object allocated"
    );
}

/// Log object deallocation
#[inline]
pub fn log_deallocation(type_name: &'static str, address: *const u8) {
    trace!(
        event = "deallocation",
        type_name,
        address = ?address,
        "Object deallocated"
    );
}

/// Log a refcount reaching zero on a type without a deallocator
pub fn log_missing_dealloc(type_name: &'static str, address: *const u8) {
    error!(
        event = "missing_dealloc",
        type_name,
        address = ?address,
        "Reference count reached zero on a type without dealloc; object leaked"
    );
}

/// Log a failed generic dispatch
#[inline]
pub fn log_dispatch_error(operation: &'static str, type_name: &'static str) {
    trace!(
        event = "dispatch_error",
        operation,
        type_name,
        "Operation not supported by type"
    );
}

/// Log a class being created
pub fn log_class_created(base_count: usize, method_count: usize) {
    debug!(
        event = "class_new",
        bases = base_count,
        methods = method_count,
        "Class object created"
    );
}
