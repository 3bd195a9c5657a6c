//! Coil Runtime - reference-counted object system
//!
//! This crate provides the object layer a dynamically-typed language
//! evaluator builds on: counted object handles, per-type dispatch tables,
//! the built-in containers, and the class system.

pub mod abstract_ops;
pub mod builtins;
pub mod class;
pub mod errors;
pub mod logging;
pub mod object;
pub mod types;

// Re-export core types
pub use errors::{RuntimeError, RuntimeResult};
pub use object::{decref, incref, none, ref_stats, type_object, ObjRef, Object, Payload, RefStats};
pub use types::{Capabilities, PrintMode, TypeObject};
