//! Built-in object types
//!
//! Design: each type is a static `TypeObject` plus the functions that
//! construct and inspect its objects. Strings and tuples share the sequence
//! contract; dicts are the attribute store for classes and instances.

pub mod dict;
pub mod function;
pub mod int;
pub mod method;
pub mod string;
pub mod tuple;


pub use dict::DICT_TYPE;
pub use function::FUNCTION_TYPE;
pub use int::INT_TYPE;
pub use method::{MethodDef, NativeFn, METHOD_TYPE};
pub use string::STRING_TYPE;
pub use tuple::TUPLE_TYPE;
