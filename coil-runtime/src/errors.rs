//! Runtime errors - recoverable failures of object operations
//!
//! Every fallible operation returns `RuntimeResult`; there is no ambient
//! "last error" slot. Allocation failure is not represented here: the global
//! allocator aborts the process, which is the only sane response this core has.

use std::fmt;

use crate::object::ObjRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Operation not supported for the operand type(s)
    Type(String),
    /// Attribute or identifier not found
    Name(String),
    /// Out-of-bounds container access
    Index(String),
    /// Internal API called with an object of the wrong type
    BadCall,
    /// Operand of the wrong type passed to a built-in operation
    BadArgument,
    ZeroDivision(String),
    Overflow(String),
    Value(String),
    /// Output failure while printing an object
    Io(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(msg) => write!(f, "type error: {}", msg),
            Self::Name(name) => write!(f, "name error: {}", name),
            Self::Index(msg) => write!(f, "index error: {}", msg),
            Self::BadCall => write!(f, "system error: bad call of internal function"),
            Self::BadArgument => write!(f, "type error: bad argument type for built-in operation"),
            Self::ZeroDivision(msg) => write!(f, "zero division error: {}", msg),
            Self::Overflow(msg) => write!(f, "overflow error: {}", msg),
            Self::Value(msg) => write!(f, "value error: {}", msg),
            Self::Io(msg) => write!(f, "i/o error: {}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl RuntimeError {
    /// Type error for a unary operation the operand's type lacks
    pub fn unsupported(operation: &str, operand: &ObjRef) -> Self {
        Self::Type(format!(
            "unsupported operation '{}' for '{}' object",
            operation,
            operand.type_of().name
        ))
    }

    /// Type error for a binary operation the operand types lack
    pub fn unsupported_binary(operation: &str, left: &ObjRef, right: &ObjRef) -> Self {
        Self::Type(format!(
            "unsupported operand types for {}: '{}' and '{}'",
            operation,
            left.type_of().name,
            right.type_of().name
        ))
    }

    pub fn is_name_error(&self) -> bool {
        matches!(self, Self::Name(_))
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
