//! coil - foundation layer for a small dynamically-typed language
//!
//! - `tokenizer`: indentation-sensitive lexer over incremental line sources
//! - `grammar`: DFA tables, FIRST-set computation and the built-in meta-grammar
//! - `bitset`: packed bit vectors used for FIRST sets
//! - `runtime`: the reference-counted object system (the `coil-runtime` crate)

pub mod bitset;
pub mod config;
pub mod errors;
pub mod grammar;
pub mod logging;
pub mod tokenizer;

pub use coil_runtime as runtime;

pub use bitset::Bitset;
pub use config::Config;
pub use errors::{CoilError, Result};
pub use grammar::{meta_grammar, Grammar, LeftRecursion};
pub use logging::{init_dev_logging, init_logging, init_prod_logging, LogConfig, LogFormat, LogOutput};
pub use tokenizer::{Status, Token, TokenKind, Tokenizer, TokenizerConfig};
