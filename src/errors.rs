use std::fmt;

/// Failures of the configuration and table-loading surfaces
///
/// Tokenizer problems are not errors in this sense: they come back as an
/// error token plus a `Status` on the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoilError {
    Config(String),
    Io(String),
    Grammar(String),
}

impl fmt::Display for CoilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Grammar(msg) => write!(f, "Grammar error: {}", msg),
        }
    }
}

impl std::error::Error for CoilError {}

impl From<std::io::Error> for CoilError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<toml::de::Error> for CoilError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CoilError {
    fn from(err: serde_json::Error) -> Self {
        Self::Grammar(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoilError>;
