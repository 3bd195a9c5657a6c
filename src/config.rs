//! Configuration - `coil.toml`
//!
//! Every field has a default, so an empty file (or none at all) is valid.
//! `discover` walks up from the working directory to the first `coil.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

use crate::errors::{CoilError, Result};
use crate::logging::{LogConfig, LogFormat, LogOutput};
use crate::tokenizer::{TokenizerConfig, DEFAULT_TAB_SIZE, MAX_INDENT};

pub const CONFIG_FILE: &str = "coil.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tokenizer: TokenizerSection,

    #[serde(default)]
    pub grammar: GrammarSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerSection {
    #[serde(default = "default_tab_size")]
    pub tab_size: usize,

    #[serde(default = "default_max_indent")]
    pub max_indent: usize,

    #[serde(default)]
    pub ps1: Option<String>,

    #[serde(default)]
    pub ps2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarSection {
    /// Print left-recursion reports from FIRST-set computation
    #[serde(default = "default_true")]
    pub report_left_recursion: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,

    /// pretty, compact or json
    #[serde(default = "default_format")]
    pub format: String,

    /// stderr, stdout or file
    #[serde(default = "default_output")]
    pub output: String,

    /// Used when output = "file"
    #[serde(default = "default_directory")]
    pub directory: String,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub filter: Option<String>,

    #[serde(default)]
    pub span_events: bool,
}

impl Default for TokenizerSection {
    fn default() -> Self {
        Self {
            tab_size: DEFAULT_TAB_SIZE,
            max_indent: MAX_INDENT,
            ps1: None,
            ps2: None,
        }
    }
}

impl Default for GrammarSection {
    fn default() -> Self {
        Self {
            report_left_recursion: true,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            output: default_output(),
            directory: default_directory(),
            prefix: default_prefix(),
            filter: None,
            span_events: false,
        }
    }
}

fn default_true() -> bool { true }
fn default_tab_size() -> usize { DEFAULT_TAB_SIZE }
fn default_max_indent() -> usize { MAX_INDENT }
fn default_level() -> String { "info".to_string() }
fn default_format() -> String { "pretty".to_string() }
fn default_output() -> String { "stderr".to_string() }
fn default_directory() -> String { "logs".to_string() }
fn default_prefix() -> String { "coil".to_string() }

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CoilError::Io(format!("failed to read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// First `coil.toml` in the working directory or its parents
    pub fn discover() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_from(&cwd)
    }

    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Discovered configuration, or defaults if there is none
    pub fn discover_or_default() -> Result<Self> {
        match Self::discover() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tokenizer.tab_size == 0 {
            return Err(CoilError::Config("tokenizer.tab_size must be at least 1".into()));
        }
        if self.tokenizer.max_indent == 0 {
            return Err(CoilError::Config("tokenizer.max_indent must be at least 1".into()));
        }
        self.log_config().map(|_| ())
    }

    pub fn tokenizer_config(&self) -> TokenizerConfig {
        TokenizerConfig {
            tab_size: self.tokenizer.tab_size,
            max_indent: self.tokenizer.max_indent,
            ps1: self.tokenizer.ps1.clone(),
            ps2: self.tokenizer.ps2.clone(),
        }
    }

    pub fn log_config(&self) -> Result<LogConfig> {
        let section = &self.logging;
        let level: Level = section
            .level
            .parse()
            .map_err(|_| CoilError::Config(format!("unknown log level '{}'", section.level)))?;
        let format: LogFormat = section.format.parse()?;
        let output = match section.output.to_ascii_lowercase().as_str() {
            "stderr" => LogOutput::Stderr,
            "stdout" => LogOutput::Stdout,
            "file" => LogOutput::File {
                directory: section.directory.clone(),
                prefix: section.prefix.clone(),
            },
            other => return Err(CoilError::Config(format!("unknown log output '{}'", other))),
        };

        let mut config = LogConfig::new()
            .with_level(level)
            .with_format(format)
            .with_output(output)
            .with_span_events(section.span_events);
        if let Some(filter) = &section.filter {
            config = config.with_filter(filter.clone());
        }
        Ok(config)
    }

    /// Default configuration as TOML
    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# failed to generate config"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CoilError::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}
