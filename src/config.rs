//! Compiler configuration parsing.
//!
//! ```toml
//! [generator]
//! include_dirs = ["proto"]
//! out_dir = "src/gen"
//! json_omit_empty = true
//!
//! [logging]
//! level = "tars_idl=debug"
//! format = "json"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codegen::EmitOptions;

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    pub generator: GeneratorConfig,
    pub logging: LoggingConfig,
}

/// Code generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Directories searched for `#include` targets after the including
    /// file's own directory.
    pub include_dirs: Vec<PathBuf>,
    /// Where generated files are written.
    pub out_dir: PathBuf,
    pub module_upper: bool,
    pub json_omit_empty: bool,
    pub add_servant: bool,
    /// Path generated code uses to reach the runtime.
    pub runtime_crate: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let emit = EmitOptions::default();
        Self {
            include_dirs: Vec::new(),
            out_dir: PathBuf::from("."),
            module_upper: emit.module_upper,
            json_omit_empty: emit.json_omit_empty,
            add_servant: emit.add_servant,
            runtime_crate: emit.runtime_crate,
        }
    }
}

impl GeneratorConfig {
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            module_upper: self.module_upper,
            json_omit_empty: self.json_omit_empty,
            add_servant: self.add_servant,
            runtime_crate: self.runtime_crate.clone(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings for the command-line compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"tars_idl=debug"`.
    pub level: String,
    pub format: LogFormat,
    /// `"stdout"`, `"stderr"` or a file path to append to.
    pub output: String,
    pub timestamps: bool,
    pub target: bool,
    /// ANSI colors; only applied when the output is a terminal.
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
            output: "stderr".to_string(),
            timestamps: false,
            target: false,
            color: true,
        }
    }
}

impl CompilerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let rt = &self.generator.runtime_crate;
        let valid_path = !rt.is_empty()
            && rt.split("::").all(|seg| {
                let mut chars = seg.chars();
                chars
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        if !valid_path {
            return Err(ConfigError::Invalid {
                key: "generator.runtime_crate",
                reason: format!("'{rt}' is not a Rust path"),
            });
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "logging.level",
                reason: "must not be empty".to_string(),
            });
        }
        if self.logging.output.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "logging.output",
                reason: "must be stdout, stderr or a file path".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
