//! Machine configuration
//!
//! Loaded from TOML; every field is optional:
//!
//! ```toml
//! echo = true
//! max_instructions = 50000000
//!
//! [trace]
//! enabled = true
//! capacity = 2048
//! ```
//!
//! `SYNACOR_TRACE` and `SYNACOR_MAX_INSTRUCTIONS` in the environment
//! override the file.

use crate::error::VmError;
use crate::trace::DEFAULT_TRACE_CAPACITY;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    /// Echo input lines back to stdout in the interactive driver
    pub echo: bool,
    /// Abort a single run after this many instructions
    pub max_instructions: Option<u64>,
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    pub enabled: bool,
    /// Lines kept before the oldest are dropped
    pub capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            echo: false,
            max_instructions: None,
            trace: TraceConfig::default(),
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        TraceConfig {
            enabled: false,
            capacity: DEFAULT_TRACE_CAPACITY,
        }
    }
}

impl MachineConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, VmError> {
        toml::from_str(text).map_err(|e| VmError::Config(e.to_string()))
    }

    /// Read a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VmError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| VmError::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) -> Result<(), VmError> {
        self.apply_overrides(
            std::env::var("SYNACOR_TRACE").ok().as_deref(),
            std::env::var("SYNACOR_MAX_INSTRUCTIONS").ok().as_deref(),
        )
    }

    fn apply_overrides(
        &mut self,
        trace: Option<&str>,
        max_instructions: Option<&str>,
    ) -> Result<(), VmError> {
        if let Some(value) = trace {
            self.trace.enabled = matches!(value, "1" | "true" | "yes" | "on");
        }
        if let Some(value) = max_instructions {
            let limit = value.trim().parse::<u64>().map_err(|_| {
                VmError::Config(format!("SYNACOR_MAX_INSTRUCTIONS: invalid number '{}'", value))
            })?;
            self.max_instructions = Some(limit);
        }
        Ok(())
    }
}
