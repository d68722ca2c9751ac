//! Engine configuration
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! command-line overrides. The file is either given explicitly or discovered at
//! `<config_dir>/Eventstack/eventstack.toml`.
//!
//! ```toml
//! worker_count = 4
//! event_types = 26
//! publish_ceiling = 512
//! drain_mode = "snapshot"
//! ```

use crate::dispatch::{
    DispatchError, DispatchResult, DrainMode, DEFAULT_EVENT_TYPES, DEFAULT_PUBLISH_CEILING,
    DEFAULT_WORKER_COUNT,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Tunables shared by the queue, registry and executor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Worker threads per run
    pub worker_count: usize,
    /// Size of the valid event type range
    pub event_types: usize,
    /// Publish attempts accepted per run
    pub publish_ceiling: usize,
    pub drain_mode: DrainMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            event_types: DEFAULT_EVENT_TYPES,
            publish_ceiling: DEFAULT_PUBLISH_CEILING,
            drain_mode: DrainMode::default(),
        }
    }
}

/// Partial configuration supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub worker_count: Option<usize>,
    pub event_types: Option<usize>,
    pub publish_ceiling: Option<usize>,
    pub drain_mode: Option<DrainMode>,
}

impl EngineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> DispatchResult<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| DispatchError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> DispatchResult<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| DispatchError::InvalidConfig {
                message: format!("Error reading configuration file {}: {}", path.display(), e),
            })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            DispatchError::InvalidConfig { message } => DispatchError::InvalidConfig {
                message: format!("Error in configuration file {}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Default configuration file location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Eventstack").join("eventstack.toml"))
    }

    /// Resolve the effective configuration
    ///
    /// An explicitly named file must exist. The default file is used only when
    /// present; otherwise built-in defaults apply.
    pub fn load(config_file: Option<&Path>, overrides: &ConfigOverrides) -> DispatchResult<Self> {
        let mut config = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(DispatchError::InvalidConfig {
                        message: format!(
                            "The specified configuration file does not exist: {}",
                            path.display()
                        ),
                    });
                }
                Self::from_file(path)?
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => {
                    log::debug!("Using default configuration file {}", path.display());
                    Self::from_file(&path)?
                }
                _ => Self::default(),
            },
        };

        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(worker_count) = overrides.worker_count {
            self.worker_count = worker_count;
        }
        if let Some(event_types) = overrides.event_types {
            self.event_types = event_types;
        }
        if let Some(publish_ceiling) = overrides.publish_ceiling {
            self.publish_ceiling = publish_ceiling;
        }
        if let Some(drain_mode) = overrides.drain_mode {
            self.drain_mode = drain_mode;
        }
    }

    pub fn validate(&self) -> DispatchResult<()> {
        let invalid = |message: &str| {
            Err(DispatchError::InvalidConfig {
                message: message.to_string(),
            })
        };

        if self.worker_count == 0 {
            return invalid("worker_count must be at least 1");
        }
        if self.event_types == 0 {
            return invalid("event_types must be at least 1");
        }
        if self.event_types > u32::MAX as usize {
            return invalid("event_types must fit in a 32-bit event type");
        }
        if self.publish_ceiling == 0 {
            return invalid("publish_ceiling must be at least 1");
        }
        Ok(())
    }
}
