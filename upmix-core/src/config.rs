// ============================================================================
// upmix-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Core Configuration Structure and Constants
//
// This module defines the configuration structure used throughout the
// upmix-core library. Instances of CoreConfig are created by consumers of
// the library (like upmix-cli) and passed to the PipelineController to
// control conversion behavior.

// ---- Standard library imports ----
use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};

/// Default audio codec passed to the encoder.
pub const DEFAULT_CODEC: &str = "aac";

/// Default container extension for output files.
pub const DEFAULT_EXTENSION: &str = "m4a";

/// Main configuration structure for the upmix-core library.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    // ---- Encoder Settings ----
    /// Explicit path to the encoder binary. When unset, `ffmpeg` is
    /// discovered on PATH.
    pub encoder: Option<PathBuf>,

    /// Output audio codec selector passed to the encoder (e.g. "aac").
    pub codec: String,

    /// Container extension for output files (e.g. "m4a"), without a dot.
    pub extension: String,

    // ---- Notification Settings ----
    /// Optional ntfy.sh topic URL for run-completion notifications.
    pub ntfy_topic: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            encoder: None,
            codec: DEFAULT_CODEC.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            ntfy_topic: None,
        }
    }
}

impl CoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the configuration before it is handed to the pipeline.
    pub fn validate(&self) -> CoreResult<()> {
        if self.codec.trim().is_empty() {
            return Err(CoreError::Config("codec must not be empty".to_string()));
        }
        if self.extension.trim().is_empty() {
            return Err(CoreError::Config("extension must not be empty".to_string()));
        }
        if self.extension.starts_with('.') {
            return Err(CoreError::Config(format!(
                "extension must not start with a dot: {}",
                self.extension
            )));
        }
        Ok(())
    }
}
