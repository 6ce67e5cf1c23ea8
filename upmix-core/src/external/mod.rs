// ============================================================================
// upmix-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the Encoder and Probe Processes
//
// This module encapsulates every interaction with external command-line
// tools. It provides abstractions through traits and concrete
// implementations so these external dependencies stay testable.
//
// KEY COMPONENTS:
// - Traits for encoder interactions (EncoderSpawner, EncoderProcess)
// - Concrete subprocess implementation (CommandSpawner)
// - Dependency checking for the encoder binary
// - Audio stream probing (AudioProbe)

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};

/// Contains the encoder argument builder, process traits, and the
/// cancellation-aware conversion runner
pub mod encoder;

/// Contains audio stream probing traits and implementations
pub mod probe;

pub use encoder::{
    CommandProcess, CommandSpawner, EncoderProcess, EncoderSpawner, SURROUND_PAN_FILTER,
    UpmixParams, build_upmix_args, run_upmix,
};
pub use probe::{AudioProbe, FfprobeAudioProbe};

/// Name of the encoder binary discovered on PATH when no explicit path is
/// configured.
pub const DEFAULT_ENCODER_BIN: &str = "ffmpeg";

/// Checks that a required external command is available and executable by
/// running it with `-version`.
pub(crate) fn check_dependency(cmd_name: &str) -> CoreResult<String> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("found dependency: {cmd_name}");
            Ok(cmd_name.to_string())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("dependency '{cmd_name}' not found");
            Err(CoreError::EncoderNotFound)
        }
        Err(e) => {
            log::error!("failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::ProcessFailed(format!(
                "failed to start {cmd_name}: {e}"
            )))
        }
    }
}
