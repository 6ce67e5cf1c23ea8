//! FFprobe integration for audio stream inspection.
//!
//! Used by callers to check that an input actually carries a stereo
//! stream before it is queued. Advisory only: probe failures never block
//! a run.

use ffprobe::ffprobe;
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Trait for inspecting the audio streams of an input file.
pub trait AudioProbe {
    /// Channel count of the first audio stream, or `None` when the file
    /// has no audio stream.
    fn channel_count(&self, input_path: &Path) -> CoreResult<Option<u32>>;
}

/// Implementation of `AudioProbe` using the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct FfprobeAudioProbe;

impl FfprobeAudioProbe {
    pub fn new() -> Self {
        Self
    }
}

impl AudioProbe for FfprobeAudioProbe {
    fn channel_count(&self, input_path: &Path) -> CoreResult<Option<u32>> {
        log::debug!(
            "Running ffprobe (via crate) for audio channels on: {}",
            input_path.display()
        );
        match ffprobe(input_path) {
            Ok(metadata) => {
                let channels = metadata
                    .streams
                    .iter()
                    .filter(|s| s.codec_type.as_deref() == Some("audio"))
                    .filter_map(|s| s.channels)
                    .map(|c| {
                        if c < 0 {
                            log::warn!(
                                "Negative channel count ({}) found for {}, treating as 0",
                                c,
                                input_path.display()
                            );
                            0u32
                        } else {
                            c as u32
                        }
                    })
                    .next();
                if channels.is_none() {
                    log::warn!(
                        "No audio streams found by ffprobe for {}",
                        input_path.display()
                    );
                }
                Ok(channels)
            }
            Err(err) => {
                log::debug!(
                    "ffprobe failed for audio channels on {}: {err:?}",
                    input_path.display()
                );
                Err(CoreError::ProcessFailed(format!(
                    "ffprobe failed for {}: {err:?}",
                    input_path.display()
                )))
            }
        }
    }
}
