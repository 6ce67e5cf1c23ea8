//! Utility functions for naming, formatting and lock handling.
//!
//! This module provides general-purpose utility functions used throughout
//! the upmix-core library: output-path naming, byte formatting, and safe
//! filename extraction.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{CoreError, CoreResult};

/// Suffix inserted between the input stem and the output extension.
pub const OUTPUT_SUFFIX: &str = "_5.1";

/// Builds the output file name for an input path: `<stem>_5.1.<extension>`.
pub fn output_file_name(input: &Path, extension: &str) -> CoreResult<String> {
    let stem = input
        .file_stem()
        .ok_or_else(|| {
            CoreError::PathError(format!(
                "Failed to get filename stem for {}",
                input.display()
            ))
        })?
        .to_string_lossy();
    Ok(format!("{stem}{OUTPUT_SUFFIX}.{extension}"))
}

/// Safely extracts filename from a path with consistent error handling.
/// Returns the filename as a String, or an error if the path has no filename component.
pub fn get_filename_safe(path: &Path) -> CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| {
            CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Locks a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(Path::new("/music/song.wav"), "m4a").unwrap(),
            "song_5.1.m4a"
        );
        assert_eq!(
            output_file_name(Path::new("track.flac"), "flac").unwrap(),
            "track_5.1.flac"
        );
        // Dotted stems keep everything before the final extension
        assert_eq!(
            output_file_name(Path::new("/a/b/mix.final.wav"), "m4a").unwrap(),
            "mix.final_5.1.m4a"
        );
        // Extension-less inputs still get the suffix
        assert_eq!(
            output_file_name(Path::new("/a/master"), "m4a").unwrap(),
            "master_5.1.m4a"
        );
        assert!(output_file_name(Path::new("/"), "m4a").is_err());
    }

    #[test]
    fn test_get_filename_safe() {
        assert_eq!(
            get_filename_safe(Path::new("/path/to/file.wav")).unwrap(),
            "file.wav"
        );
        assert_eq!(get_filename_safe(Path::new("file.wav")).unwrap(), "file.wav");
        assert!(get_filename_safe(Path::new("/")).is_err());
        assert!(get_filename_safe(&PathBuf::new()).is_err());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MiB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GiB");
    }
}
