//! Core library for batch stereo-to-5.1 surround conversion using an
//! external encoder process.
//!
//! This crate provides the batch conversion pipeline: a de-duplicated job
//! queue, a sequential run loop with cooperative cancellation, scoped
//! resource handling for files that may live outside the application's
//! normal permission boundary, and outcome classification for the
//! external encoder.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use upmix_core::{CoreConfig, PipelineController, StdFsResourceProvider};
//! use upmix_core::external::CommandSpawner;
//! use upmix_core::notifications::NtfyNotifier;
//! use std::path::Path;
//!
//! let controller = PipelineController::new(
//!     CommandSpawner,
//!     StdFsResourceProvider::new(),
//!     NtfyNotifier::new().unwrap(),
//!     CoreConfig::default(),
//! ).unwrap();
//!
//! controller.add_file(Path::new("/music/song.wav")).unwrap();
//! controller.set_output_dir(Path::new("/music/surround")).unwrap();
//! controller.start().unwrap();
//! controller.wait();
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod notifications;
pub mod pipeline;
pub mod queue;
pub mod resource;
pub mod status;
pub mod utils;

// Re-exports for public API
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use pipeline::{CANCELLED_MESSAGE, COMPLETE_MESSAGE, PipelineController};
pub use queue::{Job, JobQueue, JobStatus};
pub use resource::{AccessScope, ResourceProvider, ResourceToken, StdFsResourceProvider};
pub use status::{RunStatus, StatusCallback, StatusReporter};
pub use utils::{format_bytes, output_file_name};
