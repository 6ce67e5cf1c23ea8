// ============================================================================
// upmix-core/src/external/encoder.rs
// ============================================================================
//
// ENCODER EXECUTION: Process Abstraction and Conversion Runner
//
// This module performs one file's conversion by invoking the external
// encoder as a subprocess and classifying its outcome. It defines the
// traits used to spawn and interact with encoder processes, the fixed
// channel-mapping filter, and the cancellation-aware wait loop.
//
// KEY COMPONENTS:
// - EncoderProcess / EncoderSpawner: traits for process lifecycle
// - CommandSpawner: concrete implementation over std::process
// - build_upmix_args: fixed argument shape for the encoder invocation
// - run_upmix: blocking runner with cooperative cancellation

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, channel};
use std::thread;
use std::time::Duration;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{DEFAULT_ENCODER_BIN, check_dependency};
use crate::utils::lock;

/// Fixed stereo-to-5.1 channel mapping: front pair passes through, center
/// and LFE are downmixes of both channels, the rear pair carries each side
/// at half gain. Not user-configurable.
pub const SURROUND_PAN_FILTER: &str =
    "pan=5.1|FL=FL|FR=FR|FC=0.5*FL+0.5*FR|LFE=0.1*FL+0.1*FR|BL=0.5*FL|BR=0.5*FR";

/// How often the wait loop polls the child and the cancellation flag.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Parameters for one conversion.
#[derive(Debug, Clone)]
pub struct UpmixParams {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub codec: String,
}

/// Builds the fixed-shape encoder argument list: input, no-video flag,
/// channel-mapping filter, codec selector, overwrite flag, output.
pub fn build_upmix_args(params: &UpmixParams) -> Vec<String> {
    vec![
        "-i".to_string(),
        params.input_path.to_string_lossy().into_owned(),
        "-vn".to_string(),
        "-af".to_string(),
        SURROUND_PAN_FILTER.to_string(),
        "-c:a".to_string(),
        params.codec.clone(),
        "-y".to_string(),
        params.output_path.to_string_lossy().into_owned(),
    ]
}

/// Trait representing a live encoder process instance.
pub trait EncoderProcess: Send {
    /// Non-blocking exit check. `Some(code)` once the process has exited;
    /// processes terminated by a signal report -1.
    fn try_wait(&mut self) -> CoreResult<Option<i32>>;

    /// Best-effort forceful termination.
    fn kill(&mut self) -> CoreResult<()>;

    /// Full captured standard-error text. Only meaningful after exit.
    fn stderr_output(&mut self) -> String;
}

/// Trait representing something that can locate the encoder and spawn
/// encoder processes.
pub trait EncoderSpawner: Send + Sync {
    type Process: EncoderProcess + 'static;

    /// Locates the encoder binary, honoring an explicit configured path.
    fn locate(&self, config: &CoreConfig) -> CoreResult<PathBuf>;

    /// Launches the encoder with the given arguments.
    fn spawn(&self, encoder: &Path, args: &[String]) -> CoreResult<Self::Process>;
}

// --- Concrete implementation over std::process ---

/// Encoder process handle wrapping a `std::process::Child` with its
/// stderr drained on a reader thread.
#[derive(Debug)]
pub struct CommandProcess {
    child: Child,
    stderr_rx: Receiver<Vec<u8>>,
    captured: Option<String>,
}

impl EncoderProcess for CommandProcess {
    fn try_wait(&mut self) -> CoreResult<Option<i32>> {
        Ok(self
            .child
            .try_wait()?
            .map(|status| status.code().unwrap_or(-1)))
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.child.kill()?;
        Ok(())
    }

    fn stderr_output(&mut self) -> String {
        if self.captured.is_none() {
            let bytes = self
                .stderr_rx
                .recv_timeout(Duration::from_millis(100))
                .unwrap_or_default();
            self.captured = Some(String::from_utf8_lossy(&bytes).into_owned());
        }
        self.captured.clone().unwrap_or_default()
    }
}

/// Concrete `EncoderSpawner` launching real subprocesses.
#[derive(Debug, Clone, Default)]
pub struct CommandSpawner;

impl EncoderSpawner for CommandSpawner {
    type Process = CommandProcess;

    fn locate(&self, config: &CoreConfig) -> CoreResult<PathBuf> {
        match &config.encoder {
            Some(path) => {
                if path.is_file() {
                    Ok(path.clone())
                } else {
                    log::warn!("configured encoder {} not found", path.display());
                    Err(CoreError::EncoderNotFound)
                }
            }
            None => check_dependency(DEFAULT_ENCODER_BIN).map(PathBuf::from),
        }
    }

    fn spawn(&self, encoder: &Path, args: &[String]) -> CoreResult<Self::Process> {
        let mut command = Command::new(encoder);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|e| {
            CoreError::ProcessFailed(format!("failed to launch {}: {e}", encoder.display()))
        })?;

        let mut stderr_pipe = child.stderr.take().expect("stderr piped");
        let (stderr_tx, stderr_rx) = channel();
        thread::spawn(move || {
            use std::io::Read;
            let mut buf = Vec::new();
            let _ = stderr_pipe.read_to_end(&mut buf);
            let _ = stderr_tx.send(buf);
        });

        Ok(CommandProcess {
            child,
            stderr_rx,
            captured: None,
        })
    }
}

/// Runs one conversion to completion, blocking the calling thread.
///
/// The live process handle is registered in `in_flight` so an external
/// cancellation request can terminate it; the wait loop additionally
/// polls `cancel` and kills the child itself, covering a request that
/// lands between spawn and registration.
///
/// Outcome classification: exit 0 is success; a non-zero exit while
/// cancellation is requested is `Cancelled` regardless of the process's
/// own error; any other non-zero exit is `ProcessFailed` carrying the
/// captured stderr.
pub fn run_upmix<S: EncoderSpawner>(
    spawner: &S,
    encoder: &Path,
    params: &UpmixParams,
    cancel: &AtomicBool,
    in_flight: &Mutex<Option<S::Process>>,
) -> CoreResult<()> {
    let args = build_upmix_args(params);
    log::debug!(
        "launching encoder: {} {}",
        encoder.display(),
        args.join(" ")
    );

    let process = spawner.spawn(encoder, &args)?;
    *lock(in_flight) = Some(process);

    let exit_code = loop {
        {
            let mut slot = lock(in_flight);
            let Some(process) = slot.as_mut() else {
                break -1;
            };
            if cancel.load(Ordering::SeqCst) {
                let _ = process.kill();
            }
            match process.try_wait() {
                Ok(Some(code)) => break code,
                Ok(None) => {}
                Err(err) => {
                    let _ = process.kill();
                    *slot = None;
                    return Err(err);
                }
            }
        }
        thread::sleep(CANCEL_POLL_INTERVAL);
    };

    let stderr = {
        let mut slot = lock(in_flight);
        let text = slot
            .as_mut()
            .map(|process| process.stderr_output())
            .unwrap_or_default();
        *slot = None;
        text
    };

    if exit_code == 0 {
        log::debug!("encoder finished: {}", params.output_path.display());
        Ok(())
    } else if cancel.load(Ordering::SeqCst) {
        Err(CoreError::Cancelled)
    } else if stderr.trim().is_empty() {
        Err(CoreError::ProcessFailed(format!(
            "encoder exited with status {exit_code}"
        )))
    } else {
        Err(CoreError::ProcessFailed(stderr.trim().to_string()))
    }
}
