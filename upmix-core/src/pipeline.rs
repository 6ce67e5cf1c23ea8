// ============================================================================
// upmix-core/src/pipeline.rs
// ============================================================================
//
// PIPELINE CONTROLLER: Batch Conversion Orchestration
//
// This module owns the job queue and run state, sequences conversions, and
// implements the cancellation protocol. A run executes on a detached
// worker thread so the initiating caller is never blocked; within the run,
// jobs are processed strictly sequentially in queue order.
//
// WORKFLOW:
// 1. Caller queues files and sets the output directory (tokens created
//    immediately, while live access is still held).
// 2. start() verifies preconditions, resets run state, spawns the worker.
// 3. The worker loop, per job: check the cancellation flag, open an
//    access scope, run the encoder, classify the outcome, advance
//    progress.
// 4. cancel() sets the shared flag and kills any in-flight process; the
//    loop observes the flag and bulk-transitions the remaining jobs.
//
// FAILURE POLICY:
// A per-file access failure marks that job failed and the run continues;
// a non-cancellation conversion failure aborts the remaining run. This
// asymmetry is deliberate.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::encoder::{EncoderProcess, EncoderSpawner, UpmixParams, run_upmix};
use crate::notifications::Notifier;
use crate::queue::{Job, JobQueue, JobStatus};
use crate::resource::{ResourceProvider, ResourceToken};
use crate::status::{RunStatus, StatusReporter};
use crate::utils::{lock, output_file_name};

/// Status line published when a run finishes without cancellation or abort.
pub const COMPLETE_MESSAGE: &str = "Conversion complete";

/// Status line published when a run is cancelled.
pub const CANCELLED_MESSAGE: &str = "Conversion cancelled";

/// Owns the queue, sequences runs, and aggregates progress.
///
/// Generic over the encoder spawner, resource provider and notifier so
/// tests can substitute scripted implementations.
pub struct PipelineController<S, P, N>
where
    S: EncoderSpawner,
    P: ResourceProvider,
    N: Notifier,
{
    shared: Arc<Shared<S, P, N>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct Shared<S, P, N>
where
    S: EncoderSpawner,
{
    config: CoreConfig,
    spawner: S,
    provider: P,
    notifier: N,
    queue: Mutex<JobQueue>,
    reporter: StatusReporter,
    run_active: AtomicBool,
    cancel_requested: AtomicBool,
    output_token: Mutex<Option<ResourceToken>>,
    /// Handle to whatever encoder process is currently in flight, so a
    /// cancellation request can terminate it.
    in_flight: Mutex<Option<S::Process>>,
}

impl<S, P, N> PipelineController<S, P, N>
where
    S: EncoderSpawner + 'static,
    P: ResourceProvider + 'static,
    N: Notifier + 'static,
{
    pub fn new(spawner: S, provider: P, notifier: N, config: CoreConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                spawner,
                provider,
                notifier,
                queue: Mutex::new(JobQueue::new()),
                reporter: StatusReporter::new(),
                run_active: AtomicBool::new(false),
                cancel_requested: AtomicBool::new(false),
                output_token: Mutex::new(None),
                in_flight: Mutex::new(None),
            }),
            worker: Mutex::new(None),
        })
    }

    /// Creates a token for `path` and queues it for conversion. Returns
    /// whether a job was added (adding an already-queued path is a no-op).
    pub fn add_file(&self, path: &Path) -> CoreResult<bool> {
        if self.is_running() {
            return Err(CoreError::Busy(
                "cannot modify the queue while a run is active".to_string(),
            ));
        }
        let token = self.shared.provider.create_token(path)?;
        Ok(lock(&self.shared.queue).add(token))
    }

    /// Creates and stores the output-directory token.
    pub fn set_output_dir(&self, path: &Path) -> CoreResult<()> {
        if self.is_running() {
            return Err(CoreError::Busy(
                "cannot change the output directory while a run is active".to_string(),
            ));
        }
        let token = self.shared.provider.create_token(path)?;
        *lock(&self.shared.output_token) = Some(token);
        Ok(())
    }

    /// Empties the queue and resets the run state. Fails with `Busy`
    /// while a run is active, leaving the queue unmodified.
    pub fn clear(&self) -> CoreResult<()> {
        if self.is_running() {
            return Err(CoreError::Busy(
                "cannot clear the queue while a run is active".to_string(),
            ));
        }
        lock(&self.shared.queue).clear();
        self.shared.reporter.reset(false);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.shared.run_active.load(Ordering::SeqCst)
    }

    /// Cloned snapshot of the queued jobs.
    pub fn jobs(&self) -> Vec<Job> {
        lock(&self.shared.queue).jobs()
    }

    /// Point-in-time view of the run state.
    pub fn status(&self) -> RunStatus {
        self.shared.reporter.snapshot()
    }

    /// The status reporter, for registering observers.
    pub fn reporter(&self) -> &StatusReporter {
        &self.shared.reporter
    }

    /// Starts processing the queue on a detached worker thread.
    ///
    /// Fails with `NotReady` when the queue is empty, a run is already
    /// active, or no output directory is set, and with `EncoderNotFound`
    /// when the encoder cannot be located. No state is mutated on failure.
    pub fn start(&self) -> CoreResult<()> {
        if self.is_running() {
            return Err(CoreError::NotReady("a run is already active".to_string()));
        }
        if lock(&self.shared.queue).is_empty() {
            return Err(CoreError::NotReady("the queue is empty".to_string()));
        }
        if lock(&self.shared.output_token).is_none() {
            return Err(CoreError::NotReady(
                "no output directory set".to_string(),
            ));
        }
        let encoder = self.shared.spawner.locate(&self.shared.config)?;

        if self.shared.run_active.swap(true, Ordering::SeqCst) {
            return Err(CoreError::NotReady("a run is already active".to_string()));
        }
        self.shared.cancel_requested.store(false, Ordering::SeqCst);
        lock(&self.shared.queue).reset_statuses();
        self.shared.reporter.reset(true);

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("upmix-run".to_string())
            .spawn(move || run_loop(shared, encoder));
        match spawned {
            Ok(handle) => {
                *lock(&self.worker) = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.run_active.store(false, Ordering::SeqCst);
                self.shared.reporter.set_active(false);
                Err(e.into())
            }
        }
    }

    /// Requests cancellation of the active run.
    ///
    /// Sets the shared flag and sends a best-effort kill to any in-flight
    /// encoder process. Job statuses are transitioned only by the run
    /// loop observing the flag. Idempotent; a no-op when idle.
    pub fn cancel(&self) {
        if !self.is_running() {
            return;
        }
        if self.shared.cancel_requested.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!("cancellation requested");
        if let Some(process) = lock(&self.shared.in_flight).as_mut() {
            let _ = process.kill();
        }
    }

    /// Blocks until the current run's worker thread finishes. Returns
    /// immediately when no run was started.
    pub fn wait(&self) {
        let handle = lock(&self.worker).take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

fn run_loop<S, P, N>(shared: Arc<Shared<S, P, N>>, encoder: PathBuf)
where
    S: EncoderSpawner,
    P: ResourceProvider,
    N: Notifier,
{
    let total = lock(&shared.queue).len();
    log::info!("starting conversion run: {total} file(s)");

    let mut completed = 0usize;
    let mut cancelled = false;
    let mut aborted = false;

    for index in 0..total {
        if shared.cancel_requested.load(Ordering::SeqCst) {
            cancel_sweep(&shared, index);
            cancelled = true;
            break;
        }

        let Some(token) = lock(&shared.queue).token(index) else {
            break;
        };
        let file_name = token.display_name();

        // Access failure is the one recoverable-and-continue case.
        let scope = match shared.provider.begin_access(&token) {
            Ok(scope) => scope,
            Err(err) => {
                log::warn!("cannot access {file_name}: {err}; skipping");
                lock(&shared.queue).set_status(index, JobStatus::Failed);
                shared.reporter.set_error(&err.to_string());
                completed += 1;
                shared.reporter.set_progress(completed as f64 / total as f64);
                continue;
            }
        };

        lock(&shared.queue).set_status(index, JobStatus::Processing);
        shared.reporter.set_message(&format!(
            "Converting file {} of {}: {}",
            index + 1,
            total,
            file_name
        ));
        log::info!("converting {} ({} of {total})", file_name, index + 1);

        let outcome = convert_one(&shared, &encoder, scope.path());
        drop(scope);

        match outcome {
            Ok(()) => {
                lock(&shared.queue).set_status(index, JobStatus::Upmixed);
            }
            Err(CoreError::Cancelled) => {
                cancel_sweep(&shared, index);
                cancelled = true;
                break;
            }
            Err(err) => {
                // A non-cancellation conversion failure aborts the
                // remaining run; later jobs stay pending.
                log::error!("conversion failed for {file_name}: {err}");
                lock(&shared.queue).set_status(index, JobStatus::Failed);
                shared.reporter.set_error(&err.to_string());
                shared
                    .reporter
                    .set_message(&format!("Conversion failed: {file_name}"));
                aborted = true;
                break;
            }
        }

        completed += 1;
        shared.reporter.set_progress(completed as f64 / total as f64);
    }

    shared.run_active.store(false, Ordering::SeqCst);
    shared.reporter.set_active(false);

    if cancelled {
        notify(&shared, "Upmix Cancelled", CANCELLED_MESSAGE, 3, "warning");
    } else if aborted {
        notify(
            &shared,
            "Upmix Failed",
            "Conversion run aborted on failure",
            5,
            "x,rotating_light",
        );
    } else {
        shared.reporter.set_message(COMPLETE_MESSAGE);
        log::info!("conversion run complete: {completed} of {total} file(s)");
        notify(
            &shared,
            "Upmix Complete",
            &format!("Converted {completed} of {total} file(s)"),
            4,
            "white_check_mark",
        );
    }
}

/// Transitions the job at `from_index` and everything after it to
/// `Cancelled` (already-terminal jobs keep their status), then publishes
/// the cancellation notice with full progress.
fn cancel_sweep<S, P, N>(shared: &Shared<S, P, N>, from_index: usize)
where
    S: EncoderSpawner,
{
    {
        let mut queue = lock(&shared.queue);
        let total = queue.len();
        for index in from_index..total {
            queue.set_status(index, JobStatus::Cancelled);
        }
    }
    shared.reporter.set_progress(1.0);
    shared.reporter.set_message(CANCELLED_MESSAGE);
    log::info!("conversion run cancelled");
}

fn convert_one<S, P, N>(
    shared: &Shared<S, P, N>,
    encoder: &Path,
    input_path: &Path,
) -> CoreResult<()>
where
    S: EncoderSpawner,
    P: ResourceProvider,
{
    let output_token = lock(&shared.output_token)
        .clone()
        .ok_or_else(|| CoreError::NotReady("no output directory set".to_string()))?;
    let output_dir = shared.provider.resolve(&output_token)?;
    let file_name = output_file_name(input_path, &shared.config.extension)?;
    let params = UpmixParams {
        input_path: input_path.to_path_buf(),
        output_path: output_dir.join(file_name),
        codec: shared.config.codec.clone(),
    };
    run_upmix(
        &shared.spawner,
        encoder,
        &params,
        &shared.cancel_requested,
        &shared.in_flight,
    )
}

fn notify<S, P, N>(shared: &Shared<S, P, N>, title: &str, message: &str, priority: u8, tags: &str)
where
    S: EncoderSpawner,
    N: Notifier,
{
    let Some(topic) = &shared.config.ntfy_topic else {
        return;
    };
    if let Err(e) = shared
        .notifier
        .send(topic, message, Some(title), Some(priority), Some(tags))
    {
        log::warn!("failed to send ntfy notification: {e}");
    }
}
