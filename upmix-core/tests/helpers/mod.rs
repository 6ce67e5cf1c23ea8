//! Shared mock implementations for upmix-core integration tests.
//!
//! The mocks mirror the production trait seams: a scripted encoder
//! spawner (behaviors matched against the argument list), a resource
//! provider with per-path access denial and scope counting, a recording
//! notifier, and a progress recorder. Internals are Arc/Mutex-shared so
//! tests keep handles while the pipeline's worker thread drives the
//! other side.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use upmix_core::config::CoreConfig;
use upmix_core::error::{CoreError, CoreResult};
use upmix_core::external::encoder::{EncoderProcess, EncoderSpawner};
use upmix_core::notifications::Notifier;
use upmix_core::resource::{AccessScope, ResourceProvider, ResourceToken};
use upmix_core::status::{RunStatus, StatusCallback};

// --- Encoder mocks ---

/// Scripted behavior for one spawned encoder process.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Exit 0 immediately.
    Succeed,
    /// Exit with the given code and stderr text.
    FailWith { code: i32, stderr: String },
    /// Keep running until killed.
    Hang,
    /// Fail to launch.
    LaunchError(String),
}

pub struct MockEncoderProcess {
    behavior: MockBehavior,
    killed: bool,
}

impl EncoderProcess for MockEncoderProcess {
    fn try_wait(&mut self) -> CoreResult<Option<i32>> {
        if self.killed {
            return Ok(Some(-1));
        }
        match &self.behavior {
            MockBehavior::Succeed => Ok(Some(0)),
            MockBehavior::FailWith { code, .. } => Ok(Some(*code)),
            MockBehavior::Hang => Ok(None),
            MockBehavior::LaunchError(_) => Ok(Some(-1)),
        }
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.killed = true;
        Ok(())
    }

    fn stderr_output(&mut self) -> String {
        match &self.behavior {
            MockBehavior::FailWith { stderr, .. } => stderr.clone(),
            _ => String::new(),
        }
    }
}

/// Mock `EncoderSpawner`: behaviors are selected by the first rule whose
/// pattern appears in any spawn argument; unmatched spawns succeed.
/// Records every received argument list.
#[derive(Clone, Default)]
pub struct MockEncoderSpawner {
    rules: Arc<Mutex<Vec<(String, MockBehavior)>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    locate_fails: Arc<AtomicBool>,
}

impl MockEncoderSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn behavior_for(&self, arg_pattern: &str, behavior: MockBehavior) {
        self.rules
            .lock()
            .unwrap()
            .push((arg_pattern.to_string(), behavior));
    }

    pub fn fail_to_locate(&self) {
        self.locate_fails.store(true, Ordering::SeqCst);
    }

    pub fn received_calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl EncoderSpawner for MockEncoderSpawner {
    type Process = MockEncoderProcess;

    fn locate(&self, _config: &CoreConfig) -> CoreResult<PathBuf> {
        if self.locate_fails.load(Ordering::SeqCst) {
            Err(CoreError::EncoderNotFound)
        } else {
            Ok(PathBuf::from("/mock/ffmpeg"))
        }
    }

    fn spawn(&self, _encoder: &Path, args: &[String]) -> CoreResult<Self::Process> {
        let args = args.to_vec();
        self.calls.lock().unwrap().push(args.clone());

        let behavior = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| args.iter().any(|arg| arg.contains(pattern.as_str())))
            .map(|(_, behavior)| behavior.clone())
            .unwrap_or(MockBehavior::Succeed);

        if let MockBehavior::LaunchError(message) = &behavior {
            return Err(CoreError::ProcessFailed(message.clone()));
        }
        Ok(MockEncoderProcess {
            behavior,
            killed: false,
        })
    }
}

// --- Resource provider mock ---

/// Mock `ResourceProvider` with per-path access denial and open-scope
/// counting, so tests can assert balanced begin/end bracketing.
#[derive(Clone, Default)]
pub struct MockResourceProvider {
    denied: Arc<Mutex<HashSet<PathBuf>>>,
    open_scopes: Arc<AtomicUsize>,
}

impl MockResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_access(&self, path: &Path) {
        self.denied.lock().unwrap().insert(path.to_path_buf());
    }

    pub fn active_scopes(&self) -> usize {
        self.open_scopes.load(Ordering::SeqCst)
    }
}

impl ResourceProvider for MockResourceProvider {
    fn create_token(&self, path: &Path) -> CoreResult<ResourceToken> {
        Ok(ResourceToken::new(path.to_path_buf(), None))
    }

    fn resolve(&self, token: &ResourceToken) -> CoreResult<PathBuf> {
        Ok(token.source_path().to_path_buf())
    }

    fn begin_access(&self, token: &ResourceToken) -> CoreResult<AccessScope> {
        let path = token.source_path().to_path_buf();
        if self.denied.lock().unwrap().contains(&path) {
            return Err(CoreError::PermissionDenied(format!(
                "access denied for {}",
                path.display()
            )));
        }
        self.open_scopes.fetch_add(1, Ordering::SeqCst);
        let counter = Arc::clone(&self.open_scopes);
        Ok(AccessScope::new(
            path,
            Some(Box::new(move || {
                counter.fetch_sub(1, Ordering::SeqCst);
            })),
        ))
    }
}

// --- Notifier mock ---

#[derive(Debug, Clone)]
pub struct SentNotification {
    pub topic_url: String,
    pub message: String,
    pub title: Option<String>,
    pub priority: Option<u8>,
}

#[derive(Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_notifications(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    fn send(
        &self,
        topic_url: &str,
        message: &str,
        title: Option<&str>,
        priority: Option<u8>,
        _tags: Option<&str>,
    ) -> CoreResult<()> {
        self.sent.lock().unwrap().push(SentNotification {
            topic_url: topic_url.to_string(),
            message: message.to_string(),
            title: title.map(String::from),
            priority,
        });
        Ok(())
    }
}

// --- Status observation ---

/// Records every published progress value.
#[derive(Default)]
pub struct ProgressRecorder {
    values: Mutex<Vec<f64>>,
}

impl ProgressRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<f64> {
        self.values.lock().unwrap().clone()
    }

    /// The strictly-increasing progress sequence observed, ignoring
    /// repeats from message and error updates.
    pub fn increases(&self) -> Vec<f64> {
        let mut previous = 0.0;
        let mut increases = Vec::new();
        for value in self.values.lock().unwrap().iter() {
            if *value > previous {
                increases.push(*value);
                previous = *value;
            }
        }
        increases
    }
}

impl StatusCallback for ProgressRecorder {
    fn on_update(&self, status: &RunStatus) {
        self.values.lock().unwrap().push(status.progress);
    }
}

// --- Polling helper ---

/// Polls `predicate` until it holds or `timeout` elapses.
pub fn wait_until<F: Fn() -> bool>(predicate: F, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}
