// ============================================================================
// upmix-core/src/status.rs
// ============================================================================
//
// STATUS REPORTING: Run State Sink and Observer Callbacks
//
// This module is the observable surface of the pipeline. It receives
// progress updates (monotonic, clamped to [0,1]), status-message updates
// (overwrite) and error updates (set on failure, cleared on reset), and
// carries no business logic of its own.
//
// Consumers either poll `snapshot()` or register a `StatusCallback` that
// is invoked after every update; this decouples the core library from
// presentation concerns.

use std::sync::{Arc, Mutex};

use crate::utils::lock;

/// Point-in-time view of the run state.
#[derive(Debug, Clone, Default)]
pub struct RunStatus {
    /// Whether a run is currently active.
    pub active: bool,
    /// Overall progress fraction in [0, 1]; non-decreasing within a run.
    pub progress: f64,
    /// Human-readable status line.
    pub message: String,
    /// Last recorded error, if any.
    pub error: Option<String>,
}

/// Trait for observing run-state updates.
pub trait StatusCallback: Send + Sync {
    fn on_update(&self, status: &RunStatus);
}

/// Data sink the pipeline publishes to.
#[derive(Default)]
pub struct StatusReporter {
    inner: Mutex<RunStatus>,
    callbacks: Mutex<Vec<Arc<dyn StatusCallback>>>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer invoked after every update.
    pub fn add_callback(&self, callback: Arc<dyn StatusCallback>) {
        lock(&self.callbacks).push(callback);
    }

    pub fn snapshot(&self) -> RunStatus {
        lock(&self.inner).clone()
    }

    /// Resets the run state to defaults: zero progress, empty message,
    /// cleared error.
    pub fn reset(&self, active: bool) {
        let snapshot = {
            let mut state = lock(&self.inner);
            *state = RunStatus {
                active,
                ..RunStatus::default()
            };
            state.clone()
        };
        self.notify(&snapshot);
    }

    pub fn set_active(&self, active: bool) {
        let snapshot = {
            let mut state = lock(&self.inner);
            state.active = active;
            state.clone()
        };
        self.notify(&snapshot);
    }

    /// Advances the progress fraction. Values are clamped to [0, 1] and
    /// never move backwards within a run.
    pub fn set_progress(&self, value: f64) {
        let snapshot = {
            let mut state = lock(&self.inner);
            let clamped = value.clamp(0.0, 1.0);
            if clamped > state.progress {
                state.progress = clamped;
            }
            state.clone()
        };
        self.notify(&snapshot);
    }

    pub fn set_message(&self, message: &str) {
        let snapshot = {
            let mut state = lock(&self.inner);
            state.message = message.to_string();
            state.clone()
        };
        self.notify(&snapshot);
    }

    pub fn set_error(&self, error: &str) {
        let snapshot = {
            let mut state = lock(&self.inner);
            state.error = Some(error.to_string());
            state.clone()
        };
        self.notify(&snapshot);
    }

    fn notify(&self, snapshot: &RunStatus) {
        // Callbacks run outside the state lock; a callback polling
        // `snapshot()` must not deadlock.
        let callbacks = lock(&self.callbacks).clone();
        for callback in callbacks {
            callback.on_update(snapshot);
        }
    }
}
