//! Ordered, de-duplicated collection of conversion jobs.
//!
//! The queue owns job identity and status storage; all status transitions
//! during a run are driven by the pipeline controller.

use std::fmt;

use crate::resource::ResourceToken;

/// Lifecycle status of one queued job.
///
/// `Pending` and `Processing` are transient; the other three are terminal
/// and never revisited within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Upmixed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Upmixed | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Upmixed => "upmixed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file queued for conversion.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: u64,
    pub token: ResourceToken,
    pub status: JobStatus,
}

impl Job {
    /// Filename of the job's source, for display and logging.
    pub fn file_name(&self) -> String {
        self.token.display_name()
    }
}

/// Ordered queue of jobs, de-duplicated by originating path.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Vec<Job>,
    next_id: u64,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new `Pending` job unless one already exists for the same
    /// originating path. Returns whether a job was added.
    pub fn add(&mut self, token: ResourceToken) -> bool {
        if self.jobs.iter().any(|job| job.token == token) {
            log::debug!("{} already queued; ignoring", token.display_name());
            return false;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.jobs.push(Job {
            id,
            token,
            status: JobStatus::Pending,
        });
        true
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Updates one job's status. Out-of-range indexes and transitions away
    /// from a terminal status are silent no-ops.
    pub fn set_status(&mut self, index: usize, status: JobStatus) {
        let Some(job) = self.jobs.get_mut(index) else {
            return;
        };
        if job.status.is_terminal() {
            return;
        }
        job.status = status;
    }

    /// Resets every job to `Pending` ahead of a fresh run.
    pub fn reset_statuses(&mut self) {
        for job in &mut self.jobs {
            job.status = JobStatus::Pending;
        }
    }

    pub fn job(&self, index: usize) -> Option<&Job> {
        self.jobs.get(index)
    }

    /// Token of the job at `index`, if any.
    pub fn token(&self, index: usize) -> Option<ResourceToken> {
        self.jobs.get(index).map(|job| job.token.clone())
    }

    /// Cloned snapshot of all jobs, for observers.
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.clone()
    }
}
