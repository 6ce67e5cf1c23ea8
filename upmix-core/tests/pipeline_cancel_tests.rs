// upmix-core/tests/pipeline_cancel_tests.rs
//
// The cancellation protocol: cooperative flag plus best-effort kill of
// the in-flight encoder process, bulk transition of the remaining jobs,
// and idempotency.

mod helpers;

use helpers::{MockBehavior, MockEncoderSpawner, MockNotifier, MockResourceProvider, wait_until};
use std::path::Path;
use std::time::Duration;
use upmix_core::{CANCELLED_MESSAGE, CoreConfig, JobStatus, PipelineController};

type MockController = PipelineController<MockEncoderSpawner, MockResourceProvider, MockNotifier>;

fn build_controller(
    spawner: &MockEncoderSpawner,
    provider: &MockResourceProvider,
    notifier: &MockNotifier,
) -> MockController {
    PipelineController::new(
        spawner.clone(),
        provider.clone(),
        notifier.clone(),
        CoreConfig::default(),
    )
    .expect("controller construction should succeed")
}

#[test]
fn test_cancel_during_first_job_cancels_everything() {
    let spawner = MockEncoderSpawner::new();
    let provider = MockResourceProvider::new();
    let notifier = MockNotifier::new();
    let controller = build_controller(&spawner, &provider, &notifier);

    spawner.behavior_for("a.wav", MockBehavior::Hang);
    controller.add_file(Path::new("/music/a.wav")).unwrap();
    controller.add_file(Path::new("/music/b.wav")).unwrap();
    controller.add_file(Path::new("/music/c.wav")).unwrap();
    controller.set_output_dir(Path::new("/surround")).unwrap();

    controller.start().unwrap();
    assert!(wait_until(
        || controller.jobs()[0].status == JobStatus::Processing,
        Duration::from_secs(5),
    ));
    controller.cancel();
    controller.wait();

    let jobs = controller.jobs();
    assert!(jobs.iter().all(|job| job.status == JobStatus::Cancelled));

    let status = controller.status();
    assert!(!status.active);
    assert_eq!(status.progress, 1.0);
    assert_eq!(status.message, CANCELLED_MESSAGE);
    assert_eq!(provider.active_scopes(), 0);
}

#[test]
fn test_finished_jobs_keep_status_after_cancel() {
    let spawner = MockEncoderSpawner::new();
    let provider = MockResourceProvider::new();
    let notifier = MockNotifier::new();
    let controller = build_controller(&spawner, &provider, &notifier);

    // a converts immediately; b hangs until cancelled; c never starts.
    spawner.behavior_for("b.wav", MockBehavior::Hang);
    controller.add_file(Path::new("/music/a.wav")).unwrap();
    controller.add_file(Path::new("/music/b.wav")).unwrap();
    controller.add_file(Path::new("/music/c.wav")).unwrap();
    controller.set_output_dir(Path::new("/surround")).unwrap();

    controller.start().unwrap();
    assert!(wait_until(
        || controller.jobs()[1].status == JobStatus::Processing,
        Duration::from_secs(5),
    ));
    controller.cancel();
    controller.wait();

    let jobs = controller.jobs();
    assert_eq!(jobs[0].status, JobStatus::Upmixed);
    assert_eq!(jobs[1].status, JobStatus::Cancelled);
    assert_eq!(jobs[2].status, JobStatus::Cancelled);
    assert_eq!(controller.status().progress, 1.0);
}

#[test]
fn test_cancel_is_idempotent_mid_run() {
    let spawner = MockEncoderSpawner::new();
    let provider = MockResourceProvider::new();
    let notifier = MockNotifier::new();
    let controller = build_controller(&spawner, &provider, &notifier);

    spawner.behavior_for("a.wav", MockBehavior::Hang);
    controller.add_file(Path::new("/music/a.wav")).unwrap();
    controller.set_output_dir(Path::new("/surround")).unwrap();

    controller.start().unwrap();
    assert!(wait_until(
        || controller.jobs()[0].status == JobStatus::Processing,
        Duration::from_secs(5),
    ));
    controller.cancel();
    controller.cancel();
    controller.wait();

    assert_eq!(controller.jobs()[0].status, JobStatus::Cancelled);
}

#[test]
fn test_cancel_while_idle_is_noop() {
    let spawner = MockEncoderSpawner::new();
    let provider = MockResourceProvider::new();
    let notifier = MockNotifier::new();
    let controller = build_controller(&spawner, &provider, &notifier);

    // Cancelling with no active run neither errors nor poisons the next
    // run.
    controller.cancel();

    controller.add_file(Path::new("/music/a.wav")).unwrap();
    controller.set_output_dir(Path::new("/surround")).unwrap();
    controller.start().unwrap();
    controller.wait();

    assert_eq!(controller.jobs()[0].status, JobStatus::Upmixed);
    assert_eq!(controller.status().progress, 1.0);
}

#[test]
fn test_cancellation_notification_sent() {
    let spawner = MockEncoderSpawner::new();
    let provider = MockResourceProvider::new();
    let notifier = MockNotifier::new();
    let config = CoreConfig {
        ntfy_topic: Some("https://ntfy.sh/upmix-test".to_string()),
        ..CoreConfig::default()
    };
    let controller = PipelineController::new(
        spawner.clone(),
        provider.clone(),
        notifier.clone(),
        config,
    )
    .unwrap();

    spawner.behavior_for("a.wav", MockBehavior::Hang);
    controller.add_file(Path::new("/music/a.wav")).unwrap();
    controller.set_output_dir(Path::new("/surround")).unwrap();

    controller.start().unwrap();
    assert!(wait_until(
        || controller.jobs()[0].status == JobStatus::Processing,
        Duration::from_secs(5),
    ));
    controller.cancel();
    controller.wait();

    let sent = notifier.sent_notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title.as_deref(), Some("Upmix Cancelled"));
}
