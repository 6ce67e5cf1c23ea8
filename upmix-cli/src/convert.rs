// upmix-cli/src/convert.rs
//
// The 'convert' command: wires the pipeline controller to the real
// encoder spawner, resource provider and notifier, renders progress, and
// routes Ctrl-C to cancellation.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::fs;
use std::sync::Arc;

use upmix_core::external::{AudioProbe, CommandSpawner, FfprobeAudioProbe};
use upmix_core::notifications::NtfyNotifier;
use upmix_core::status::{RunStatus, StatusCallback};
use upmix_core::{
    CoreConfig, CoreError, CoreResult, JobStatus, PipelineController, StdFsResourceProvider,
};

use crate::cli::ConvertArgs;
use crate::logging::get_timestamp;
use crate::output::print_summary;

/// Forwards run-state updates to the progress bar.
struct ProgressBarCallback {
    bar: ProgressBar,
}

impl StatusCallback for ProgressBarCallback {
    fn on_update(&self, status: &RunStatus) {
        self.bar.set_position((status.progress * 100.0).round() as u64);
        if !status.message.is_empty() {
            self.bar.set_message(status.message.clone());
        }
    }
}

/// Runs the conversion batch. Returns whether every job finished upmixed.
pub fn run_convert(args: ConvertArgs) -> CoreResult<bool> {
    println!("{} {}", "Upmix run started:".bold(), get_timestamp());

    let config = CoreConfig {
        encoder: args.encoder,
        codec: args.codec,
        extension: args.extension,
        ntfy_topic: args.ntfy_topic,
    };
    let extension = config.extension.clone();

    fs::create_dir_all(&args.output_dir)?;

    let controller = Arc::new(PipelineController::new(
        CommandSpawner,
        StdFsResourceProvider::new(),
        NtfyNotifier::new()?,
        config,
    )?);

    // Advisory stereo check; probe failures never block the run.
    let probe = FfprobeAudioProbe::new();
    for input in &args.inputs {
        match probe.channel_count(input) {
            Ok(Some(2)) => {}
            Ok(Some(channels)) => {
                println!(
                    "{} {} has {channels} channel(s), expected stereo",
                    "warning:".yellow().bold(),
                    input.display()
                );
            }
            Ok(None) => {
                println!(
                    "{} {} has no audio stream",
                    "warning:".yellow().bold(),
                    input.display()
                );
            }
            Err(e) => {
                log::debug!("skipping stereo check for {}: {e}", input.display());
            }
        }
    }

    for input in &args.inputs {
        if !controller.add_file(input)? {
            println!(
                "{} {} already queued; skipping duplicate",
                "note:".cyan(),
                input.display()
            );
        }
    }
    controller.set_output_dir(&args.output_dir)?;

    let handler = Arc::clone(&controller);
    ctrlc::set_handler(move || {
        log::info!("Ctrl-C received; cancelling run");
        handler.cancel();
    })
    .map_err(|e| CoreError::Io(std::io::Error::other(format!("ctrl-c handler: {e}"))))?;

    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template("[{bar:40.cyan/blue}] {percent:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style.progress_chars("=>-"));
    controller
        .reporter()
        .add_callback(Arc::new(ProgressBarCallback { bar: bar.clone() }));

    controller.start()?;
    controller.wait();
    bar.finish_and_clear();

    let status = controller.status();
    let jobs = controller.jobs();
    print_summary(&jobs, &status, &args.output_dir, &extension);

    println!();
    println!("{} {}", "Upmix run finished:".bold(), get_timestamp());
    Ok(jobs.iter().all(|job| job.status == JobStatus::Upmixed))
}
