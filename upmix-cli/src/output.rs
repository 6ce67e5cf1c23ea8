// upmix-cli/src/output.rs
//
// Final result summary rendering.

use owo_colors::OwoColorize;
use std::path::Path;
use upmix_core::{Job, JobStatus, RunStatus, format_bytes, output_file_name};

/// Prints the per-job result list, the last recorded error, and the final
/// status line.
pub fn print_summary(jobs: &[Job], status: &RunStatus, output_dir: &Path, extension: &str) {
    println!();
    println!("{}", "Conversion summary:".bold());
    for job in jobs {
        let name = job.file_name();
        match job.status {
            JobStatus::Upmixed => {
                match output_size(job, output_dir, extension) {
                    Some(size) => {
                        println!("  {} {} ({size})", "[upmixed]".green().bold(), name);
                    }
                    None => println!("  {} {}", "[upmixed]".green().bold(), name),
                }
            }
            JobStatus::Failed => println!("  {} {}", "[failed]".red().bold(), name),
            JobStatus::Cancelled => println!("  {} {}", "[cancelled]".yellow(), name),
            JobStatus::Pending => println!("  {} {}", "[pending]".dimmed(), name),
            JobStatus::Processing => println!("  {} {}", "[processing]".cyan(), name),
        }
    }

    if let Some(error) = &status.error {
        println!();
        println!("{} {error}", "Last error:".red().bold());
    }
    if !status.message.is_empty() {
        println!();
        println!("{}", status.message);
    }
}

fn output_size(job: &Job, output_dir: &Path, extension: &str) -> Option<String> {
    let name = output_file_name(job.token.source_path(), extension).ok()?;
    let metadata = std::fs::metadata(output_dir.join(name)).ok()?;
    Some(format_bytes(metadata.len()))
}
