// upmix-cli/src/cli.rs
//
// CLI argument definitions for the upmix tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Upmix: batch stereo-to-5.1 conversion tool",
    long_about = "Queues stereo audio files and converts them to 5.1 surround \
                  by driving an external ffmpeg encoder via the upmix-core library."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts the given audio files to 5.1 surround in an output directory
    Convert(ConvertArgs),
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Input audio files to queue for conversion
    #[arg(required = true, value_name = "INPUT_FILES")]
    pub inputs: Vec<PathBuf>,

    /// Directory where converted files will be saved
    #[arg(short, long, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Output audio codec selector passed to the encoder
    #[arg(long, default_value = "aac", value_name = "CODEC")]
    pub codec: String,

    /// Container extension for output files, without a dot
    #[arg(long, default_value = "m4a", value_name = "EXT")]
    pub extension: String,

    /// Explicit path to the encoder binary (defaults to ffmpeg on PATH)
    #[arg(long, value_name = "PATH")]
    pub encoder: Option<PathBuf>,

    /// Optional ntfy topic URL for run notifications
    #[arg(long, value_name = "URL")]
    pub ntfy_topic: Option<String>,
}
