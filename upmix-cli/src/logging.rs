// upmix-cli/src/logging.rs
//
// Logging setup and helpers. The application uses the standard `log`
// crate with `env_logger` as the backend, driven by RUST_LOG:
// - RUST_LOG=info (default): normal operation logs
// - RUST_LOG=debug: detailed debugging information

use env_logger::Env;

/// Initializes env_logger with an "info" default filter.
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Returns the current local timestamp formatted as "YYYY-MM-DD HH:MM:SS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
