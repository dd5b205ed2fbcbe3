//! Console logging for the `notepad` binary.
//!
//! Logs go to stderr so command output on stdout stays pipeable. `RUST_LOG`
//! overrides the default level, which is DEBUG in debug builds and INFO
//! otherwise.

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub fn init() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}
