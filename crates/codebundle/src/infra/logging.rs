//! Tracing subscriber setup.

use tracing::level_filters::LevelFilter;

/// Map `-v` occurrences and `--quiet` onto a log level. Warnings are shown by default.
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install a compact stderr subscriber. Later calls are ignored.
pub fn init(level: LevelFilter) {
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
    if installed.is_ok() {
        tracing::trace!(%level, "logger initialized");
    }
}
