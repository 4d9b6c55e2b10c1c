use slog::{o, Drain, Level, Logger};
use std::fs::OpenOptions;
use std::path::Path;

/// Builds the node's root logger: a colourised, human-readable drain on stdout, optionally
/// duplicated to a newline-delimited JSON drain on a log file for later ingestion.
///
/// `debug_level` follows the CLI's `--debug-level` flag (`trace`/`debug`/`info`/`warn`/`error`/
/// `crit`); an unrecognised string falls back to `info` rather than failing startup.
pub fn build_root_logger(debug_level: &str, disable_colour: bool, log_file: Option<&Path>) -> Logger {
    let level = parse_level(debug_level);

    let stdout_drain = if disable_colour {
        let decorator = slog_term::PlainDecorator::new(std::io::stdout());
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        slog_async::Async::new(drain).build().fuse()
    } else {
        let decorator = slog_term::TermDecorator::new().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        slog_async::Async::new(drain).build().fuse()
    };

    match log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let json_drain = slog_json::Json::new(file)
                    .add_default_keys()
                    .build()
                    .fuse();
                let json_drain = slog_async::Async::new(json_drain).build().fuse();
                let both = slog::Duplicate::new(stdout_drain, json_drain).fuse();
                Logger::root(both.filter_level(level).fuse(), o!())
            }
            Err(e) => {
                let log = Logger::root(stdout_drain.filter_level(level).fuse(), o!());
                slog::warn!(log, "Failed to open log file, logging to stdout only";
                    "path" => path.display().to_string(), "error" => e.to_string());
                log
            }
        },
        None => Logger::root(stdout_drain.filter_level(level).fuse(), o!()),
    }
}

/// A logger that discards everything, for use in tests that construct services requiring a
/// `Logger` but don't care about its output.
pub fn test_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

fn parse_level(debug_level: &str) -> Level {
    match debug_level.to_ascii_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "warn" => Level::Warning,
        "error" => Level::Error,
        "crit" => Level::Critical,
        _ => Level::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognised_level_falls_back_to_info() {
        assert_eq!(parse_level("banana"), Level::Info);
        assert_eq!(parse_level("TRACE"), Level::Trace);
    }
}
