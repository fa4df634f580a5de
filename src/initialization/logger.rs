//! Logger initialization.
//!
//! Logs always go to stderr: in `probe` mode stdout carries the JSON result.
//! Records from this crate are shown under their component (`fetch::executor`,
//! `cache`, ...) so a hop-by-hop trace reads without the crate prefix.

use std::io::{IsTerminal, Write};

use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Record};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// HTTP stack crates whose connection-level chatter would drown the
/// per-hop trace; they only log above `warn` unless tracing is requested.
const HTTP_STACK_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "h2", "tower", "axum"];

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first, then `level` overrides it for this crate.
///
/// ```bash
/// RUST_LOG=stream_probe=debug stream_probe probe http://example.com/live.m3u8
/// stream_probe --log-level debug --log-format json serve
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already set.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(std::io::stderr().is_terminal());

    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stderr);
    builder.filter_level(level);

    let stack_level = if level == LevelFilter::Trace {
        LevelFilter::Trace
    } else {
        LevelFilter::Warn
    };
    for target in HTTP_STACK_TARGETS {
        builder.filter_module(target, stack_level);
    }
    builder.filter_module(env!("CARGO_CRATE_NAME"), level);

    match format {
        LogFormat::Json => builder.format(|buf, record| writeln!(buf, "{}", json_line(record))),
        LogFormat::Plain => builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:>5} {}: {}",
                chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                paint(record.level()),
                component(record.target()).cyan(),
                record.args()
            )
        }),
    };

    builder.try_init().map_err(InitializationError::from)
}

/// Module path relative to this crate; foreign targets are kept whole.
fn component(target: &str) -> &str {
    target
        .strip_prefix(env!("CARGO_CRATE_NAME"))
        .and_then(|rest| rest.strip_prefix("::"))
        .unwrap_or(target)
}

fn paint(level: Level) -> ColoredString {
    let name = level.as_str();
    match level {
        Level::Error => name.red().bold(),
        Level::Warn => name.yellow(),
        Level::Info => name.green(),
        Level::Debug => name.blue(),
        Level::Trace => name.purple(),
    }
}

/// One JSON object per record, for log shippers.
fn json_line(record: &Record<'_>) -> String {
    serde_json::json!({
        "ts": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "level": record.level().as_str(),
        "component": component(record.target()),
        "msg": record.args().to_string(),
    })
    .to_string()
}
