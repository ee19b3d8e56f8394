use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Stderr verbosity derived from the run flags.
pub fn level_for(silent: bool, verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else if silent {
        "warn"
    } else {
        "info"
    }
}

/// Install the global subscriber: human-readable events on stderr and, with
/// `trace_dir`, a JSON-lines copy including span timings. `RUST_LOG`
/// overrides `level`. Keep the returned guard alive until exit so the file
/// writer flushes.
pub fn init_logging(level: &str, trace_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bold_core={level},bold_cli={level}")));
    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    match trace_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::never(dir, "boldtool-trace.jsonl");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let json = fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(json)
                .try_init()
                .ok();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .try_init()
                .ok();
            None
        }
    }
}
