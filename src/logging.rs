use std::fs;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";

/// Initializes logging: human-readable console output plus a daily-rotated
/// JSON file under `logs/`. `RUST_LOG` overrides the default filter.
pub fn init_logging(verbose: bool) {
    let _ = fs::create_dir_all(LOG_DIR);

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, "report_pipeline.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer().json().with_writer(file_writer);

    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stdout);

    let default_filter = if verbose {
        "report_pipeline=trace,debug"
    } else {
        "report_pipeline=debug,info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    // Keep the appender guard alive for the process lifetime so buffered
    // log lines are flushed on exit
    std::mem::forget(guard);
}
