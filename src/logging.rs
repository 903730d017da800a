use crate::config::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Keeps the file writer flushing until the process exits.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber. Human-readable logs go to stderr so
/// stdout only carries command output; `log_dir` adds a JSON file layer.
pub fn init_logging(config: &Config) -> LogGuard {
    let env_filter = EnvFilter::try_from_env("LINKVAULT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = rolling::daily(dir, "linkvault.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false) // No ANSI colors in file
                .json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    LogGuard { _file: guard }
}
