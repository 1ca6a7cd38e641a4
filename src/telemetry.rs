use anyhow::{Context, Result};
use configuration::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber: human-readable logs on stderr, plus a daily rolling log
/// file when `settings.directory` is set.
///
/// The returned guard flushes the file writer on drop and must be held until exit.
pub fn init(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    // RUST_LOG wins over the configured level.
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("Invalid log level '{}'", settings.level))?,
    };

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "tearsheet.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()
                .context("Failed to install tracing subscriber")?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .context("Failed to install tracing subscriber")?;
            Ok(None)
        }
    }
}
