use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber: stdout plus, when a directory is
/// configured, a daily rolling file.
///
/// The returned guard flushes the file writer on drop, so the caller must
/// keep it alive for the lifetime of the process.
pub fn init_tracing(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init();

    if let Err(e) = result {
        // Only happens when a subscriber is already installed (e.g. in tests).
        eprintln!("Tracing was already initialized: {e}");
        return guard;
    }
    tracing::debug!(
        level = %settings.level,
        directory = ?settings.directory,
        "Logging initialized."
    );
    guard
}
