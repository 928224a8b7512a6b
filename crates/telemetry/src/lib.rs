//! Tracing subscriber bootstrap with an optional rolling request-log file.

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

use bookit_kernel::settings::{LogFormat, LogRotation, TelemetrySettings};

/// Install the global subscriber.
///
/// The returned guard flushes the file sink on drop and must be held for
/// the lifetime of the process.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .with_context(|| format!("invalid log level '{}'", settings.level))?;

    let (writer, guard) = match &settings.log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(rotation(settings.rotation))
                .filename_prefix(settings.log_file.clone())
                .filename_suffix("log")
                .build(dir)
                .with_context(|| format!("failed to open log directory '{}'", dir))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (
                BoxMakeWriter::new(std::io::stdout.and(non_blocking)),
                Some(guard),
            )
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .try_init(),
    };

    if let Err(err) = installed {
        // A subscriber is already set (tests, embedding); keep using it.
        tracing::debug!(target: "bookit-telemetry", error = %err, "subscriber already installed");
    }

    tracing::info!(
        target: "bookit-telemetry",
        format = ?settings.log_format,
        log_dir = ?settings.log_dir,
        "telemetry initialized"
    );

    Ok(guard)
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Never => Rotation::NEVER,
    }
}
