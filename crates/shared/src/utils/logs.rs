use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use std::path::Path;
use tracing_appender::{
    non_blocking,
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

const OTEL_FILTER: &str = "info,hyper=off,opentelemetry=off,tonic=off,h2=off,reqwest=off";

/// Daily-rolling `rust_app_<component>.log` under `log_dir`, written from a
/// background worker that flushes when the guard drops.
pub fn rolling_file_writer(
    log_dir: impl AsRef<Path>,
    component: &str,
) -> (NonBlocking, WorkerGuard) {
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        log_dir,
        format!("rust_app_{component}.log"),
    );
    non_blocking(file_appender)
}

/// Installs the global subscriber.
///
/// The console layer honours `RUST_LOG` and prints pretty output in dev mode,
/// JSON otherwise. When `enable_file` is set a daily-rolling JSON file is
/// written as well; keep the returned guard alive until shutdown so buffered
/// lines are flushed.
pub fn init_logger(
    sdk_logger_provider: SdkLoggerProvider,
    component: &str,
    is_dev: bool,
    enable_file: bool,
) -> Option<WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = if is_dev {
        fmt::layer()
            .pretty()
            .with_thread_names(true)
            .with_ansi(true)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_filter(console_filter)
            .boxed()
    };

    let (file_layer, guard) = if enable_file {
        let log_dir = if is_dev { "./logs" } else { "/var/log/app" };
        let (file_writer, guard) = rolling_file_writer(log_dir, component);

        let layer = fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .json()
            .with_filter(EnvFilter::new("info"))
            .boxed();

        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let otel_layer = OpenTelemetryTracingBridge::new(&sdk_logger_provider)
        .with_filter(EnvFilter::new(OTEL_FILTER));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(otel_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Write};

    #[test]
    fn file_writer_flushes_on_guard_drop() {
        let dir = std::env::temp_dir().join(format!("storefront-logs-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let (mut writer, guard) = rolling_file_writer(&dir, "checkout");
        writer.write_all(b"{\"message\":\"order placed\"}\n").unwrap();
        drop(guard);

        let written: String = fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("rust_app_checkout.log")
            })
            .map(|entry| fs::read_to_string(entry.path()).unwrap())
            .collect();
        assert!(written.contains("order placed"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
