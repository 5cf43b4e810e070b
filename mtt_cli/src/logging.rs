//! Tracing subscriber setup: console on stderr plus an optional file sink.

use std::path::Path;

use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tracing_appender::non_blocking::WorkerGuard;

/// Console level when neither `RUST_LOG`, `--log-level` nor the config
/// chooses one. Keeps stdout and stderr clean for scripted use.
const DEFAULT_LEVEL: &str = "warn";

/// Install the global subscriber. The returned guard flushes the file sink
/// when dropped; hold it until the process is about to exit.
pub fn init(
    json: bool,
    cli_level: Option<&str>,
    cfg: &mtt_config::Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    let level = cli_level
        .or(cfg.level.as_deref())
        .unwrap_or(DEFAULT_LEVEL);
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("invalid log level {level}"))?,
    };

    let mut file_guard = None;
    let file_layer = match cfg.file.as_deref() {
        Some(path) => {
            let appender = rolling_appender(Path::new(path), cfg.rotation.as_deref());
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_guard = Some(guard);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer),
            )
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    let installed = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    installed.wrap_err("install tracing subscriber")?;
    Ok(file_guard)
}

fn rolling_appender(
    path: &Path,
    rotation: Option<&str>,
) -> tracing_appender::rolling::RollingFileAppender {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map_or_else(|| "mtt.log".into(), |n| n.to_string_lossy().into_owned());
    match rotation {
        Some("daily") => tracing_appender::rolling::daily(dir, name),
        Some("hourly") => tracing_appender::rolling::hourly(dir, name),
        _ => tracing_appender::rolling::never(dir, name),
    }
}
