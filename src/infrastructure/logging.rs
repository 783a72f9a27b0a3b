//! Tracing subscriber setup

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Directives appended to the configured level to keep dependency noise down
const QUIET_DEPENDENCIES: &[&str] = &["sqlx=warn", "hyper=warn", "tower_http=info"];

/// Install the global subscriber
///
/// `RUST_LOG` replaces the configured level entirely. Calling this twice
/// keeps the first subscriber.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| build_filter(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_span_events(FmtSpan::CLOSE))
            .try_init(),
    };

    match installed {
        Ok(()) => {
            tracing::info!(format = ?config.format, level = %config.level, "Logging initialized")
        }
        Err(e) => tracing::debug!(error = %e, "Subscriber already installed"),
    }
}

/// Filter for `level`, falling back to `info` when the directive is invalid
fn build_filter(level: &str) -> EnvFilter {
    let directives = std::iter::once(level)
        .chain(QUIET_DEPENDENCIES.iter().copied())
        .collect::<Vec<_>>()
        .join(",");

    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
}
