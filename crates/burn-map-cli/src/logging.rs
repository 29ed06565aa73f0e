/*!
Logging setup for the command-line harness.

Logs go to stderr so the render plan on stdout stays machine readable. When the
`profiling` feature is enabled, library scopes are emitted as tracing spans.
*/

use tracing_subscriber::prelude::*;

/// Initialize logging with sensible defaults
///
/// Behavior:
/// - `RUST_LOG` wins when set.
/// - Otherwise debug builds log at DEBUG and release builds at INFO.
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    #[cfg(feature = "profiling")]
    tracing::info!("Logging initialized (profiling scopes enabled)");
    #[cfg(not(feature = "profiling"))]
    tracing::debug!("Logging initialized");
}
