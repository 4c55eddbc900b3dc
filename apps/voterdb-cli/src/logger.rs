use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use voterdb_core::config::{LogFormat, LogSettings};

/// Default directives when `RUST_LOG` is unset: our crates at the configured
/// level, everything else at warn.
pub fn default_directives(level: &str) -> String {
    format!("voterdb={level},sqlx=warn,warn")
}

/// Installs the global subscriber. Logs go to stderr so stdout stays
/// machine-readable.
pub fn init(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(&settings.level)));

    let fmt_layer = match settings.format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).with_target(false).compact().boxed(),
        LogFormat::Json => fmt::layer().with_writer(std::io::stderr).with_ansi(false).json().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}
