use tracing_subscriber::{
    fmt, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Builds the filter used by every bulkstep binary.
///
/// `RUST_LOG` wins when it is set, otherwise `log_level` applies to the
/// bulkstep crates and everything else is kept at `warn`.
pub fn get_log_env(log_level: String) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = log_level.to_lowercase();
        EnvFilter::new(format!(
            "warn,bulkstep={level},bulkstep_api={level},bulkstep_cli={level}"
        ))
    })
}

/// Installs a global fmt subscriber. Does nothing if one is already set.
pub fn init_logger(log_level: String) {
    let filter = get_log_env(log_level);
    Registry::default()
        .with(filter)
        .with(fmt::layer().with_span_events(FmtSpan::NONE))
        .try_init()
        .ok();
}

/// Installs a subscriber at the default level, convenient for tests.
pub fn global_info_logger() {
    init_logger(DEFAULT_LOG_LEVEL.to_string())
}
