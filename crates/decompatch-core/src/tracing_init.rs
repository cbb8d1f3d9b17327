//! Tracing/logging initialization.
//!
//! Logs go to stderr through an env-filter. `DECOMPATCH_LOG_JSON` switches
//! the format to JSON lines.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable switching log output to JSON lines.
pub const LOG_JSON_ENV: &str = "DECOMPATCH_LOG_JSON";

/// Whether JSON log output was requested through the environment.
pub fn log_json_from_env() -> bool {
    std::env::var(LOG_JSON_ENV).is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Filter from `RUST_LOG` directives, or `default_filter` when they are
/// unset, blank or unparsable.
fn env_filter(default_filter: &str, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter))
}

/// Install the global subscriber. `default_filter` applies when `RUST_LOG`
/// gives nothing usable (e.g. `"decompatch=info"`).
pub fn init_tracing(default_filter: &str) {
    let filter = env_filter(default_filter, std::env::var("RUST_LOG").ok().as_deref());
    let (json, text) = if log_json_from_env() {
        (Some(fmt::layer().json().with_writer(std::io::stderr)), None)
    } else {
        let text = fmt::layer().with_target(false).with_writer(std::io::stderr);
        (None, Some(text))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .init();
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn truthy_values() {
        for v in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(is_truthy(v), "{v} should be truthy");
        }
        for v in ["", "0", "false", "off", "json"] {
            assert!(!is_truthy(v), "{v} should not be truthy");
        }
    }

    #[test]
    fn rust_log_overrides_default_filter() {
        let filter = env_filter("decompatch=info", Some("decompatch=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn unusable_rust_log_falls_back_to_default() {
        for rust_log in [None, Some(""), Some("  "), Some("decompatch=loud")] {
            let filter = env_filter("decompatch=debug", rust_log);
            assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG), "{rust_log:?}");
        }
    }
}
