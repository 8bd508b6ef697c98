//! Logging infrastructure for Access Warden.
//!
//! This module provides structured logging using the tracing ecosystem.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Crates whose output is enabled by the default filter.
///
/// The CLI binary logs under its binary name, `access_warden`.
const CRATES: [&str; 6] = [
    "aw_core",
    "aw_ingest",
    "aw_inspect",
    "aw_report",
    "aw_observability",
    "access_warden",
];

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level.
    pub level: Level,
    /// Whether to use JSON format.
    pub json_format: bool,
    /// Whether to include span events.
    pub include_spans: bool,
    /// Whether to include file/line info.
    pub include_location: bool,
    /// Whether to include thread IDs.
    pub include_thread_ids: bool,
    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            include_spans: false,
            include_location: false,
            include_thread_ids: false,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Creates a development configuration with more verbose output.
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            json_format: false,
            include_spans: true,
            include_location: true,
            include_thread_ids: true,
            include_target: true,
        }
    }

    /// Creates a production configuration with JSON output.
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            json_format: true,
            include_spans: false,
            include_location: false,
            include_thread_ids: false,
            include_target: true,
        }
    }

    /// Sets the level from its name (`trace` .. `error`), keeping the
    /// current level if the name is not recognised.
    pub fn with_level_name(mut self, name: &str) -> Self {
        if let Ok(level) = name.trim().parse::<Level>() {
            self.level = level;
        }
        self
    }

    /// Default filter directives, one per workspace crate.
    pub fn filter_directives(&self) -> String {
        let level = self.level.to_string().to_lowercase();
        CRATES
            .iter()
            .map(|krate| format!("{}={}", krate, level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Initializes the logging system with default configuration.
pub fn init_logging() {
    init_logging_with_config(LoggingConfig::default());
}

/// Initializes the logging system with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this
/// more than once leaves the first subscriber in place.
pub fn init_logging_with_config(config: LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let span_events = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let result = if config.json_format {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(span_events)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread_ids)
            .with_target(config.include_target);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(span_events)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread_ids)
            .with_target(config.include_target);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };

    if let Err(err) = result {
        tracing::debug!("Logging already initialized: {}", err);
    }
}

/// Creates a span for one inspection run.
#[macro_export]
macro_rules! run_span {
    ($run_date:expr) => {
        tracing::info_span!("inspection", run_date = %$run_date)
    };
    ($run_date:expr, $($field:tt)*) => {
        tracing::info_span!("inspection", run_date = %$run_date, $($field)*)
    };
}

/// Creates a span for a single rule evaluation.
#[macro_export]
macro_rules! rule_span {
    ($rule:expr, $run_date:expr) => {
        tracing::info_span!("rule", rule = %$rule, run_date = %$run_date)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.json_format);
    }

    #[test]
    fn test_production_config() {
        let config = LoggingConfig::production();
        assert_eq!(config.level, Level::INFO);
        assert!(config.json_format);
    }

    #[test]
    fn test_development_config() {
        let config = LoggingConfig::development();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.include_spans);
    }

    #[test]
    fn test_level_name() {
        let config = LoggingConfig::default().with_level_name("warn");
        assert_eq!(config.level, Level::WARN);

        let config = LoggingConfig::default().with_level_name("loud");
        assert_eq!(config.level, Level::INFO);
    }

    #[test]
    fn test_filter_directives_cover_every_crate() {
        let directives = LoggingConfig::development().filter_directives();
        assert!(directives.contains("aw_inspect=debug"));
        assert!(directives.contains("access_warden=debug"));
        assert_eq!(directives.split(',').count(), CRATES.len());
    }

    #[test]
    fn test_span_macros() {
        let _run = crate::run_span!("2024-06-01");
        let _rule = crate::rule_span!("idle", "2024-06-01");
    }
}
