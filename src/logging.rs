//! Logging setup.
//!
//! Library code only emits `tracing` events; the binary installs a
//! subscriber with [`init`]. Output goes to stderr so it never mixes with a
//! streamed reply on stdout.
//!
//! ## Environment Variables
//!
//! - `MONITOR_LOG` or `RUST_LOG`: filter directive (e.g. `monitor_assist=debug,warn`)
//! - `MONITOR_LOG_FORMAT`: `pretty` or `compact`

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_VAR: &str = "MONITOR_LOG";
pub const LOG_FORMAT_VAR: &str = "MONITOR_LOG_FORMAT";

const DEFAULT_FILTER: &str = "monitor_assist=info,warn";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line output
    #[default]
    Compact,
    /// Multi-line, human-readable
    Pretty,
}

impl LogFormat {
    /// Parse from string (case-insensitive). Unknown values mean compact.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive, in `EnvFilter` syntax
    pub filter: String,
    pub format: LogFormat,
    /// Include the module path of each event
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Compact,
            with_target: false,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let filter = lookup(LOG_VAR)
            .or_else(|| lookup("RUST_LOG"))
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        let format = lookup(LOG_FORMAT_VAR)
            .map(|s| LogFormat::parse(&s))
            .unwrap_or_default();

        Self {
            filter,
            format,
            ..Default::default()
        }
    }

    /// Everything from this crate at debug level.
    pub fn verbose() -> Self {
        Self {
            filter: "monitor_assist=debug,info".to_string(),
            with_target: true,
            ..Default::default()
        }
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(config: LogConfig) {
    let env_filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match config.format {
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(config.with_target),
            );
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(config.with_target),
            );
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(" PRETTY "), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("json"), LogFormat::Compact);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = LogConfig::from_lookup(|_| None);
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_from_lookup_prefers_monitor_log() {
        let config = LogConfig::from_lookup(|key| match key {
            LOG_VAR => Some("monitor_assist=trace".to_string()),
            "RUST_LOG" => Some("debug".to_string()),
            LOG_FORMAT_VAR => Some("pretty".to_string()),
            _ => None,
        });
        assert_eq!(config.filter, "monitor_assist=trace");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_from_lookup_falls_back_to_rust_log() {
        let config = LogConfig::from_lookup(|key| (key == "RUST_LOG").then(|| "warn".to_string()));
        assert_eq!(config.filter, "warn");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(LogConfig::default());
        init(LogConfig::verbose());
    }
}
