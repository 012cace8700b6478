//! Log level and format selection for the `sfl` binary.
//!
//! Precedence, lowest first: built-in default (`info`, human), `SFL_LOG` /
//! `SFL_LOG_FORMAT`, then `--log-level` / `--log-format`. A valid `RUST_LOG`
//! replaces the level filter entirely (see [`super::init_logging`]).

use clap::ValueEnum;
use std::fmt;
use tracing_subscriber::filter::LevelFilter;

pub const ENV_LOG_LEVEL: &str = "SFL_LOG";
pub const ENV_LOG_FORMAT: &str = "SFL_LOG_FORMAT";

/// Shape of the lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Compact text lines.
    #[default]
    Human,
    /// One JSON object per event.
    #[value(alias = "json")]
    Jsonl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
    #[value(alias = "none", alias = "quiet")]
    Off,
}

fn write_value_name<E: ValueEnum>(value: &E, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.to_possible_value() {
        Some(v) => f.write_str(v.get_name()),
        None => Ok(()),
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value_name(self, f)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value_name(self, f)
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl LogConfig {
    /// Read `SFL_LOG` and `SFL_LOG_FORMAT`, then apply the CLI flags.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        let env_level = std::env::var(ENV_LOG_LEVEL).ok();
        let env_format = std::env::var(ENV_LOG_FORMAT).ok();
        Self::resolve(
            env_level.as_deref(),
            env_format.as_deref(),
            cli_level,
            cli_format,
        )
    }

    /// Unparseable environment values fall back to the default with a
    /// warning on stderr; the subscriber is not installed yet at this point.
    fn resolve(
        env_level: Option<&str>,
        env_format: Option<&str>,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        LogConfig {
            level: cli_level
                .or_else(|| env_level.and_then(|v| parse_env(ENV_LOG_LEVEL, v)))
                .unwrap_or_default(),
            format: cli_format
                .or_else(|| env_format.and_then(|v| parse_env(ENV_LOG_FORMAT, v)))
                .unwrap_or_default(),
        }
    }
}

fn parse_env<E: ValueEnum>(var: &str, value: &str) -> Option<E> {
    match E::from_str(value.trim(), true) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            eprintln!("sfl: ignoring {}={:?}", var, value);
            None
        }
    }
}
