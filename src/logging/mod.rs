//! Logging setup
//!
//! The subscriber is built explicitly and handed back to the caller instead of
//! being installed globally. The CLI scopes it to one run with
//! `tracing::subscriber::set_default`, and tests do the same with a capturing
//! writer.

use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::SetupError;

/// Accepted values for `--log-level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
}

impl LogLevel {
    /// Filter directive for this level.
    ///
    /// Client libraries are held one notch quieter at debug so the connection
    /// and signing chatter doesn't drown out the report trace.
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => {
                "debug,mongodb=info,hyper=info,hyper_util=info,rustls=info,\
                 aws_config=info,aws_smithy_runtime=info,aws_sigv4=info"
            }
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = SetupError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(SetupError::InvalidLogLevel(value.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Build a subscriber writing formatted events at `level` to `writer`
pub fn subscriber<W>(level: LogLevel, writer: W, ansi: bool) -> impl Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.directive()))
        .with_writer(writer)
        .with_target(false)
        .with_ansi(ansi)
        .finish()
}

/// Subscriber for the process, writing to stderr
pub fn stderr_subscriber(level: LogLevel) -> impl Subscriber + Send + Sync {
    subscriber(level, std::io::stderr, std::io::stderr().is_terminal())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("Warning".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("error".parse::<LogLevel>().unwrap(), LogLevel::Error);
    }

    #[test]
    fn test_invalid_log_levels_rejected() {
        for value in ["critical", "warn", "trace", "", "verbose"] {
            let err = value.parse::<LogLevel>().unwrap_err();
            assert!(matches!(err, SetupError::InvalidLogLevel(ref v) if v == value));
        }
    }

    #[test]
    fn test_default_level_is_warning() {
        assert_eq!(LogLevel::default(), LogLevel::Warning);
        assert_eq!(LogLevel::default().to_string(), "warning");
    }

    #[test]
    fn test_captured_subscriber_respects_level() {
        let (subscriber, logs) = capture::subscriber(LogLevel::Warning);
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden detail");
            tracing::warn!("visible warning");
        });

        let output = logs.contents();
        assert!(output.contains("visible warning"));
        assert!(!output.contains("hidden detail"));
    }

    #[test]
    fn test_debug_level_emits_debug_events() {
        let (subscriber, logs) = capture::subscriber(LogLevel::Debug);
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("message body is: hello");
        });

        assert!(logs.contents().contains("message body is: hello"));
    }
}
