//! Logging context handed to every orchestrator.
//!
//! The CLI builds one [`LogContext`] per invocation from [`LogOptions`]; orchestrators
//! run their work inside it instead of relying on a process-global subscriber.
//! Tests build one from any subscriber, typically a registry with a capturing layer.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, Subscriber};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "console" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other:?}, expected text or json")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub level: LevelFilter,
    pub format: LogFormat,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Text,
        }
    }
}

/// An explicitly constructed logger, shared read-only for one CLI invocation.
#[derive(Clone)]
pub struct LogContext {
    dispatch: Dispatch,
}

impl fmt::Debug for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogContext").finish_non_exhaustive()
    }
}

impl LogContext {
    /// Structured logger writing to standard error. `RUST_LOG` directives, when set,
    /// are layered on top of `options.level`.
    pub fn new(options: LogOptions) -> Self {
        let filter = EnvFilter::builder()
            .with_default_directive(options.level.into())
            .from_env_lossy();
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr);

        let dispatch = match options.format {
            LogFormat::Text => Dispatch::new(builder.finish()),
            LogFormat::Json => Dispatch::new(builder.json().finish()),
        };
        Self { dispatch }
    }

    pub fn from_subscriber<S>(subscriber: S) -> Self
    where
        S: Subscriber + Send + Sync + 'static,
    {
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Discards everything.
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Runs `fut` with this context as the active subscriber.
    pub async fn scope<F>(&self, fut: F) -> F::Output
    where
        F: Future,
    {
        fut.with_subscriber(self.dispatch.clone()).await
    }

    /// Runs `f` with this context as the active subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("TEXT".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert_eq!("console".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
