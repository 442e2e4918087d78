//! Tracing initialization for the Lambda function.
//!
//! JSON output is the default and suits CloudWatch Logs; text output is meant
//! for local runs.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format, selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl LogFormat {
    /// Accepts "json", "text", or "pretty" (alias for text).
    /// Anything else falls back to `Json`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

/// Initialize tracing for the Lambda.
///
/// Call once at the start of `main`, before `lambda_http::run()`. The level
/// comes from `RUST_LOG` and defaults to `info`.
///
/// # Example
///
/// ```no_run
/// use restaurant_lambda_shared::{init_tracing, LogFormat};
///
/// init_tracing(LogFormat::Json);
/// ```
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .flatten_event(true);
            registry.with(fmt_layer).init();
        }
        LogFormat::Text => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("TEXT"), LogFormat::Text);
        assert_eq!(LogFormat::parse(" pretty "), LogFormat::Text);
        assert_eq!(LogFormat::parse("unknown"), LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Json);
    }
}
