//! Structured Logging Configuration
//!
//! Two output shapes:
//! - JSON lines for log aggregation (`LOG_FORMAT=json`)
//! - Human-readable text for development (default)
//!
//! Output goes to stderr so that the single-event `invoke` mode can keep
//! stdout for the response document.
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: `json` or `text` (default: text)
//! - `RUST_LOG`: standard filter directives (default: info)
//!   Examples: `RUST_LOG=debug`, `RUST_LOG=ua_platform=debug,tower_http=info`
//!
//! # Usage
//!
//! ```rust,ignore
//! use ua_common::logging::init_logging;
//!
//! init_logging("ua-server");
//! tracing::info!(role = %name, "Role created");
//! ```

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value. Anything other than `json` is text.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    /// Read the format from the `LOG_FORMAT` environment variable.
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("LOG_FORMAT").unwrap_or_default())
    }
}

/// Install the global subscriber for `service_name`.
///
/// Returns `false` when a subscriber was already installed (for example when
/// a test harness set one up first); the existing subscriber is kept.
pub fn init_logging(service_name: &str) -> bool {
    let format = LogFormat::from_env();
    let env_filter = default_filter();

    let installed = match format {
        LogFormat::Json => init_json_logging(env_filter),
        LogFormat::Text => init_text_logging(env_filter),
    };

    if installed {
        tracing::debug!(service = service_name, ?format, "Logging initialised");
    }
    installed
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_json_logging(env_filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .flatten_event(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .try_init()
        .is_ok()
}

fn init_text_logging(env_filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(true),
        )
        .try_init()
        .is_ok()
}
