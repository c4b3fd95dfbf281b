//! Logging configuration for the terminal shell.
//!
//! Logs go to stderr so they never interleave with the quiz on stdout.
//! `RUST_LOG` wins when set; otherwise `QUIZ_DEBUG_LOGGING=1` enables debug
//! output for the workspace crates.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_DIRECTIVE: &str = "warn";
const DEBUG_DIRECTIVE: &str = "warn,app=debug,services=debug,storage=debug,quiz_core=debug";

/// Install the global subscriber. Call once, before spawning the quiz.
pub fn init() {
    let debug_logging = debug_logging_enabled(std::env::var("QUIZ_DEBUG_LOGGING").ok().as_deref());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(debug_logging)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    tracing::debug!(debug_logging, "logging initialized");
}

fn debug_logging_enabled(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("1" | "true"))
}

fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        DEBUG_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_accepts_one_and_true() {
        assert!(debug_logging_enabled(Some("1")));
        assert!(debug_logging_enabled(Some(" true ")));
        assert!(!debug_logging_enabled(Some("0")));
        assert!(!debug_logging_enabled(None));
    }

    #[test]
    fn directives_parse() {
        for debug in [false, true] {
            let directive = filter_directive(debug);
            assert!(EnvFilter::try_new(directive).is_ok(), "{directive}");
        }
        assert!(filter_directive(true).contains("services=debug"));
    }
}
