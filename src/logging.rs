//! Stderr log sink.
//!
//! The filter comes from `AI_CLI_LOG` (EnvFilter syntax) when set, else from
//! the `-v` count. Records never go to stdout.

use std::io;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "AI_CLI_LOG";

pub type LoggingInitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Level directive for a `-v` count: 0 warn, 1 info, 2 debug, 3+ trace.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Picks the filter directive: a non-blank env value wins over the `-v` count.
pub fn filter_directive(env_value: Option<&str>, verbosity: u8) -> String {
    match env_value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.to_string(),
        None => level_for_verbosity(verbosity).to_string(),
    }
}

/// Builds the filter for `directive`, falling back to the `-v` level when it
/// does not parse. The second value describes the rejected directive.
pub fn build_filter(directive: &str, verbosity: u8) -> (EnvFilter, Option<String>) {
    match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(error) => (
            EnvFilter::new(level_for_verbosity(verbosity)),
            Some(format!("ignoring invalid {LOG_ENV_VAR} value '{directive}': {error}")),
        ),
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(verbosity: u8) -> Result<(), LoggingInitError> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let directive = filter_directive(env_value.as_deref(), verbosity);
    let (filter, rejected) = build_filter(&directive, verbosity);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()?;

    if let Some(message) = rejected {
        tracing::warn!("{message}");
    }
    tracing::debug!(%directive, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::{build_filter, filter_directive, level_for_verbosity, LOG_ENV_VAR};

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for_verbosity(0), "warn");
        assert_eq!(level_for_verbosity(1), "info");
        assert_eq!(level_for_verbosity(2), "debug");
        assert_eq!(level_for_verbosity(3), "trace");
        assert_eq!(level_for_verbosity(9), "trace");
    }

    #[test]
    fn env_directive_overrides_verbosity() {
        assert_eq!(
            filter_directive(Some("session_store=debug"), 0),
            "session_store=debug"
        );
        assert_eq!(filter_directive(Some("   "), 2), "debug");
        assert_eq!(filter_directive(None, 1), "info");
    }

    #[test]
    fn unparsable_directive_falls_back_to_verbosity_level() {
        let (filter, rejected) = build_filter("session_store=loud", 1);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        let message = rejected.expect("bad directive should be reported");
        assert!(message.contains(LOG_ENV_VAR), "{message}");
        assert!(message.contains("session_store=loud"), "{message}");
    }

    #[test]
    fn valid_directive_is_kept() {
        let (filter, rejected) = build_filter("session_store=debug", 0);
        assert!(rejected.is_none());
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
