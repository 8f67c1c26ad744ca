//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log-level` nor `RUST_LOG` is set
pub const DEFAULT_FILTER: &str = "info";

/// Resolve the log filter; an explicit directive wins over `RUST_LOG`
#[must_use]
pub fn env_filter(explicit: Option<&str>) -> EnvFilter {
    match explicit {
        Some(directive) => {
            EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
        }
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Install the global subscriber, logging to stderr
pub fn init(explicit: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(explicit))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directive_is_used() {
        let filter = env_filter(Some("talkbanner_core=debug"));
        assert_eq!(filter.to_string(), "talkbanner_core=debug");
    }

    #[test]
    fn invalid_directive_falls_back() {
        let filter = env_filter(Some("talkbanner=loud"));
        assert_eq!(filter.to_string(), EnvFilter::new(DEFAULT_FILTER).to_string());
    }
}
