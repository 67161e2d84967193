use std::env;

use foundation::time::Time;
use scene::hover::DEFAULT_HOVER_DEBOUNCE_S;

pub const HOVER_DEBOUNCE_ENV: &str = "GEOMAP_HOVER_DEBOUNCE_MS";
pub const TEARDOWN_WAIT_ENV: &str = "GEOMAP_TEARDOWN_WAIT_MS";

/// How long teardown waits for outstanding acknowledgements before it
/// destroys the view anyway.
pub const DEFAULT_TEARDOWN_WAIT_S: f64 = 5.0;

/// Per-session timing policy.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SessionConfig {
    /// Minimum seconds between two hover emissions.
    pub hover_debounce_s: f64,
    /// Bounded teardown wait, in seconds.
    pub teardown_wait_s: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hover_debounce_s: DEFAULT_HOVER_DEBOUNCE_S,
            teardown_wait_s: DEFAULT_TEARDOWN_WAIT_S,
        }
    }
}

impl SessionConfig {
    /// Defaults, overridden by `GEOMAP_HOVER_DEBOUNCE_MS` and
    /// `GEOMAP_TEARDOWN_WAIT_MS` when they parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            hover_debounce_s: env_var_millis(HOVER_DEBOUNCE_ENV, defaults.hover_debounce_s),
            teardown_wait_s: env_var_millis(TEARDOWN_WAIT_ENV, defaults.teardown_wait_s),
        }
    }
}

fn env_var_millis(key: &str, default_s: f64) -> f64 {
    parse_millis(env::var(key).ok().as_deref()).unwrap_or(default_s)
}

fn parse_millis(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .map(|ms| Time::from_millis(ms).seconds())
}

#[cfg(test)]
mod tests {
    use super::{SessionConfig, parse_millis};

    #[test]
    fn documented_defaults() {
        let c = SessionConfig::default();
        assert_eq!(c.hover_debounce_s, 0.1);
        assert_eq!(c.teardown_wait_s, 5.0);
    }

    #[test]
    fn millis_parse() {
        assert_eq!(parse_millis(Some("250")), Some(0.25));
        assert_eq!(parse_millis(Some(" 0 ")), Some(0.0));
        assert_eq!(parse_millis(Some("-5")), None);
        assert_eq!(parse_millis(Some("soon")), None);
        assert_eq!(parse_millis(None), None);
    }
}
