//! Server configuration, entirely env-driven. Unknown env vars are ignored.

use std::time::Duration;

/// Runtime configuration read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP listener binds to. Defaults to 8080.
    pub port: u16,
    /// Whether out-of-process worker routing is requested. The in-process
    /// basket registry does not yet honor this; see [`Self::financials_http_url`].
    pub use_http_financials: bool,
    /// Base URL for an out-of-process financials worker, when
    /// `use_http_financials` is set.
    pub financials_http_url: Option<String>,
    /// Timeout applied to calls against `financials_http_url`.
    pub http_timeout: Duration,
}

impl ServerConfig {
    /// Build configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080),
            use_http_financials: std::env::var("USE_HTTP_FINANCIALS")
                .ok()
                .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1"),
            financials_http_url: std::env::var("FINANCIALS_HTTP_URL").ok(),
            http_timeout: std::env::var("HTTP_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(10)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_hold_when_no_env_vars_are_set() {
        let config = ServerConfig { port: 8080, use_http_financials: false, financials_http_url: None, http_timeout: Duration::from_secs(10) };
        assert_eq!(config.port, 8080);
        assert!(!config.use_http_financials);
    }
}
