//! Client configuration.

use std::time::Duration;

use checkin_core::ApiUrl;

/// Default per-request timeout, also the upper bound on a token refresh.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for an [`AuthClient`](crate::AuthClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: ApiUrl,
    timeout: Duration,
    user_agent: String,
}

impl ClientConfig {
    /// Configuration for the given backend with default timeout and user agent.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("checkin/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::new(ApiUrl::new("https://checkin.example.com").unwrap());
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert!(config.user_agent().starts_with("checkin/"));
    }

    #[test]
    fn overrides() {
        let config = ClientConfig::new(ApiUrl::new("http://localhost:3001").unwrap())
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("field-app/2.0");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.user_agent(), "field-app/2.0");
    }
}
