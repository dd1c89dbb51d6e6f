//! Resilience configuration with builder pattern
//!
//! Bundles the retry policy with the request timeouts applied by the HTTP
//! document store.

use super::retry::RetryConfig;
use std::time::Duration;

/// Resilience settings for document store calls
#[derive(Debug, Clone, PartialEq)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ResilienceConfig {
    pub fn builder() -> ResilienceConfigBuilder {
        ResilienceConfigBuilder::new()
    }

    /// Fewer retries and shorter waits, for shared servers
    pub fn conservative() -> Self {
        Self {
            retry: RetryConfig::conservative(),
            request_timeout: Duration::from_secs(20),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Patient settings for a local development server
    pub fn development() -> Self {
        Self {
            retry: RetryConfig::aggressive(),
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Single attempt with short timeouts (for testing)
    pub fn disabled() -> Self {
        Self {
            retry: RetryConfig::disabled(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

/// Builder for ResilienceConfig
#[derive(Debug, Default)]
pub struct ResilienceConfigBuilder {
    config: ResilienceConfig,
}

impl ResilienceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn max_retries(mut self, attempts: u32) -> Self {
        self.config.retry.max_attempts = attempts;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> ResilienceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = ResilienceConfig::builder()
            .max_retries(7)
            .request_timeout(Duration::from_secs(3))
            .build();

        assert_eq!(config.retry.max_attempts, 7);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_disabled_preset_never_retries() {
        assert_eq!(ResilienceConfig::disabled().retry.max_attempts, 1);
    }
}
