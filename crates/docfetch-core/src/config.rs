use crate::extract::ExtractConfig;
use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Identity string presented to the site. A desktop Chrome UA gets past more
/// bot filters than the headless default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Text shown by the Cloudflare interstitial while it runs its checks.
pub const DEFAULT_CHALLENGE_MARKER: &str = "Just a moment";

pub const DEFAULT_OUTPUT_DIR: &str = "docs";

/// Settings for a single fetch-and-save run
///
/// Defaults reproduce the behaviour of the original doc fetcher; every
/// value can be overridden through the `with_*` builders.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Directory the `.html` and `.txt` artifacts are written to
    pub output_dir: PathBuf,
    /// User agent override applied before navigation
    pub user_agent: String,
    /// Upper bound for navigation plus the network-idle wait
    pub navigation_timeout: Duration,
    /// Number of in-flight requests still considered idle
    pub idle_connections: usize,
    /// How long the in-flight count must stay low to call the network idle
    pub idle_window: Duration,
    /// Body text whose presence means the challenge page is still showing
    pub challenge_marker: String,
    /// Upper bound for the best-effort challenge wait
    pub challenge_timeout: Duration,
    /// Interval between challenge checks
    pub challenge_poll: Duration,
    /// Fixed pause after the challenge wait for late content
    pub settle_delay: Duration,
    /// Content root and stripping rules for the text artifact
    pub extract: ExtractConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            navigation_timeout: Duration::from_secs(60),
            idle_connections: 2,
            idle_window: Duration::from_millis(500),
            challenge_marker: DEFAULT_CHALLENGE_MARKER.to_string(),
            challenge_timeout: Duration::from_secs(30),
            challenge_poll: Duration::from_millis(100),
            settle_delay: Duration::from_secs(3),
            extract: ExtractConfig::default(),
        }
    }
}

impl FetchConfig {
    /// Create a config with the default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_challenge_marker(mut self, marker: impl Into<String>) -> Self {
        self.challenge_marker = marker.into();
        self
    }

    pub fn with_challenge_timeout(mut self, timeout: Duration) -> Self {
        self.challenge_timeout = timeout;
        self
    }

    pub fn with_challenge_poll(mut self, interval: Duration) -> Self {
        self.challenge_poll = interval;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_extract(mut self, extract: ExtractConfig) -> Self {
        self.extract = extract;
        self
    }

    /// Check the settings that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(Error::InvalidConfig("user agent must not be empty".into()));
        }
        if self.navigation_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "navigation timeout must be greater than zero".into(),
            ));
        }
        if self.challenge_marker.is_empty() {
            return Err(Error::InvalidConfig(
                "challenge marker must not be empty".into(),
            ));
        }
        if self.challenge_poll.is_zero() {
            return Err(Error::InvalidConfig(
                "challenge poll interval must be greater than zero".into(),
            ));
        }
        self.extract.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_fetcher() {
        let config = FetchConfig::new();

        assert_eq!(config.output_dir, PathBuf::from("docs"));
        assert_eq!(config.navigation_timeout, Duration::from_secs(60));
        assert_eq!(config.challenge_timeout, Duration::from_secs(30));
        assert_eq!(config.settle_delay, Duration::from_secs(3));
        assert_eq!(config.challenge_marker, "Just a moment");
        assert_eq!(config.idle_connections, 2);
        assert!(config.user_agent.contains("Chrome/120.0.0.0"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders_override_fields() {
        let config = FetchConfig::new()
            .with_output_dir("/tmp/out")
            .with_settle_delay(Duration::ZERO)
            .with_challenge_timeout(Duration::from_secs(5));

        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.challenge_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validate_rejects_empty_user_agent() {
        let config = FetchConfig::new().with_user_agent("   ");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("user agent"));
    }

    #[test]
    fn test_validate_rejects_zero_navigation_timeout() {
        let config = FetchConfig::new().with_navigation_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_empty_marker() {
        let config = FetchConfig::new().with_challenge_marker("");
        assert!(config.validate().is_err());
    }
}
