//! Survey configuration.

use std::time::Duration;

use crate::aggregate::HiddenNetworkPolicy;
use crate::error::ConfigError;

/// Interval used when none is given, in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Interface scanned when none is given.
pub const DEFAULT_INTERFACE: &str = "wlan1";

/// Configuration for a survey run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyConfig {
    /// Delay between the end of one cycle and the start of the next, in milliseconds
    pub interval_ms: u64,
    /// Wireless interface to scan
    pub interface: String,
    /// Handling of access points without a network name
    pub hidden_policy: HiddenNetworkPolicy,
    /// Clear the terminal before each render
    pub clear_screen: bool,
    /// Read the driver's cached scan results instead of triggering a scan
    pub cached_scan: bool,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            interface: DEFAULT_INTERFACE.to_owned(),
            hidden_policy: HiddenNetworkPolicy::Drop,
            clear_screen: true,
            cached_scan: false,
        }
    }
}

impl SurveyConfig {
    /// Create a new configuration builder
    pub fn builder() -> SurveyConfigBuilder {
        SurveyConfigBuilder::default()
    }

    /// The inter-cycle delay.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Builder for SurveyConfig
#[derive(Debug, Default)]
pub struct SurveyConfigBuilder {
    config: SurveyConfig,
}

impl SurveyConfigBuilder {
    /// Set scan interval in milliseconds (at least 1)
    pub fn interval_ms(mut self, interval_ms: u64) -> Self {
        self.config.interval_ms = interval_ms.max(1);
        self
    }

    /// Set the interface to scan
    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.config.interface = interface.into();
        self
    }

    /// Set hidden network handling
    pub fn hidden_policy(mut self, policy: HiddenNetworkPolicy) -> Self {
        self.config.hidden_policy = policy;
        self
    }

    /// Enable/disable clearing the screen between renders
    pub fn clear_screen(mut self, enabled: bool) -> Self {
        self.config.clear_screen = enabled;
        self
    }

    /// Enable/disable cached scans
    pub fn cached_scan(mut self, enabled: bool) -> Self {
        self.config.cached_scan = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> SurveyConfig {
        self.config
    }
}

/// Parse a user-supplied interval in milliseconds.
///
/// Accepts a positive decimal integer with optional surrounding whitespace.
/// Zero, negative numbers, fractions and trailing garbage are rejected.
pub fn parse_interval(input: &str) -> Result<u64, ConfigError> {
    match input.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigError::InvalidInterval {
            input: input.to_owned(),
        }),
    }
}
