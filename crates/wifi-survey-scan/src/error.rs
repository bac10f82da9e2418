//! Error types for the wifi-survey-scan crate.
//!
//! - [`ScanError`]: failures reported by a scan provider, either while opening
//!   the radio (setup) or during a single scan cycle (transient).
//! - [`ConfigError`]: invalid user-supplied configuration.
//! - [`ControllerError`]: failures that end the scan loop itself.

use thiserror::Error;

/// A specialized `Result` type for provider operations.
pub type ProviderResult<T> = Result<T, ScanError>;

/// Errors reported by a scan provider.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScanError {
    /// The named network interface does not exist.
    #[error("interface '{interface}' does not exist")]
    InterfaceNotFound {
        /// The interface that was requested.
        interface: String,
    },

    /// The interface exists but has no wireless extensions / nl80211 phy.
    #[error("interface '{interface}' is not a wireless interface")]
    NotWireless {
        /// The interface that was requested.
        interface: String,
    },

    /// The radio's frequency table could not be read.
    #[error("failed to read frequency table for '{interface}': {reason}")]
    FrequencyTable {
        /// The interface whose phy was queried.
        interface: String,
        /// What went wrong.
        reason: String,
    },

    /// Failed to execute the scan subprocess.
    #[error("scan process error: {0}")]
    Process(String),

    /// The scan backend returned an error.
    #[error("WiFi scan failed: {reason}")]
    ScanFailed {
        /// Human-readable description of what went wrong.
        reason: String,
    },

    /// Failed to parse a MAC address string (expected `aa:bb:cc:dd:ee:ff`).
    #[error("failed to parse MAC address from '{input}': expected aa:bb:cc:dd:ee:ff")]
    MacParseFailed {
        /// The input string that could not be parsed.
        input: String,
    },

    /// Failed to parse scan output.
    #[error("scan output parse error: {0}")]
    Parse(String),

    /// No channel is known for a detected frequency.
    #[error("failed to get channel for frequency {frequency_hz} Hz")]
    ChannelUnresolved {
        /// The frequency that could not be mapped.
        frequency_hz: f64,
    },
}

impl ScanError {
    /// Whether this error can only occur while opening a provider.
    ///
    /// Setup errors abort startup; everything else fails a single cycle.
    #[must_use]
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::InterfaceNotFound { .. } | Self::NotWireless { .. } | Self::FrequencyTable { .. }
        )
    }
}

/// Invalid configuration supplied by the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The interval argument is not a positive integer number of milliseconds.
    #[error("Not a valid interval.")]
    InvalidInterval {
        /// The rejected input.
        input: String,
    },
}

/// Failures that stop the scan loop.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// The blocking scan task panicked and the provider handle went with it.
    #[error("scan task failed and the provider was lost: {0}")]
    ProviderLost(String),

    /// Writing the rendered table failed.
    #[error("render failed: {0}")]
    Render(#[from] std::io::Error),
}
