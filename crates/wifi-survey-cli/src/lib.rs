//! wifi-survey CLI
//!
//! Terminal site survey: repeatedly scans the access points a wireless
//! interface can hear and prints them grouped by network name, weakest first.
//!
//! # Usage
//!
//! ```bash
//! # Scan wlan1 once a second
//! wifi-survey
//!
//! # Scan wlan0 every 2.5 seconds, showing hidden networks
//! wifi-survey 2500 wlan0 --show-hidden
//!
//! # Read the driver's cached results without triggering scans
//! wifi-survey 1000 wlan0 --cached
//! ```

use clap::Parser;

use wifi_survey_scan::{parse_interval, ConfigError, HiddenNetworkPolicy, SurveyConfig};

/// wifi-survey Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "wifi-survey")]
#[command(author, version, about = "Periodic WiFi access point survey grouped by network name")]
pub struct Cli {
    /// Delay between scans in milliseconds (default 1000)
    #[arg(value_name = "intervalMilliseconds", allow_hyphen_values = true)]
    pub interval: Option<String>,

    /// Wireless interface to scan (default wlan1)
    #[arg(value_name = "interfaceName")]
    pub interface: Option<String>,

    /// List access points without a network name under "HIDDEN"
    #[arg(long)]
    pub show_hidden: bool,

    /// Name to list hidden access points under (implies --show-hidden)
    #[arg(long, value_name = "TEXT")]
    pub hidden_label: Option<String>,

    /// Read cached scan results instead of triggering a new scan
    #[arg(long)]
    pub cached: bool,

    /// Do not clear the terminal before each table
    #[arg(long)]
    pub no_clear: bool,

    /// Trailing arguments, accepted and ignored
    #[arg(hide = true)]
    pub ignored: Vec<String>,
}

impl Cli {
    /// Validate the arguments and turn them into a survey configuration.
    ///
    /// The interval is checked first; anything in its position that is not a
    /// known flag, including `-x`, is taken as the interval and rejected.
    pub fn into_config(self) -> Result<SurveyConfig, ConfigError> {
        let mut builder = SurveyConfig::builder()
            .hidden_policy(self.hidden_policy())
            .clear_screen(!self.no_clear)
            .cached_scan(self.cached);

        if let Some(raw) = &self.interval {
            builder = builder.interval_ms(parse_interval(raw)?);
        }
        if let Some(interface) = self.interface {
            builder = builder.interface(interface);
        }
        if !self.ignored.is_empty() {
            tracing::warn!(ignored = ?self.ignored, "ignoring extra arguments");
        }

        Ok(builder.build())
    }

    fn hidden_policy(&self) -> HiddenNetworkPolicy {
        match (&self.hidden_label, self.show_hidden) {
            (Some(label), _) => HiddenNetworkPolicy::Label(label.clone()),
            (None, true) => HiddenNetworkPolicy::label_default(),
            (None, false) => HiddenNetworkPolicy::Drop,
        }
    }
}
