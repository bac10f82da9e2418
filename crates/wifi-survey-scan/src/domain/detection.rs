//! Per-access-point observations from one scan pass.

use crate::domain::mac::MacAddress;
use crate::metrics::{estimate_channel_width, quality_from_power};

/// One access point observed in one scan pass, as reported by the provider.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// The access point's MAC address (BSSID).
    pub mac: MacAddress,
    /// The network name (SSID). Empty for hidden networks.
    pub ssid: String,
    /// Centre frequency in Hz.
    pub frequency_hz: f64,
    /// Received power level in dBm.
    pub power_dbm: i32,
}

impl Detection {
    /// Create a detection from provider-reported values.
    pub fn new(
        mac: MacAddress,
        ssid: impl Into<String>,
        frequency_hz: f64,
        power_dbm: i32,
    ) -> Self {
        Self {
            mac,
            ssid: ssid.into(),
            frequency_hz,
            power_dbm,
        }
    }

    /// Whether the network does not broadcast its name.
    pub fn is_hidden(&self) -> bool {
        self.ssid.is_empty()
    }
}

/// A [`Detection`] with its derived metrics.
///
/// Fields are private so the derived values always agree with the detection
/// they were computed from.
#[derive(Clone, Debug, PartialEq)]
pub struct EnrichedDetection {
    detection: Detection,
    channel: u16,
    channel_width_hz: f64,
    quality: u8,
}

impl EnrichedDetection {
    /// Derive metrics for `detection`.
    ///
    /// The channel number is resolved by the provider, because mapping a
    /// frequency to a channel depends on the radio's regulatory table.
    pub fn new(detection: Detection, channel: u16) -> Self {
        let channel_width_hz = estimate_channel_width(detection.frequency_hz);
        let quality = quality_from_power(detection.power_dbm);
        Self {
            detection,
            channel,
            channel_width_hz,
            quality,
        }
    }

    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    pub fn mac(&self) -> MacAddress {
        self.detection.mac
    }

    pub fn ssid(&self) -> &str {
        &self.detection.ssid
    }

    pub fn frequency_hz(&self) -> f64 {
        self.detection.frequency_hz
    }

    pub fn power_dbm(&self) -> i32 {
        self.detection.power_dbm
    }

    /// The 802.11 channel number.
    pub fn channel(&self) -> u16 {
        self.channel
    }

    /// Estimated channel width in Hz.
    pub fn channel_width_hz(&self) -> f64 {
        self.channel_width_hz
    }

    /// Signal quality in `1..=100`.
    pub fn quality(&self) -> u8 {
        self.quality
    }
}
