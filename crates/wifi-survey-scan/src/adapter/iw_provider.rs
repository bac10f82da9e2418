//! Adapter that scans WiFi access points on Linux by invoking `iw`.
//!
//! # Design
//!
//! Opening the provider validates the interface through sysfs
//! (`/sys/class/net/<iface>` and its `phy80211/name`) and loads the radio's
//! frequency table from `iw phy <phy> info`. Each scan shells out to
//! `iw dev <iface> scan` (or `scan dump` to read the kernel's cached results
//! without triggering a new scan) and parses the BSS stanzas into
//! [`Detection`] values.
//!
//! # Permissions
//!
//! - `iw dev <iface> scan` requires `CAP_NET_ADMIN` (typically root).
//! - `iw dev <iface> scan dump` may work without root on some distributions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::{Detection, MacAddress};
use crate::error::{ProviderResult, ScanError};
use crate::port::ScanProvider;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How an [`IwScanProvider`] reaches the system.
#[derive(Debug, Clone)]
pub struct IwOptions {
    /// Read cached results with `scan dump` instead of triggering a scan.
    pub cached: bool,
    /// The `iw` executable to run.
    pub iw_path: PathBuf,
    /// Mount point of sysfs.
    pub sysfs_root: PathBuf,
}

impl Default for IwOptions {
    fn default() -> Self {
        Self {
            cached: false,
            iw_path: PathBuf::from("iw"),
            sysfs_root: PathBuf::from("/sys"),
        }
    }
}

// ---------------------------------------------------------------------------
// FrequencyTable
// ---------------------------------------------------------------------------

/// The channels a radio supports, keyed by centre frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    /// Centre frequency in kHz -> channel number.
    channels: BTreeMap<u32, u16>,
}

impl FrequencyTable {
    pub fn insert(&mut self, frequency_mhz: f64, channel: u16) {
        self.channels.insert(mhz_to_khz(frequency_mhz), channel);
    }

    /// The channel whose centre frequency matches `frequency_hz` to the kHz.
    pub fn channel_for(&self, frequency_hz: f64) -> Option<u16> {
        self.channels.get(&mhz_to_khz(frequency_hz / 1e6)).copied()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

// WiFi frequencies fit in u32 kHz.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mhz_to_khz(frequency_mhz: f64) -> u32 {
    (frequency_mhz * 1000.0).round() as u32
}

// ---------------------------------------------------------------------------
// IwScanProvider
// ---------------------------------------------------------------------------

/// Scan provider backed by the `iw` command-line tool.
#[derive(Debug)]
pub struct IwScanProvider {
    /// Wireless interface name (e.g. `"wlan0"`, `"wlp2s0"`).
    interface: String,
    /// The nl80211 phy backing the interface (e.g. `"phy0"`).
    phy: String,
    options: IwOptions,
    frequency_table: FrequencyTable,
    closed: bool,
}

impl IwScanProvider {
    /// Open a provider for `interface` using the system `iw` and `/sys`.
    pub fn open(interface: impl Into<String>) -> ProviderResult<Self> {
        Self::open_with(interface, IwOptions::default())
    }

    /// Open a provider with explicit options.
    ///
    /// Fails if the interface does not exist, is not wireless, or its
    /// frequency table cannot be read.
    pub fn open_with(interface: impl Into<String>, options: IwOptions) -> ProviderResult<Self> {
        let interface = interface.into();
        let phy = resolve_phy(&options.sysfs_root, &interface)?;

        let args = ["phy", phy.as_str(), "info"];
        let output = run_iw(&options.iw_path, &args).map_err(|e| ScanError::FrequencyTable {
            interface: interface.clone(),
            reason: e.to_string(),
        })?;
        let frequency_table = parse_iw_phy_frequencies(&output);
        if frequency_table.is_empty() {
            return Err(ScanError::FrequencyTable {
                interface,
                reason: format!("`iw phy {phy} info` listed no frequencies"),
            });
        }

        tracing::info!(
            interface = %interface,
            phy = %phy,
            channels = frequency_table.len(),
            cached = options.cached,
            "opened iw scan provider"
        );

        Ok(Self {
            interface,
            phy,
            options,
            frequency_table,
            closed: false,
        })
    }

    /// The nl80211 phy backing the interface.
    pub fn phy(&self) -> &str {
        &self.phy
    }

    pub fn frequency_table(&self) -> &FrequencyTable {
        &self.frequency_table
    }
}

impl ScanProvider for IwScanProvider {
    fn interface(&self) -> &str {
        &self.interface
    }

    fn scan(&mut self) -> ProviderResult<Vec<Detection>> {
        if self.closed {
            return Err(ScanError::ScanFailed {
                reason: "provider is closed".to_owned(),
            });
        }

        let mut args = vec!["dev", self.interface.as_str(), "scan"];
        if self.options.cached {
            args.push("dump");
        }
        let output = run_iw(&self.options.iw_path, &args)?;
        parse_iw_scan_output(&output)
    }

    fn frequency_to_channel(&self, frequency_hz: f64) -> ProviderResult<u16> {
        self.frequency_table
            .channel_for(frequency_hz)
            .ok_or(ScanError::ChannelUnresolved { frequency_hz })
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            tracing::debug!(interface = %self.interface, "closed iw scan provider");
        }
    }
}

impl Drop for IwScanProvider {
    fn drop(&mut self) {
        self.close();
    }
}

/// Map an interface to its nl80211 phy through sysfs.
fn resolve_phy(sysfs_root: &Path, interface: &str) -> ProviderResult<String> {
    let iface_dir = sysfs_root.join("class/net").join(interface);
    if interface.is_empty() || interface.contains('/') || !iface_dir.exists() {
        return Err(ScanError::InterfaceNotFound {
            interface: interface.to_owned(),
        });
    }

    let name_file = iface_dir.join("phy80211/name");
    let phy = fs::read_to_string(name_file).map_err(|_| ScanError::NotWireless {
        interface: interface.to_owned(),
    })?;
    let phy = phy.trim();
    if phy.is_empty() {
        return Err(ScanError::NotWireless {
            interface: interface.to_owned(),
        });
    }
    Ok(phy.to_owned())
}

/// Run `iw` with `args` and return its stdout.
fn run_iw(iw_path: &Path, args: &[&str]) -> ProviderResult<String> {
    let command = format!("{} {}", iw_path.display(), args.join(" "));
    let output = Command::new(iw_path)
        .args(args)
        .output()
        .map_err(|e| ScanError::Process(format!("failed to run `{command}`: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScanError::ScanFailed {
            reason: format!("iw exited with {}: {}", output.status, stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Intermediate accumulator for fields within a single BSS stanza.
#[derive(Default)]
struct BssStanza {
    mac: Option<MacAddress>,
    ssid: Option<String>,
    signal_dbm: Option<f64>,
    freq_mhz: Option<f64>,
}

impl BssStanza {
    /// Flush this stanza into a [`Detection`], if it carries everything needed.
    fn flush(self) -> Option<Detection> {
        let mac = self.mac?;
        let (Some(freq_mhz), Some(signal_dbm)) = (self.freq_mhz, self.signal_dbm) else {
            tracing::debug!(%mac, "skipping BSS without frequency or signal");
            return None;
        };

        #[allow(clippy::cast_possible_truncation)] // dBm values are small
        let power_dbm = signal_dbm.round() as i32;

        Some(Detection::new(
            mac,
            self.ssid.unwrap_or_default(),
            freq_mhz * 1e6,
            power_dbm,
        ))
    }
}

/// Parse the text output of `iw dev <iface> scan [dump]`.
///
/// The output consists of BSS stanzas, each starting with:
/// ```text
/// BSS aa:bb:cc:dd:ee:ff(on wlan0)
/// ```
/// followed by indented key-value lines. Stanzas without a frequency or a
/// signal level are skipped.
pub fn parse_iw_scan_output(output: &str) -> ProviderResult<Vec<Detection>> {
    let mut results = Vec::new();
    let mut current: Option<BssStanza> = None;

    for line in output.lines() {
        // New BSS stanza starts with "BSS " at column 0.
        if let Some(rest) = line.strip_prefix("BSS ") {
            if let Some(detection) = current.take().and_then(BssStanza::flush) {
                results.push(detection);
            }

            // "BSS aa:bb:cc:dd:ee:ff(on wlan0)" or "BSS aa:bb:cc:dd:ee:ff -- associated".
            let mac_end = rest
                .find(|c: char| !c.is_ascii_hexdigit() && c != ':')
                .unwrap_or(rest.len());
            let mac = MacAddress::parse(&rest[..mac_end])
                .map_err(|e| ScanError::Parse(format!("bad BSS line '{line}': {e}")))?;

            current = Some(BssStanza {
                mac: Some(mac),
                ..BssStanza::default()
            });
            continue;
        }

        let Some(stanza) = current.as_mut() else {
            continue;
        };
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("SSID:") {
            if stanza.ssid.is_none() {
                let raw = rest.strip_prefix(' ').unwrap_or(rest);
                stanza.ssid = Some(unescape_ssid(raw));
            }
        } else if let Some(rest) = trimmed.strip_prefix("signal:") {
            // "signal: -52.00 dBm"
            stanza.signal_dbm = parse_leading_number(rest);
        } else if let Some(rest) = trimmed.strip_prefix("freq:") {
            // "freq: 5180" or "freq: 5180.0"
            stanza.freq_mhz = parse_leading_number(rest);
        }
    }

    if let Some(detection) = current.take().and_then(BssStanza::flush) {
        results.push(detection);
    }

    Ok(results)
}

/// Parse the frequency list from `iw phy <phy> info`.
///
/// Matches lines such as `* 2412 MHz [1] (20.0 dBm)` or
/// `* 5260.0 MHz [52] (disabled)`; disabled channels are kept.
pub fn parse_iw_phy_frequencies(output: &str) -> FrequencyTable {
    let mut table = FrequencyTable::default();

    for line in output.lines() {
        let Some(rest) = line.trim_start().strip_prefix("* ") else {
            continue;
        };
        let Some((freq, rest)) = rest.split_once(" MHz [") else {
            continue;
        };
        let Some((channel, _)) = rest.split_once(']') else {
            continue;
        };
        if let (Ok(freq), Ok(channel)) = (freq.trim().parse::<f64>(), channel.parse::<u16>()) {
            table.insert(freq, channel);
        }
    }

    table
}

/// Parse the first whitespace-separated token as a number.
fn parse_leading_number(s: &str) -> Option<f64> {
    s.split_whitespace().next()?.parse().ok()
}

/// Undo `iw`'s SSID escaping (`\xNN` for non-printable bytes, backslashes and
/// leading/trailing spaces). An SSID of only NUL bytes is reported as hidden.
fn unescape_ssid(escaped: &str) -> String {
    let bytes = escaped.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'x') {
            let decoded = escaped
                .get(i + 2..i + 4)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    if out.iter().all(|&b| b == 0) {
        return String::new();
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
