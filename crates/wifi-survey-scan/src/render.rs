//! Text rendering of a [`ScanResult`].
//!
//! [`TableView`] and [`render`] are pure: they turn a result into text and
//! nothing else. Clearing the terminal is a policy of the sink that prints the
//! text ([`TerminalRenderer`]), so a different front end can reuse the table.

use std::fmt;
use std::io::Write;

use crate::domain::{EnrichedDetection, NetworkGroup, ScanResult};

/// Column widths, in characters.
pub const SSID_WIDTH: usize = 35;
pub const MAC_WIDTH: usize = 20;
pub const FIELD_WIDTH: usize = 10;

/// Width of the separator rule (all columns together).
pub const RULE_WIDTH: usize = SSID_WIDTH + MAC_WIDTH + 5 * FIELD_WIDTH;

/// Marker placed in the SSID column for every member after the first.
pub const CONNECTOR: &str = " \u{221F}";

/// ANSI: erase the display and home the cursor.
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Borrowing view that formats a result as the full table.
pub struct TableView<'a> {
    result: &'a ScanResult,
}

impl<'a> TableView<'a> {
    pub fn new(result: &'a ScanResult) -> Self {
        Self { result }
    }
}

impl fmt::Display for TableView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);

        writeln!(f, "{rule}")?;
        write!(f, "{:<SSID_WIDTH$}{:<MAC_WIDTH$}", "SSID", "MAC")?;
        for title in ["Frequency", "Channel", "Width", "Strength", "Quality"] {
            write!(f, "{title:<FIELD_WIDTH$}")?;
        }
        writeln!(f)?;
        writeln!(f, "{rule}")?;

        for group in &self.result.groups {
            write_group(f, group)?;
        }

        writeln!(f, "{rule}")
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, group: &NetworkGroup) -> fmt::Result {
    write!(f, "{:<SSID_WIDTH$}", group.ssid)?;
    if group.is_empty() {
        return writeln!(f);
    }

    for (i, detection) in group.detections.iter().enumerate() {
        if i > 0 {
            write!(f, "{CONNECTOR:<SSID_WIDTH$}")?;
        }
        write_row(f, detection)?;
        writeln!(f)?;
    }
    Ok(())
}

fn write_row(f: &mut fmt::Formatter<'_>, detection: &EnrichedDetection) -> fmt::Result {
    let fields = [
        format_frequency(detection.frequency_hz()),
        detection.channel().to_string(),
        format_width(detection.channel_width_hz()),
        format!("{} dBm", detection.power_dbm()),
        format!("{} %", detection.quality()),
    ];

    write!(f, "{:<MAC_WIDTH$}", detection.mac())?;
    for field in &fields {
        write!(f, "{field:<FIELD_WIDTH$}")?;
    }
    Ok(())
}

/// Centre frequency in MHz, rounded to one decimal place.
pub fn format_frequency(frequency_hz: f64) -> String {
    format!("{:.1} MHz", frequency_hz / 1e6)
}

/// Channel width in whole MHz.
pub fn format_width(width_hz: f64) -> String {
    format!("{} MHz", (width_hz / 1e6).round())
}

/// The footer printed below every table.
pub fn render_footer(scan_number: u64, interval_ms: u64) -> String {
    format!("Scan number: {scan_number}; Scan interval: {interval_ms}")
}

/// The full text of one render: table followed by footer line.
pub fn render(result: &ScanResult, scan_number: u64, interval_ms: u64) -> String {
    format!(
        "{}{}\n",
        TableView::new(result),
        render_footer(scan_number, interval_ms)
    )
}

/// Receives each cycle's ranked result.
pub trait Renderer {
    /// Present `result`, the `scan_number`-th successful scan (1-based).
    fn render(&mut self, result: &ScanResult, scan_number: u64) -> std::io::Result<()>;
}

/// Prints the table to a terminal, optionally clearing it first.
pub struct TerminalRenderer<W: Write> {
    out: W,
    interval_ms: u64,
    clear_screen: bool,
}

impl TerminalRenderer<std::io::Stdout> {
    /// Render to standard output.
    pub fn stdout(interval_ms: u64, clear_screen: bool) -> Self {
        Self::new(std::io::stdout(), interval_ms, clear_screen)
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, interval_ms: u64, clear_screen: bool) -> Self {
        Self {
            out,
            interval_ms,
            clear_screen,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, result: &ScanResult, scan_number: u64) -> std::io::Result<()> {
        let text = render(result, scan_number, self.interval_ms);
        if self.clear_screen {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}
