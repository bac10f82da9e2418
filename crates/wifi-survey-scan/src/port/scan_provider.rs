//! The driving port for WiFi scanning.

use crate::domain::Detection;
use crate::error::ProviderResult;

/// Port that abstracts the platform WiFi scanning backend.
///
/// A provider is opened once per process by its adapter's constructor, owned
/// exclusively by the scan controller and closed when the controller stops.
/// Calls are never concurrent: the controller runs one cycle at a time, moving
/// the provider onto a blocking thread for the duration of [`scan`](Self::scan).
///
/// Implementations include:
/// - [`crate::adapter::IwScanProvider`]: shells out to `iw` (Linux).
pub trait ScanProvider: Send + 'static {
    /// The wireless interface this provider scans on.
    fn interface(&self) -> &str;

    /// Perform a scan and return every access point currently visible.
    ///
    /// May block for as long as the driver takes to complete the scan.
    fn scan(&mut self) -> ProviderResult<Vec<Detection>>;

    /// Resolve the channel number for a centre frequency in Hz.
    fn frequency_to_channel(&self, frequency_hz: f64) -> ProviderResult<u16>;

    /// Release the underlying radio handle. Must be idempotent.
    fn close(&mut self) {}
}
