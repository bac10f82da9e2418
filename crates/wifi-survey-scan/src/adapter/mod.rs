//! Adapter implementations for the [`ScanProvider`](crate::port::ScanProvider) port.
//!
//! - [`IwScanProvider`]: parses `iw dev <iface> scan` output (Linux).

pub mod iw_provider;

pub use iw_provider::{
    parse_iw_phy_frequencies, parse_iw_scan_output, FrequencyTable, IwOptions, IwScanProvider,
};
