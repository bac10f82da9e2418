//! Port definitions for the scan provider.
//!
//! The controller only talks to the radio through [`ScanProvider`], so the
//! `iw` adapter and test doubles can be swapped transparently.

mod scan_provider;

pub use scan_provider::ScanProvider;
