//! # wifi-survey-scan
//!
//! Periodic WiFi site survey: scan the access points a wireless interface can
//! hear, group them by network name and present them as a ranked table.
//!
//! The crate is laid out around a single port:
//!
//! - **Domain types**: [`Detection`], [`EnrichedDetection`], [`NetworkGroup`],
//!   [`ScanResult`], [`MacAddress`]
//! - **Port**: [`ScanProvider`] -- trait abstracting the radio/driver
//! - **Adapter**: [`IwScanProvider`] -- Linux adapter driving the `iw` tool
//! - **Pipeline**: [`Aggregator`] and [`rank`] turn a scan into a
//!   [`ScanResult`]; [`TerminalRenderer`] prints it
//! - **Controller**: [`ScanController`] runs scan cycles at a fixed delay
//!
//! ```no_run
//! use wifi_survey_scan::{IwScanProvider, ScanController, SurveyConfig, TerminalRenderer};
//!
//! # async fn survey() -> anyhow::Result<()> {
//! let config = SurveyConfig::builder().interface("wlan0").interval_ms(2000).build();
//! let provider = IwScanProvider::open(&config.interface)?;
//! let renderer = TerminalRenderer::stdout(config.interval_ms, config.clear_screen);
//! let mut controller = ScanController::new(provider, renderer, &config);
//! controller.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod aggregate;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod port;
pub mod rank;
pub mod render;

// Re-export key types at the crate root for convenience.
pub use adapter::{IwOptions, IwScanProvider};
pub use aggregate::{Aggregator, HiddenNetworkPolicy};
pub use config::{parse_interval, SurveyConfig, SurveyConfigBuilder};
pub use controller::{ControllerState, CycleOutcome, RunSummary, ScanController, ShutdownHandle};
pub use domain::{Detection, EnrichedDetection, MacAddress, NetworkGroup, ScanResult};
pub use error::{ConfigError, ControllerError, ProviderResult, ScanError};
pub use port::ScanProvider;
pub use rank::rank;
pub use render::{Renderer, TerminalRenderer};
