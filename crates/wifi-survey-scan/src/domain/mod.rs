//! Domain types for one scan cycle: detections, their derived metrics and the
//! grouped result.

pub mod detection;
pub mod group;
pub mod mac;

pub use detection::{Detection, EnrichedDetection};
pub use group::{NetworkGroup, ScanResult};
pub use mac::MacAddress;
