//! Grouped view of one scan cycle.

use crate::domain::detection::EnrichedDetection;

/// All access points of one scan cycle that share a network name.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkGroup {
    /// The shared network name.
    pub ssid: String,
    /// Member access points, in ranked order once the ranker has run.
    pub detections: Vec<EnrichedDetection>,
}

impl NetworkGroup {
    /// Create an empty group.
    pub fn new(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            detections: Vec::new(),
        }
    }

    /// The first member in the group's current order.
    pub fn front(&self) -> Option<&EnrichedDetection> {
        self.detections.first()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// The ranked groups produced by one scan cycle.
///
/// Built fresh every cycle; nothing carries over between cycles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanResult {
    pub groups: Vec<NetworkGroup>,
}

impl ScanResult {
    pub fn new(groups: Vec<NetworkGroup>) -> Self {
        Self { groups }
    }

    /// Number of access points across all groups.
    pub fn detection_count(&self) -> usize {
        self.groups.iter().map(NetworkGroup::len).sum()
    }

    /// Look up a group by exact name.
    pub fn group(&self, ssid: &str) -> Option<&NetworkGroup> {
        self.groups.iter().find(|g| g.ssid == ssid)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
