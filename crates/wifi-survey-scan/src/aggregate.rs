//! Grouping of one scan pass by network name.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::domain::{EnrichedDetection, NetworkGroup};

/// Placeholder name used by [`HiddenNetworkPolicy::Label`] when none is given.
pub const DEFAULT_HIDDEN_LABEL: &str = "HIDDEN";

/// What to do with access points that do not broadcast a network name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HiddenNetworkPolicy {
    /// Leave hidden access points out of the result.
    #[default]
    Drop,
    /// Group hidden access points under the given placeholder name.
    ///
    /// The placeholder is compared like any other name, so a broadcast network
    /// with the same name shares its group.
    Label(String),
}

impl HiddenNetworkPolicy {
    /// Label hidden networks with [`DEFAULT_HIDDEN_LABEL`].
    pub fn label_default() -> Self {
        Self::Label(DEFAULT_HIDDEN_LABEL.to_owned())
    }
}

/// Builds [`NetworkGroup`]s from the detections of one scan pass.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    policy: HiddenNetworkPolicy,
}

impl Aggregator {
    pub fn new(policy: HiddenNetworkPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &HiddenNetworkPolicy {
        &self.policy
    }

    /// Group detections by exact (case-sensitive, untrimmed) network name.
    ///
    /// Groups come out in first-seen order and members in scan order; each
    /// name yields exactly one group.
    pub fn aggregate<I>(&self, detections: I) -> Vec<NetworkGroup>
    where
        I: IntoIterator<Item = EnrichedDetection>,
    {
        let mut groups: Vec<NetworkGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut dropped = 0usize;

        for detection in detections {
            let name = if detection.detection().is_hidden() {
                match &self.policy {
                    HiddenNetworkPolicy::Drop => {
                        dropped += 1;
                        continue;
                    }
                    HiddenNetworkPolicy::Label(label) => label.clone(),
                }
            } else {
                detection.ssid().to_owned()
            };

            match index.entry(name) {
                Entry::Occupied(slot) => groups[*slot.get()].detections.push(detection),
                Entry::Vacant(slot) => {
                    let mut group = NetworkGroup::new(slot.key().clone());
                    group.detections.push(detection);
                    slot.insert(groups.len());
                    groups.push(group);
                }
            }
        }

        tracing::trace!(
            groups = groups.len(),
            hidden_dropped = dropped,
            "aggregated scan"
        );
        groups
    }
}
