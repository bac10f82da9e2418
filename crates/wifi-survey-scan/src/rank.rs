//! Ordering of access points within groups and of groups amongst each other.
//!
//! Both sorts are stable and ascending by power level, so more negative (weaker)
//! entries come first. Members with equal power keep their scan order; groups
//! that compare equal keep their first-seen order.

use std::cmp::Ordering;

use crate::domain::{EnrichedDetection, NetworkGroup, ScanResult};

/// Order two members of the same group.
pub fn compare_detections(lhs: &EnrichedDetection, rhs: &EnrichedDetection) -> Ordering {
    lhs.power_dbm().cmp(&rhs.power_dbm())
}

/// Order two groups whose members are already sorted.
///
/// Groups compare by the power of their front member. An empty group sorts
/// after every non-empty group, and two empty groups compare equal.
pub fn compare_groups(lhs: &NetworkGroup, rhs: &NetworkGroup) -> Ordering {
    match (lhs.front(), rhs.front()) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(l), Some(r)) => l.power_dbm().cmp(&r.power_dbm()),
    }
}

/// Whether `lhs` must sort strictly before `rhs`.
pub fn group_precedes(lhs: &NetworkGroup, rhs: &NetworkGroup) -> bool {
    compare_groups(lhs, rhs) == Ordering::Less
}

/// Sort each group's members, then the groups themselves.
pub fn rank(mut groups: Vec<NetworkGroup>) -> ScanResult {
    for group in &mut groups {
        group.detections.sort_by(compare_detections);
    }
    groups.sort_by(compare_groups);
    ScanResult::new(groups)
}
