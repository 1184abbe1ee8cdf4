//! Stable event ordering for deterministic replay.

use crate::domain::{Event, EventOrderingKey};

impl EventOrderingKey {
    /// Compare two events for deterministic ordering.
    ///
    /// Returns true if event_a should be processed before event_b.
    pub fn should_come_before(event_a: &Event, event_b: &Event) -> bool {
        event_a.key < event_b.key
    }
}

/// Sort events deterministically by (block, log index).
///
/// Two events at the same season must be applied in log-index order, since
/// volume classification and EMA recomputation are order-sensitive.
pub fn sort_events_deterministic(events: &mut [Event]) {
    events.sort_by_key(|event| event.key);
}
