use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use vcore_types::Slot;

pub type ShredKey = (Slot, u32);

struct Entry {
    last_seen: Instant,
    retransmit_count: u32,
}

/// Per-shred send/seen state shared between the broadcast and receive
/// paths, so a shred forwarded on receive and a shred sent on broadcast
/// are deduplicated and retransmit-gated against the same record.
pub struct ShredTracker {
    entries: Mutex<HashMap<ShredKey, Entry>>,
}

impl ShredTracker {
    pub fn new() -> Self {
        ShredTracker {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_known(&self, key: ShredKey) -> bool {
        self.entries.lock().unwrap().contains_key(&key)
    }

    pub fn retransmit_count(&self, key: ShredKey) -> u32 {
        self.entries
            .lock()
            .unwrap()
            .get(&key)
            .map(|e| e.retransmit_count)
            .unwrap_or(0)
    }

    /// Stamps `key` with the current time and increments its retransmit
    /// count. Called once per broadcast/forward attempt.
    pub fn record_sent(&self, key: ShredKey) {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.entry(key).or_insert_with(|| Entry {
            last_seen: Instant::now(),
            retransmit_count: 0,
        });
        entry.last_seen = Instant::now();
        entry.retransmit_count += 1;
    }

    /// Removes entries whose last stamp is older than `max_age`.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries
            .lock()
            .unwrap()
            .retain(|_, e| now.duration_since(e.last_seen) <= max_age);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ShredTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn unknown_key_is_not_known() {
        let tracker = ShredTracker::new();
        assert!(!tracker.is_known((1, 0)));
        assert_eq!(tracker.retransmit_count((1, 0)), 0);
    }

    #[test]
    fn record_sent_marks_known_and_increments_count() {
        let tracker = ShredTracker::new();
        tracker.record_sent((1, 0));
        assert!(tracker.is_known((1, 0)));
        assert_eq!(tracker.retransmit_count((1, 0)), 1);
        tracker.record_sent((1, 0));
        assert_eq!(tracker.retransmit_count((1, 0)), 2);
    }

    #[test]
    fn cleanup_removes_entries_older_than_max_age() {
        let tracker = ShredTracker::new();
        tracker.record_sent((1, 0));
        sleep(Duration::from_millis(20));
        tracker.cleanup(Duration::from_millis(5));
        assert!(tracker.is_empty());
    }

    #[test]
    fn cleanup_keeps_fresh_entries() {
        let tracker = ShredTracker::new();
        tracker.record_sent((1, 0));
        tracker.cleanup(Duration::from_secs(60));
        assert!(tracker.is_known((1, 0)));
    }
}
