use vcore_types::Slot;

pub const MAX_LOCKOUT_HISTORY: usize = 32;

/// Per-slot lockout with doubling expiry: `lockout_period = min(2^confirmation_count, 2^32)`.
/// `L` locks out slot `s` iff `L.slot < s <= L.slot + lockout_period`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lockout {
    pub slot: Slot,
    pub confirmation_count: u32,
}

impl Lockout {
    pub fn new(slot: Slot, confirmation_count: u32) -> Self {
        Lockout {
            slot,
            confirmation_count: confirmation_count.min(32),
        }
    }

    pub fn lockout_period(&self) -> u64 {
        1u64.checked_shl(self.confirmation_count).unwrap_or(u64::MAX)
    }

    pub fn is_locked_out_at(&self, s: Slot) -> bool {
        self.slot < s && s <= self.slot.saturating_add(self.lockout_period())
    }

    fn conflicts_with(&self, other: &Lockout) -> bool {
        if self.slot == other.slot {
            return false;
        }
        let (earlier, later) = if self.slot < other.slot {
            (self, other)
        } else {
            (other, self)
        };
        earlier.is_locked_out_at(later.slot)
    }
}

/// Ordered, conflict-free set of lockouts for one voter, capped at 32 entries.
#[derive(Clone, Debug, Default)]
pub struct LockoutSet {
    lockouts: Vec<Lockout>,
}

impl LockoutSet {
    pub fn new() -> Self {
        LockoutSet {
            lockouts: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.lockouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lockouts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lockout> {
        self.lockouts.iter()
    }

    /// Inserts `lockout`, replacing any existing entry at the same slot and
    /// keeping the set ascending by slot.
    pub fn add(&mut self, lockout: Lockout) {
        match self.lockouts.binary_search_by_key(&lockout.slot, |l| l.slot) {
            Ok(idx) => self.lockouts[idx] = lockout,
            Err(idx) => self.lockouts.insert(idx, lockout),
        }
    }

    /// Drops every lockout whose period has elapsed at `current_slot`.
    /// Returns the number removed.
    pub fn remove_expired(&mut self, current_slot: Slot) -> usize {
        let before = self.lockouts.len();
        self.lockouts
            .retain(|l| l.slot.saturating_add(l.lockout_period()) > current_slot);
        before - self.lockouts.len()
    }

    pub fn is_slot_locked_out(&self, s: Slot) -> bool {
        self.lockouts.iter().any(|l| l.is_locked_out_at(s))
    }

    pub fn get_active(&self, current_slot: Slot) -> Vec<Lockout> {
        self.lockouts
            .iter()
            .copied()
            .filter(|l| l.slot.saturating_add(l.lockout_period()) > current_slot)
            .collect()
    }

    pub fn update_confirmation_count(&mut self, slot: Slot, count: u32) -> bool {
        if let Ok(idx) = self.lockouts.binary_search_by_key(&slot, |l| l.slot) {
            self.lockouts[idx].confirmation_count = count.min(32);
            true
        } else {
            false
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.lockouts.len() * 12);
        out.extend_from_slice(&(self.lockouts.len() as u32).to_le_bytes());
        for l in &self.lockouts {
            out.extend_from_slice(&l.slot.to_le_bytes());
            out.extend_from_slice(&l.confirmation_count.to_le_bytes());
        }
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }
        let count = u32::from_le_bytes(bytes[0..4].try_into().ok()?) as usize;
        let mut cursor = 4usize;
        let mut lockouts = Vec::with_capacity(count);
        for _ in 0..count {
            if bytes.len() < cursor + 12 {
                return None;
            }
            let slot = u64::from_le_bytes(bytes[cursor..cursor + 8].try_into().ok()?);
            let confirmation_count =
                u32::from_le_bytes(bytes[cursor + 8..cursor + 12].try_into().ok()?);
            lockouts.push(Lockout {
                slot,
                confirmation_count,
            });
            cursor += 12;
        }
        Some(LockoutSet { lockouts })
    }
}

/// True iff `lockouts` is strictly ascending by slot and no two entries
/// conflict under `Lockout::is_locked_out_at`.
pub fn validate_lockouts(lockouts: &[Lockout]) -> bool {
    for w in lockouts.windows(2) {
        if w[0].slot >= w[1].slot {
            return false;
        }
    }
    for i in 0..lockouts.len() {
        for j in (i + 1)..lockouts.len() {
            if lockouts[i].conflicts_with(&lockouts[j]) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lockout_period_doubles_with_confirmation_count() {
        assert_eq!(Lockout::new(10, 0).lockout_period(), 1);
        assert_eq!(Lockout::new(10, 1).lockout_period(), 2);
        assert_eq!(Lockout::new(10, 5).lockout_period(), 32);
    }

    #[test]
    fn is_locked_out_at_boundary() {
        let l = Lockout::new(10, 2);
        assert!(!l.is_locked_out_at(10));
        assert!(l.is_locked_out_at(11));
        assert!(l.is_locked_out_at(14));
        assert!(!l.is_locked_out_at(15));
    }

    #[test]
    fn add_replaces_same_slot_and_keeps_order() {
        let mut set = LockoutSet::new();
        set.add(Lockout::new(10, 0));
        set.add(Lockout::new(5, 0));
        set.add(Lockout::new(10, 3));
        assert_eq!(set.len(), 2);
        let slots: Vec<Slot> = set.iter().map(|l| l.slot).collect();
        assert_eq!(slots, vec![5, 10]);
        assert_eq!(set.iter().find(|l| l.slot == 10).unwrap().confirmation_count, 3);
    }

    #[test]
    fn remove_expired_counts_dropped() {
        let mut set = LockoutSet::new();
        set.add(Lockout::new(1, 0));
        set.add(Lockout::new(100, 10));
        let removed = set.remove_expired(50);
        assert_eq!(removed, 1);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn serialize_roundtrip() {
        let mut set = LockoutSet::new();
        set.add(Lockout::new(1, 0));
        set.add(Lockout::new(50, 4));
        let bytes = set.serialize();
        let restored = LockoutSet::deserialize(&bytes).unwrap();
        assert_eq!(restored.len(), set.len());
        for (a, b) in set.iter().zip(restored.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn validate_rejects_non_ascending() {
        assert!(!validate_lockouts(&[Lockout::new(10, 0), Lockout::new(5, 0)]));
    }

    #[test]
    fn validate_rejects_conflicting() {
        assert!(!validate_lockouts(&[Lockout::new(1, 10), Lockout::new(2, 0)]));
    }

    proptest! {
        #[test]
        fn add_then_remove_expired_never_panics(slots in proptest::collection::vec(0u64..10_000, 0..40)) {
            let mut set = LockoutSet::new();
            for s in slots {
                set.add(Lockout::new(s, 0));
            }
            set.remove_expired(5000);
        }

        #[test]
        fn inserted_set_is_always_ascending(slots in proptest::collection::vec(0u64..10_000, 0..40)) {
            let mut set = LockoutSet::new();
            for s in slots {
                set.add(Lockout::new(s, 0));
            }
            let collected: Vec<Slot> = set.iter().map(|l| l.slot).collect();
            let mut sorted = collected.clone();
            sorted.sort();
            prop_assert_eq!(collected, sorted);
        }
    }
}
