use crate::lockout::{validate_lockouts, Lockout, MAX_LOCKOUT_HISTORY};
use std::collections::HashMap;
use std::sync::Mutex;
use vcore_types::Slot;

struct TowerState {
    lockouts: Vec<Lockout>,
    root_slot: Slot,
    last_vote_slot: Slot,
}

/// One validator's stack of votes enforcing Tower BFT safety. Single writer,
/// many readers — guarded by one mutex, held through a full record-vote
/// cycle so no interleaved read observes a half-updated tower.
pub struct Tower {
    state: Mutex<TowerState>,
}

impl Default for Tower {
    fn default() -> Self {
        Self::new()
    }
}

impl Tower {
    pub fn new() -> Self {
        Tower {
            state: Mutex::new(TowerState {
                lockouts: Vec::new(),
                root_slot: 0,
                last_vote_slot: 0,
            }),
        }
    }

    pub fn root_slot(&self) -> Slot {
        self.state.lock().unwrap().root_slot
    }

    pub fn last_vote_slot(&self) -> Slot {
        self.state.lock().unwrap().last_vote_slot
    }

    pub fn lockouts(&self) -> Vec<Lockout> {
        self.state.lock().unwrap().lockouts.clone()
    }

    pub fn can_vote_on(&self, s: Slot) -> bool {
        let state = self.state.lock().unwrap();
        Self::can_vote_on_locked(&state, s)
    }

    fn can_vote_on_locked(state: &TowerState, s: Slot) -> bool {
        s > state.root_slot
            && s > state.last_vote_slot
            && !state.lockouts.iter().any(|l| l.is_locked_out_at(s))
    }

    /// Appends `{s, 0}` if legal; promotes the oldest lockout's slot to the
    /// new root if height would exceed `MAX_LOCKOUT_HISTORY`.
    pub fn record_vote(&self, s: Slot) -> Result<(), &'static str> {
        let mut state = self.state.lock().unwrap();
        if !Self::can_vote_on_locked(&state, s) {
            vcore_metrics::CONSENSUS_METRICS.lockout_violations.inc();
            return Err("vote is not legal under current tower state");
        }
        state.lockouts.push(Lockout::new(s, 0));
        state.last_vote_slot = s;
        if state.lockouts.len() > MAX_LOCKOUT_HISTORY {
            let promoted = state.lockouts.remove(0);
            state.root_slot = promoted.slot;
        }
        Ok(())
    }

    pub fn update_confirmation_count(&self, slot: Slot, count: u32) -> bool {
        let mut state = self.state.lock().unwrap();
        if let Some(l) = state.lockouts.iter_mut().find(|l| l.slot == slot) {
            l.confirmation_count = count.min(32);
            true
        } else {
            false
        }
    }

    /// True iff no lockout currently in the tower covers slot `s`.
    pub fn can_switch_to_fork(&self, s: Slot) -> bool {
        let state = self.state.lock().unwrap();
        !state.lockouts.iter().any(|l| l.is_locked_out_at(s))
    }

    pub fn reset_to_root(&self, new_root: Slot) {
        let mut state = self.state.lock().unwrap();
        state.lockouts.clear();
        state.root_slot = new_root;
        state.last_vote_slot = new_root;
    }

    pub fn is_valid(&self) -> bool {
        let state = self.state.lock().unwrap();
        validate_lockouts(&state.lockouts)
    }

    pub fn serialize(&self) -> Vec<u8> {
        let state = self.state.lock().unwrap();
        let mut out = Vec::with_capacity(20 + state.lockouts.len() * 12);
        out.extend_from_slice(&state.root_slot.to_le_bytes());
        out.extend_from_slice(&state.last_vote_slot.to_le_bytes());
        out.extend_from_slice(&(state.lockouts.len() as u32).to_le_bytes());
        for l in &state.lockouts {
            out.extend_from_slice(&l.slot.to_le_bytes());
            out.extend_from_slice(&l.confirmation_count.to_le_bytes());
        }
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 20 {
            return None;
        }
        let root_slot = u64::from_le_bytes(bytes[0..8].try_into().ok()?);
        let last_vote_slot = u64::from_le_bytes(bytes[8..16].try_into().ok()?);
        let count = u32::from_le_bytes(bytes[16..20].try_into().ok()?) as usize;
        let mut cursor = 20usize;
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
        Some(Tower {
            state: Mutex::new(TowerState {
                lockouts,
                root_slot,
                last_vote_slot,
            }),
        })
    }
}

/// Rolling per-validator vote history keyed by root slot, independent of any
/// single tower instance (used when tracking many validators' vote state at
/// once, e.g. in fork choice).
#[derive(Default)]
pub struct VoteState {
    history: HashMap<Slot, Vec<Slot>>,
}

impl VoteState {
    pub fn new() -> Self {
        VoteState {
            history: HashMap::new(),
        }
    }

    pub fn record(&mut self, root_slot: Slot, voted_slot: Slot) {
        self.history.entry(root_slot).or_default().push(voted_slot);
    }

    /// Drops entries keyed strictly below `r`.
    pub fn update_root_slot(&mut self, r: Slot) {
        self.history.retain(|&root, _| root >= r);
    }

    pub fn get(&self, root_slot: Slot) -> Option<&[Slot]> {
        self.history.get(&root_slot).map(|v| v.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_legal_votes_in_order() {
        let tower = Tower::new();
        tower.record_vote(10).unwrap();
        tower.record_vote(20).unwrap();
        assert_eq!(tower.last_vote_slot(), 20);
        assert_eq!(tower.lockouts().len(), 2);
    }

    #[test]
    fn rejects_vote_on_or_before_last_vote() {
        let tower = Tower::new();
        tower.record_vote(10).unwrap();
        assert!(tower.record_vote(10).is_err());
        assert!(tower.record_vote(5).is_err());
    }

    #[test]
    fn rejects_vote_locked_out_by_existing_lockout() {
        let tower = Tower::new();
        tower.record_vote(10).unwrap();
        // confirmation_count starts at 0 -> lockout_period=1, locks out slot 11 only
        assert!(tower.record_vote(11).is_err());
        assert!(tower.record_vote(12).is_ok());
    }

    #[test]
    fn exceeding_max_height_promotes_root() {
        let tower = Tower::new();
        for s in 1..=33u64 {
            tower.record_vote(s * 100).unwrap();
        }
        assert_eq!(tower.lockouts().len(), MAX_LOCKOUT_HISTORY);
        assert_eq!(tower.root_slot(), 100);
    }

    #[test]
    fn reset_to_root_clears_lockouts() {
        let tower = Tower::new();
        tower.record_vote(10).unwrap();
        tower.reset_to_root(50);
        assert_eq!(tower.root_slot(), 50);
        assert_eq!(tower.last_vote_slot(), 50);
        assert!(tower.lockouts().is_empty());
    }

    #[test]
    fn serialize_roundtrip() {
        let tower = Tower::new();
        tower.record_vote(10).unwrap();
        tower.record_vote(20).unwrap();
        let bytes = tower.serialize();
        let restored = Tower::deserialize(&bytes).unwrap();
        assert_eq!(restored.root_slot(), tower.root_slot());
        assert_eq!(restored.last_vote_slot(), tower.last_vote_slot());
        assert_eq!(restored.lockouts(), tower.lockouts());
    }

    #[test]
    fn vote_state_drops_entries_below_root() {
        let mut vs = VoteState::new();
        vs.record(10, 15);
        vs.record(20, 25);
        vs.update_root_slot(20);
        assert!(vs.get(10).is_none());
        assert!(vs.get(20).is_some());
    }
}
