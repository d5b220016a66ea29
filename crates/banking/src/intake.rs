use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::{Condvar, Mutex};
use std::time::Duration;
use vcore_types::Transaction;

/// Priority-ordered entry for the optional priority lane. Higher priority
/// sorts first; same-priority entries preserve FIFO via `seq`.
struct PriorityEntry {
    priority: u64,
    seq: u64,
    tx: Transaction,
}

impl PartialEq for PriorityEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for PriorityEntry {}

impl PartialOrd for PriorityEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            order => order,
        }
    }
}

struct State {
    heap: BinaryHeap<PriorityEntry>,
    fifo: VecDeque<Transaction>,
    next_seq: u64,
}

/// Front door of the banking pipeline. `submit` enqueues into the plain
/// FIFO lane; `submit_with_priority` enqueues into a heap drained first on
/// every builder tick.
pub struct IntakeQueue {
    state: Mutex<State>,
    cond: Condvar,
}

impl IntakeQueue {
    pub fn new() -> Self {
        IntakeQueue {
            state: Mutex::new(State {
                heap: BinaryHeap::new(),
                fifo: VecDeque::new(),
                next_seq: 0,
            }),
            cond: Condvar::new(),
        }
    }

    pub fn submit(&self, tx: Transaction) {
        let mut state = self.state.lock().unwrap();
        state.fifo.push_back(tx);
        self.cond.notify_one();
    }

    pub fn submit_with_priority(&self, tx: Transaction, priority: u64) {
        let mut state = self.state.lock().unwrap();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(PriorityEntry { priority, seq, tx });
        self.cond.notify_one();
    }

    /// Pops the heap first, then the FIFO lane, waiting up to `timeout` for
    /// something to arrive. Used by the batch builder's per-tick drain.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Transaction> {
        let state = self.state.lock().unwrap();
        let (mut state, _) = self
            .cond
            .wait_timeout_while(state, timeout, |s| s.heap.is_empty() && s.fifo.is_empty())
            .unwrap();
        if let Some(entry) = state.heap.pop() {
            return Some(entry.tx);
        }
        state.fifo.pop_front()
    }

    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.heap.len() + state.fifo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IntakeQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcore_types::Signature;

    fn tx(byte: u8) -> Transaction {
        Transaction::new(vec![Signature::zero()], vec![byte])
    }

    #[test]
    fn fifo_lane_preserves_order() {
        let q = IntakeQueue::new();
        q.submit(tx(1));
        q.submit(tx(2));
        assert_eq!(q.pop_timeout(Duration::from_millis(10)).unwrap().message, vec![1]);
        assert_eq!(q.pop_timeout(Duration::from_millis(10)).unwrap().message, vec![2]);
    }

    #[test]
    fn priority_lane_drained_before_fifo() {
        let q = IntakeQueue::new();
        q.submit(tx(1));
        q.submit_with_priority(tx(9), 5);
        assert_eq!(q.pop_timeout(Duration::from_millis(10)).unwrap().message, vec![9]);
        assert_eq!(q.pop_timeout(Duration::from_millis(10)).unwrap().message, vec![1]);
    }

    #[test]
    fn equal_priority_preserves_fifo_order() {
        let q = IntakeQueue::new();
        q.submit_with_priority(tx(1), 5);
        q.submit_with_priority(tx(2), 5);
        assert_eq!(q.pop_timeout(Duration::from_millis(10)).unwrap().message, vec![1]);
        assert_eq!(q.pop_timeout(Duration::from_millis(10)).unwrap().message, vec![2]);
    }

    #[test]
    fn pop_timeout_returns_none_when_empty() {
        let q = IntakeQueue::new();
        assert!(q.pop_timeout(Duration::from_millis(5)).is_none());
    }
}
