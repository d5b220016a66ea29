use crate::batch::TransactionBatch;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// Bounded producer/consumer queue shared by one stage's worker pool.
/// Workers block on `pop` until a batch arrives or `close` is called.
pub struct StageQueue {
    items: Mutex<VecDeque<TransactionBatch>>,
    cond: Condvar,
    closed: Mutex<bool>,
}

impl StageQueue {
    pub fn new() -> Self {
        StageQueue {
            items: Mutex::new(VecDeque::new()),
            cond: Condvar::new(),
            closed: Mutex::new(false),
        }
    }

    pub fn push(&self, batch: TransactionBatch) {
        let mut items = self.items.lock().unwrap();
        items.push_back(batch);
        self.cond.notify_one();
    }

    /// Blocks until a batch is available or the queue is closed, in which
    /// case it drains whatever remains before returning `None`.
    pub fn pop(&self) -> Option<TransactionBatch> {
        let items = self.items.lock().unwrap();
        let mut items = self
            .cond
            .wait_while(items, |q| q.is_empty() && !*self.closed.lock().unwrap())
            .unwrap();
        items.pop_front()
    }

    pub fn close(&self) {
        *self.closed.lock().unwrap() = true;
        self.cond.notify_all();
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StageQueue {
    fn default() -> Self {
        Self::new()
    }
}
