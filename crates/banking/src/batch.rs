use std::time::Instant;
use vcore_types::Transaction;

/// Lifecycle state of a `TransactionBatch`. Immutable once it reaches
/// `Completed` or `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Same object forwarded through validation, execution, and commitment so
/// identity and `creation_time` survive the whole pipeline.
#[derive(Clone, Debug)]
pub struct TransactionBatch {
    pub batch_id: u64,
    pub transactions: Vec<Transaction>,
    pub creation_time: Instant,
    pub state: BatchState,
    pub results: Vec<bool>,
}

impl TransactionBatch {
    pub fn new(batch_id: u64, transactions: Vec<Transaction>) -> Self {
        let len = transactions.len();
        TransactionBatch {
            batch_id,
            transactions,
            creation_time: Instant::now(),
            state: BatchState::Pending,
            results: vec![false; len],
        }
    }

    pub fn age(&self) -> std::time::Duration {
        self.creation_time.elapsed()
    }

    pub fn all_succeeded(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|ok| *ok)
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|ok| !**ok).count()
    }
}
