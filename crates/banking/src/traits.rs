use vcore_types::{Block, Hash, Result, Slot, Transaction};

/// Persistent ledger storage, consumed by the commitment stage.
/// `store_block` must be idempotent on identical `(slot, block_hash)`
/// and atomic.
pub trait LedgerSink: Send + Sync {
    fn get_latest_slot(&self) -> Slot;
    fn get_latest_block_hash(&self) -> Hash;
    fn store_block(&self, block: Block) -> Result<()>;
}

/// Transaction execution collaborator, consumed by the execution stage.
/// Effects outside ledger state are undefined and out of scope here — it
/// is treated as a black box.
pub trait ExecutionEngine: Send + Sync {
    fn execute(&self, tx: &Transaction) -> Result<()>;
}
