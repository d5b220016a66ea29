use crate::primitives::{Hash, PublicKey, Signature, Slot};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// A committed block as handed to the `LedgerSink`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub slot: Slot,
    pub parent_hash: Hash,
    pub block_hash: Hash,
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub validator: PublicKey,
    pub block_signature: Signature,
}

impl Block {
    /// Builds a block, computing `block_hash` over the fields that precede
    /// it (everything but the block signature, which covers the hash).
    pub fn new(
        slot: Slot,
        parent_hash: Hash,
        validator: PublicKey,
        transactions: Vec<Transaction>,
        timestamp: u64,
    ) -> Self {
        let mut block = Block {
            slot,
            parent_hash,
            block_hash: Hash::zero(),
            timestamp,
            transactions,
            validator,
            block_signature: Signature::zero(),
        };
        block.block_hash = block.compute_hash();
        block
    }

    fn compute_hash(&self) -> Hash {
        #[derive(Serialize)]
        struct Header<'a> {
            slot: Slot,
            parent_hash: &'a Hash,
            timestamp: u64,
            validator: &'a PublicKey,
            tx_hashes: Vec<&'a Hash>,
        }
        let header = Header {
            slot: self.slot,
            parent_hash: &self.parent_hash,
            timestamp: self.timestamp,
            validator: &self.validator,
            tx_hashes: self.transactions.iter().map(|t| &t.hash).collect(),
        };
        let bytes = bincode::serialize(&header).expect("header serialization is infallible");
        Hash::sha256(&bytes)
    }

    pub fn verify_hash(&self) -> bool {
        self.block_hash == self.compute_hash()
    }
}
