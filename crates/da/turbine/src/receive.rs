use std::collections::HashMap;
use vcore_da_erasure::ReedSolomonDecoder;
use vcore_da_shreds::{validate_shred, Shred};
use vcore_types::Slot;

use crate::broadcast::TurbineBroadcaster;
use crate::topology::{TurbineNode, TurbineTree};
use crate::tracking::ShredTracker;

#[derive(Debug, thiserror::Error)]
pub enum ReceiveError {
    #[error("shred index {index} exceeds shard count {total}")]
    IndexOutOfRange { index: u32, total: usize },
    #[error("shred failed validation: {0}")]
    Invalid(#[from] vcore_da_shreds::ValidationError),
    #[error("decode failed: {0}")]
    Decode(#[from] anyhow::Error),
}

/// Accumulates shreds per slot and reconstructs the block payload once
/// enough data shards have arrived. Invoked from a receive loop.
pub struct TurbineReceiver {
    decoder: ReedSolomonDecoder,
    pending: HashMap<Slot, Vec<Option<Vec<u8>>>>,
}

impl TurbineReceiver {
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self, anyhow::Error> {
        Ok(TurbineReceiver {
            decoder: ReedSolomonDecoder::new(data_shards, parity_shards)?,
            pending: HashMap::new(),
        })
    }

    /// Ingests a shred that arrived from `tree`: drops it if `tracker`
    /// already has a record for its key (duplicate), otherwise validates
    /// it, attempts reconstruction, and forwards it to this node's own
    /// children exactly as `broadcaster.broadcast` would. Returns
    /// `Some(payload)` once enough shards for `shred.slot` have arrived
    /// to reconstruct, `None` otherwise (including when dropped as a
    /// duplicate).
    pub fn ingest_shred<F>(
        &mut self,
        shred: Shred,
        tree: &TurbineTree,
        tracker: &ShredTracker,
        broadcaster: &TurbineBroadcaster,
        send: F,
    ) -> Result<Option<Vec<u8>>, ReceiveError>
    where
        F: FnMut(&Shred, &TurbineNode),
    {
        let key = (shred.slot, shred.index);
        if tracker.is_known(key) {
            vcore_metrics::DA_METRICS.duplicate_shreds_dropped.inc();
            return Ok(None);
        }

        validate_shred(&shred)?;
        vcore_metrics::DA_METRICS.shreds_received.inc();

        let (data_shards, parity_shards) = self.decoder.shard_config();
        let total_shards = data_shards + parity_shards;
        if shred.index as usize >= total_shards {
            return Err(ReceiveError::IndexOutOfRange {
                index: shred.index,
                total: total_shards,
            });
        }

        let entry = self
            .pending
            .entry(shred.slot)
            .or_insert_with(|| vec![None; total_shards]);
        entry[shred.index as usize] = Some(shred.payload.clone());
        let have_enough = entry.iter().filter(|chunk| chunk.is_some()).count() >= data_shards;

        let result = if have_enough {
            let decoded = self.decoder.decode(entry);
            self.pending.remove(&shred.slot);
            Some(decoded)
        } else {
            None
        };
        vcore_metrics::DA_METRICS
            .pending_reconstructions
            .set(self.pending.len() as i64);

        broadcaster.broadcast(tree, std::slice::from_ref(&shred), tracker, send);

        match result {
            None => Ok(None),
            Some(Ok(recovered)) => {
                vcore_metrics::DA_METRICS.blocks_reconstructed.inc();
                Ok(Some(recovered))
            }
            Some(Err(e)) => {
                vcore_metrics::DA_METRICS.reconstruction_failures.inc();
                Err(ReceiveError::Decode(e))
            }
        }
    }

    pub fn pending_slots(&self) -> usize {
        self.pending.len()
    }
}
