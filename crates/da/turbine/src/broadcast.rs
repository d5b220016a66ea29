use vcore_da_erasure::ReedSolomonEncoder;
use vcore_da_shreds::{Shred, ShredError, ShredVariant};
use vcore_types::{Signature, Slot};

use crate::topology::{TurbineNode, TurbineTree};
use crate::tracking::ShredTracker;

const DEFAULT_MAX_RETRANSMIT_ATTEMPTS: u32 = 3;
const DEFAULT_MAX_RETRANSMIT_PEERS: usize = 4;

/// Encodes a block payload into data + coding shreds and fans them out to
/// the tree's children plus, while a shred is still within its retransmit
/// budget, its retransmit peers. Transport is a caller-supplied
/// best-effort send closure.
pub struct TurbineBroadcaster {
    encoder: ReedSolomonEncoder,
    protocol_version: u16,
    max_retransmit_attempts: u32,
    max_retransmit_peers: usize,
}

impl TurbineBroadcaster {
    pub fn new(data_shards: usize, parity_shards: usize, protocol_version: u16) -> Result<Self, anyhow::Error> {
        Ok(TurbineBroadcaster {
            encoder: ReedSolomonEncoder::new(data_shards, parity_shards)?,
            protocol_version,
            max_retransmit_attempts: DEFAULT_MAX_RETRANSMIT_ATTEMPTS,
            max_retransmit_peers: DEFAULT_MAX_RETRANSMIT_PEERS,
        })
    }

    /// Overrides the retransmit budget (defaults: 3 attempts, 4 peers).
    pub fn set_retransmit_params(&mut self, max_attempts: u32, max_peers: usize) {
        self.max_retransmit_attempts = max_attempts;
        self.max_retransmit_peers = max_peers;
    }

    pub fn shard_count(&self) -> usize {
        self.encoder.data_shards + self.encoder.parity_shards
    }

    /// Encodes `payload` into shreds for `slot`, signing each over its
    /// signed range via `sign`. Coding shreds carry a non-zero
    /// `fec_set_index`; data shreds carry zero.
    pub fn make_shreds<S>(
        &self,
        slot: Slot,
        fec_set_index: u16,
        payload: &[u8],
        mut sign: S,
    ) -> Result<Vec<Shred>, ShredError>
    where
        S: FnMut(&[u8]) -> Signature,
    {
        let shards = self
            .encoder
            .encode(payload)
            .map_err(|_| ShredError::PayloadTooLarge(payload.len()))?;

        shards
            .into_iter()
            .enumerate()
            .map(|(idx, chunk)| {
                let is_coding = idx >= self.encoder.data_shards;
                let variant = if is_coding { ShredVariant::Coding } else { ShredVariant::Data };
                let fec = if is_coding { fec_set_index.max(1) } else { 0 };
                Shred::new(variant, slot, idx as u32, self.protocol_version, fec, chunk, &mut sign)
            })
            .collect()
    }

    /// Best-effort broadcast of `shreds` to every child of `self_index` in
    /// `tree`, plus its retransmit peers while the shred is still within
    /// `max_retransmit_attempts`. Stamps `tracker` with the send and bumps
    /// the per-shred retransmit count regardless of how many targets were
    /// actually reached.
    pub fn broadcast<F>(&self, tree: &TurbineTree, shreds: &[Shred], tracker: &ShredTracker, mut send: F)
    where
        F: FnMut(&Shred, &TurbineNode),
    {
        let mut sent = 0u64;
        let self_index = tree.self_index();
        let children = tree.children(self_index);

        for shred in shreds {
            let key = (shred.slot, shred.index);

            let mut targets = children.clone();
            if tracker.retransmit_count(key) < self.max_retransmit_attempts {
                targets.extend(tree.retransmit_peers(self_index, self.max_retransmit_peers));
            }

            for target in &targets {
                if let Some(node) = tree.node_at(*target) {
                    send(shred, node);
                    sent += 1;
                }
            }

            if !targets.is_empty() {
                tracker.record_sent(key);
            }
        }
        vcore_metrics::DA_METRICS.shreds_broadcasted.inc_by(sent);
    }
}
