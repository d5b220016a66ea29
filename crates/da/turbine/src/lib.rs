// ============================================================================
// VALIDATOR CORE TURBINE TREE & BROADCAST (C7)
// ============================================================================
// PURPOSE: Stake-weighted distribution tree, children/retransmit peer
// selection, and best-effort shred broadcast/receive over the shred model
// (C6) and UDP batch transport (C8).
// ============================================================================

pub mod broadcast;
pub mod receive;
pub mod repair;
pub mod topology;
pub mod tracking;

pub use broadcast::TurbineBroadcaster;
pub use receive::{ReceiveError, TurbineReceiver};
pub use repair::missing_indices;
pub use topology::{TurbineNode, TurbineTree};
pub use tracking::ShredTracker;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{seq::SliceRandom, Rng};
    use vcore_types::{PublicKey, Signature};

    fn node(byte: u8, stake: u64) -> TurbineNode {
        TurbineNode {
            pubkey: PublicKey([byte; 32]),
            address: format!("10.0.0.{byte}"),
            port: 8000 + byte as u16,
            stake_weight: stake,
        }
    }

    #[test]
    fn turbine_packet_loss_resilience() {
        const DATA_SHARDS: usize = 10;
        const PARITY_SHARDS: usize = 2;
        const TOTAL_SHREDS: usize = DATA_SHARDS + PARITY_SHARDS;
        const TRIALS: usize = 100;

        let broadcaster = TurbineBroadcaster::new(DATA_SHARDS, PARITY_SHARDS, 1).unwrap();
        let nodes: Vec<_> = (0..20).map(|b| node(b, 100 - b as u64)).collect();
        let tree = TurbineTree::build(nodes, node(200, 5), 2);
        let tracker = ShredTracker::new();
        let mut rng = rand::thread_rng();
        let mut successes = 0usize;

        for trial in 0..TRIALS {
            let payload = format!("turbine payload {trial}").into_bytes();
            let shreds = broadcaster
                .make_shreds(trial as u64, 1, &payload, |_| Signature::zero())
                .expect("shreds");

            let drop_count = rng.gen_range(0..=PARITY_SHARDS);
            let mut indices: Vec<usize> = (0..TOTAL_SHREDS).collect();
            indices.shuffle(&mut rng);
            let drop_set: std::collections::HashSet<_> =
                indices.into_iter().take(drop_count).collect();

            let mut receiver = TurbineReceiver::new(DATA_SHARDS, PARITY_SHARDS).unwrap();
            let mut recovered = false;

            for (idx, shred) in shreds.into_iter().enumerate() {
                if drop_set.contains(&idx) {
                    continue;
                }
                if let Some(block) = receiver
                    .ingest_shred(shred, &tree, &tracker, &broadcaster, |_, _| {})
                    .unwrap()
                {
                    assert_eq!(block, payload);
                    recovered = true;
                    successes += 1;
                    break;
                }
            }

            assert!(recovered, "failed to reconstruct despite <= parity loss (trial {trial})");
        }

        let success_rate = successes as f64 / TRIALS as f64;
        assert!(success_rate >= 0.99, "success rate {success_rate} below threshold");
    }
}
