use sha2::{Digest, Sha256};
use std::collections::HashMap;
use vcore_types::PublicKey;

/// A fleet member the local node knows about.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TurbineNode {
    pub pubkey: PublicKey,
    pub address: String,
    pub port: u16,
    pub stake_weight: u64,
}

/// Ordered node vector sorted by stake descending, with a fanout and an
/// index map for O(1) lookups.
#[derive(Clone, Debug)]
pub struct TurbineTree {
    nodes: Vec<TurbineNode>,
    fanout: usize,
    index: HashMap<(PublicKey, String, u16), usize>,
    self_index: usize,
}

impl TurbineTree {
    /// Builds the tree from `validators`, prepending `self_node` if it
    /// isn't already present, sorted by stake descending.
    pub fn build(mut validators: Vec<TurbineNode>, self_node: TurbineNode, fanout: usize) -> Self {
        if !validators.iter().any(|n| *n == self_node) {
            validators.push(self_node.clone());
        }
        validators.sort_by(|a, b| b.stake_weight.cmp(&a.stake_weight));

        let mut index = HashMap::with_capacity(validators.len());
        for (i, node) in validators.iter().enumerate() {
            index.insert((node.pubkey, node.address.clone(), node.port), i);
        }
        let self_index = index[&(self_node.pubkey, self_node.address.clone(), self_node.port)];

        TurbineTree {
            nodes: validators,
            fanout: fanout.max(1),
            index,
            self_index,
        }
    }

    pub fn nodes(&self) -> &[TurbineNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn self_index(&self) -> usize {
        self.self_index
    }

    pub fn index_of(&self, node: &TurbineNode) -> Option<usize> {
        self.index.get(&(node.pubkey, node.address.clone(), node.port)).copied()
    }

    pub fn node_at(&self, index: usize) -> Option<&TurbineNode> {
        self.nodes.get(index)
    }

    /// Children of index `i`: `F*i+1 .. F*i+F`, clipped to bounds.
    pub fn children(&self, i: usize) -> Vec<usize> {
        let start = self.fanout * i + 1;
        (start..start + self.fanout).filter(|&j| j < self.nodes.len()).collect()
    }

    /// Parent of `i` (`i > 0`) is `(i-1) / F`.
    pub fn parent(&self, i: usize) -> Option<usize> {
        if i == 0 {
            None
        } else {
            Some((i - 1) / self.fanout)
        }
    }

    /// Retransmit peers of `i`: every other index `j` such that
    /// `(hash(node_i) XOR hash(node_j)) mod N < R`, capped at `R` total.
    pub fn retransmit_peers(&self, i: usize, max_peers: usize) -> Vec<usize> {
        let n = self.nodes.len() as u64;
        if n == 0 || max_peers == 0 {
            return Vec::new();
        }
        let hash_i = node_hash(&self.nodes[i]);
        let mut peers = Vec::new();
        for (j, node) in self.nodes.iter().enumerate() {
            if j == i {
                continue;
            }
            let hash_j = node_hash(node);
            if (hash_i ^ hash_j) % n < max_peers as u64 {
                peers.push(j);
                if peers.len() >= max_peers {
                    break;
                }
            }
        }
        peers
    }
}

fn node_hash(node: &TurbineNode) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(node.pubkey.as_bytes());
    hasher.update(node.address.as_bytes());
    hasher.update(node.port.to_le_bytes());
    let digest = hasher.finalize();
    u64::from_le_bytes(digest[..8].try_into().unwrap())
}
