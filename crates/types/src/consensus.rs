use crate::primitives::PublicKey;
use serde::{Deserialize, Serialize};

/// Stake-table entry shared by fork choice, Turbine topology, and the
/// connection cache — anything that needs "how much stake does this
/// validator have" without depending on `vcore-consensus`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub pubkey: PublicKey,
    pub stake: u64,
}
