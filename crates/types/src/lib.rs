// ============================================================================
// VALIDATOR CORE TYPES - Canonical Type Definitions
// ============================================================================
// PURPOSE: Shared types used across all validator core components
//
// CORE TYPES:
// - Hash: 32-byte identifier
// - PublicKey: 32-byte validator identity
// - Signature: 64-byte detached signature
// - Transaction, Block
// - Slot
//
// All types implement:
// - Serialize/Deserialize (serde)
// - Clone, Debug
// - Consistent encoding (for hashing)
// ============================================================================

pub mod block;
pub mod config;
pub mod consensus;
pub mod error;
pub mod primitives;
pub mod transaction;

pub use block::Block;
pub use config::ValidatorCoreConfig;
pub use consensus::ValidatorInfo;
pub use error::{CoreError, Result};
pub use primitives::{base58_signature, Hash, PublicKey, Signature, Slot};
pub use transaction::Transaction;
