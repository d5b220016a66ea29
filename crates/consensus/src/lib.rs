// ============================================================================
// VALIDATOR CORE CONSENSUS
// ============================================================================
// PURPOSE: Lockout algebra (C2), Tower BFT (C3), and stake-weighted fork
// choice (C4) — the subsystem deciding which block becomes canonical.
// ============================================================================

pub mod fork_choice;
pub mod lockout;
pub mod tower;

pub use fork_choice::{
    BlockMetadata, Fork, ForkChoiceConfig, ForkChoiceEngine, ForkId, VoteInfo,
};
pub use lockout::{validate_lockouts, Lockout, LockoutSet, MAX_LOCKOUT_HISTORY};
pub use tower::{Tower, VoteState};
