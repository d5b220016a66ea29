// ============================================================================
// VALIDATOR CORE CRYPTO PRIMITIVES
// ============================================================================
// PURPOSE: Ed25519 signing/verification behind the SignatureVerifier
// contract (C6), plus general-purpose hashing.
// ============================================================================

pub mod ed25519;
pub mod hash;
pub mod keypair;
pub mod verifier;

pub use ed25519::Keypair as Ed25519Keypair;
pub use hash::{blake3_hash, hash_multiple, sha256};
pub use keypair::Keypair;
pub use verifier::{sign, verify, Ed25519Verifier, SignatureVerifier};
