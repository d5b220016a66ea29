use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte opaque identifier (block hash, tx hash, shred merkle root, ...).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    pub const fn zero() -> Self {
        Hash([0u8; 32])
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, &'static str> {
        if bytes.len() != 32 {
            return Err("invalid length");
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Hash(arr))
    }

    pub fn sha256(data: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(data);
        Hash(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0[..8]))
    }
}

/// Monotonically increasing index into logical validator time.
pub type Slot = u64;

/// 32-byte validator/account identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub const fn zero() -> Self {
        PublicKey([0u8; 32])
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, &'static str> {
        if bytes.len() != 32 {
            return Err("invalid length");
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(PublicKey(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PubKey({})", bs58::encode(self.0).into_string())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

/// 64-byte detached signature, verified against a `PublicKey` via
/// `SignatureVerifier`.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub fn zero() -> Self {
        Signature([0u8; 64])
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, &'static str> {
        if bytes.len() != 64 {
            return Err("invalid length");
        }
        let mut arr = [0u8; 64];
        arr.copy_from_slice(bytes);
        Ok(Signature(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Sig({}..)", hex::encode(&self.0[..8]))
    }
}

/// base58(signature bytes), isolated as a pure function per the ad-hoc
/// base58 design note rather than scattered at call sites.
pub fn base58_signature(sig: &Signature) -> String {
    bs58::encode(sig.as_bytes()).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_zero_roundtrips() {
        let h = Hash::zero();
        assert_eq!(Hash::from_slice(h.as_bytes()).unwrap(), h);
    }

    #[test]
    fn hash_rejects_wrong_length() {
        assert!(Hash::from_slice(&[0u8; 31]).is_err());
    }

    #[test]
    fn pubkey_display_is_base58() {
        let pk = PublicKey([1u8; 32]);
        let s = pk.to_string();
        assert!(bs58::decode(&s).into_vec().is_ok());
    }

    #[test]
    fn base58_signature_is_deterministic() {
        let sig = Signature([7u8; 64]);
        assert_eq!(base58_signature(&sig), base58_signature(&sig));
    }
}
