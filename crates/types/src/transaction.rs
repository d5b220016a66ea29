use crate::error::{CoreError, Result};
use crate::primitives::{Hash, PublicKey, Signature};
use serde::{Deserialize, Serialize};

/// A signed message submitted to the banking pipeline. `message` is opaque
/// to the validator core — interpretation is the `ExecutionEngine`'s job.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Vec<u8>,
    pub hash: Hash,
}

impl Transaction {
    /// Builds a transaction and computes its canonical hash over
    /// `message` alone (signatures are not covered by the hash).
    pub fn new(signatures: Vec<Signature>, message: Vec<u8>) -> Self {
        let hash = Hash::sha256(&message);
        Transaction {
            signatures,
            message,
            hash,
        }
    }

    pub fn recompute_hash(&mut self) {
        self.hash = Hash::sha256(&self.message);
    }

    /// Checks the hash is consistent with `message` and that at least one
    /// signature is present. Cryptographic verification against signer
    /// keys is the caller's `SignatureVerifier`'s job — this only validates
    /// the transaction's internal structure.
    pub fn verify_structure(&self) -> Result<()> {
        if self.signatures.is_empty() {
            return Err(CoreError::InvalidInput("transaction has no signatures".into()));
        }
        if self.hash != Hash::sha256(&self.message) {
            return Err(CoreError::InvalidInput("transaction hash mismatch".into()));
        }
        Ok(())
    }

    /// Verifies every signature against `signers` pairwise using the
    /// supplied verifier, short-circuiting on the first failure (Open
    /// Question: failed validations must not reach execution — see
    /// banking pipeline).
    pub fn verify_signatures<V>(&self, signers: &[PublicKey], verifier: &V) -> Result<()>
    where
        V: Fn(&PublicKey, &[u8], &Signature) -> bool,
    {
        if signers.len() != self.signatures.len() {
            return Err(CoreError::InvalidInput(
                "signer/signature count mismatch".into(),
            ));
        }
        for (pk, sig) in signers.iter().zip(self.signatures.iter()) {
            if !verifier(pk, &self.message, sig) {
                return Err(CoreError::InvalidInput("signature verification failed".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier_always_ok(_: &PublicKey, _: &[u8], _: &Signature) -> bool {
        true
    }

    fn verifier_always_fail(_: &PublicKey, _: &[u8], _: &Signature) -> bool {
        false
    }

    #[test]
    fn new_computes_hash_over_message() {
        let tx = Transaction::new(vec![Signature::zero()], b"payload".to_vec());
        assert_eq!(tx.hash, Hash::sha256(b"payload"));
    }

    #[test]
    fn verify_structure_rejects_empty_signatures() {
        let tx = Transaction::new(vec![], b"payload".to_vec());
        assert!(tx.verify_structure().is_err());
    }

    #[test]
    fn verify_structure_rejects_tampered_hash() {
        let mut tx = Transaction::new(vec![Signature::zero()], b"payload".to_vec());
        tx.hash = Hash::zero();
        assert!(tx.verify_structure().is_err());
    }

    #[test]
    fn verify_signatures_checks_count_and_verifier() {
        let tx = Transaction::new(vec![Signature::zero()], b"payload".to_vec());
        let signer = PublicKey::zero();
        assert!(tx.verify_signatures(&[signer], &verifier_always_ok).is_ok());
        assert!(tx.verify_signatures(&[signer], &verifier_always_fail).is_err());
        assert!(tx.verify_signatures(&[], &verifier_always_ok).is_err());
    }
}
