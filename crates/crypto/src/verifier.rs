use crate::ed25519::{self, Ed25519Error};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use vcore_types::{PublicKey, Signature};

/// The `SignatureVerifier` capability consumed by shred construction (C6):
/// sign over a message, verify a detached signature against a public key.
pub trait SignatureVerifier: Send + Sync {
    fn sign(&self, message: &[u8], private_key: &SigningKey) -> Signature;
    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool;
}

/// Ed25519-backed verifier, the only implementation this crate ships.
#[derive(Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn sign(&self, message: &[u8], private_key: &SigningKey) -> Signature {
        let sig = private_key.sign(message);
        Signature(sig.to_bytes())
    }

    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        verify_detached(message, signature, public_key).is_ok()
    }
}

fn verify_detached(
    message: &[u8],
    signature: &Signature,
    public_key: &PublicKey,
) -> Result<(), Ed25519Error> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key.as_bytes()).map_err(|_| Ed25519Error::PublicKey)?;
    let dalek_sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    verifying_key
        .verify(message, &dalek_sig)
        .map_err(|_| Ed25519Error::Signature)
}

/// Convenience free-function wrapper, used where a full `Ed25519Verifier`
/// instance would be overkill.
pub fn verify(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    Ed25519Verifier.verify(message, signature, public_key)
}

pub fn sign(message: &[u8], private_key: &SigningKey) -> Signature {
    Ed25519Verifier.sign(message, private_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_roundtrips() {
        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        let public_key = PublicKey(signing_key.verifying_key().to_bytes());
        let signature = sign(b"payload", &signing_key);
        assert!(verify(b"payload", &signature, &public_key));
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        let public_key = PublicKey(signing_key.verifying_key().to_bytes());
        let mut signature = sign(b"payload", &signing_key);
        signature.0[0] ^= 0x01;
        assert!(!verify(b"payload", &signature, &public_key));
    }

    #[test]
    fn wrong_message_fails_verification() {
        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        let public_key = PublicKey(signing_key.verifying_key().to_bytes());
        let signature = sign(b"payload", &signing_key);
        assert!(!verify(b"other", &signature, &public_key));
    }
}
