use serde::{Deserialize, Serialize};
use vcore_types::{Signature, Slot};

/// Fixed header byte widths: signature(64) + variant(1) + slot(8) +
/// index(4) + version(2) + fec_set_index(2).
pub const HEADER_SIZE: usize = 64 + 1 + 8 + 4 + 2 + 2;
pub const MAX_SHRED_SIZE: usize = 1280;
pub const MAX_PAYLOAD_SIZE: usize = MAX_SHRED_SIZE - HEADER_SIZE;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[repr(u8)]
pub enum ShredVariant {
    Data = 0,
    Coding = 1,
}

impl ShredVariant {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b & 1 {
            0 => Some(ShredVariant::Data),
            1 => Some(ShredVariant::Coding),
            _ => unreachable!(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShredError {
    #[error("payload of {0} bytes exceeds max payload size {MAX_PAYLOAD_SIZE}")]
    PayloadTooLarge(usize),
}

/// A single data or coding fragment of a block, signed over everything but
/// the signature field itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shred {
    pub signature: Signature,
    pub variant: ShredVariant,
    pub slot: Slot,
    pub index: u32,
    pub version: u16,
    pub fec_set_index: u16,
    pub payload: Vec<u8>,
}

impl Shred {
    #[allow(clippy::too_many_arguments)]
    pub fn new<S>(
        variant: ShredVariant,
        slot: Slot,
        index: u32,
        version: u16,
        fec_set_index: u16,
        payload: Vec<u8>,
        sign: S,
    ) -> Result<Self, ShredError>
    where
        S: FnOnce(&[u8]) -> Signature,
    {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ShredError::PayloadTooLarge(payload.len()));
        }
        let signed_range = signed_bytes(variant, slot, index, version, fec_set_index, &payload);
        let signature = sign(&signed_range);
        Ok(Shred {
            signature,
            variant,
            slot,
            index,
            version,
            fec_set_index,
            payload,
        })
    }

    /// The byte range the signature covers: the header minus the
    /// signature field, followed by the payload.
    pub fn signed_range(&self) -> Vec<u8> {
        signed_bytes(
            self.variant,
            self.slot,
            self.index,
            self.version,
            self.fec_set_index,
            &self.payload,
        )
    }

    pub fn verify<V>(&self, verify: V) -> bool
    where
        V: FnOnce(&[u8], &Signature) -> bool,
    {
        verify(&self.signed_range(), &self.signature)
    }

    /// `type = variant & 1`.
    pub fn shred_type(&self) -> u8 {
        self.variant as u8 & 1
    }

    pub fn total_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

fn signed_bytes(
    variant: ShredVariant,
    slot: Slot,
    index: u32,
    version: u16,
    fec_set_index: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + 8 + 4 + 2 + 2 + payload.len());
    out.push(variant as u8);
    out.extend_from_slice(&slot.to_le_bytes());
    out.extend_from_slice(&index.to_le_bytes());
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&fec_set_index.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_sign(_: &[u8]) -> Signature {
        Signature::zero()
    }

    #[test]
    fn new_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_PAYLOAD_SIZE + 1];
        assert!(Shred::new(ShredVariant::Data, 1, 0, 1, 0, payload, dummy_sign).is_err());
    }

    #[test]
    fn verify_accepts_matching_signed_range() {
        let shred = Shred::new(ShredVariant::Data, 5, 2, 1, 0, vec![1, 2, 3], dummy_sign).unwrap();
        assert!(shred.verify(|range, sig| {
            assert_eq!(range, shred.signed_range());
            *sig == Signature::zero()
        }));
    }

    #[test]
    fn shred_type_is_variant_parity() {
        let data = Shred::new(ShredVariant::Data, 1, 0, 1, 0, vec![], dummy_sign).unwrap();
        let coding = Shred::new(ShredVariant::Coding, 1, 0, 1, 1, vec![], dummy_sign).unwrap();
        assert_eq!(data.shred_type(), 0);
        assert_eq!(coding.shred_type(), 1);
    }

    #[test]
    fn total_size_includes_header() {
        let shred = Shred::new(ShredVariant::Data, 1, 0, 1, 0, vec![0u8; 100], dummy_sign).unwrap();
        assert_eq!(shred.total_size(), HEADER_SIZE + 100);
    }
}
