use crate::shred::{Shred, HEADER_SIZE, MAX_PAYLOAD_SIZE, MAX_SHRED_SIZE};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("payload size {0} exceeds max payload size {MAX_PAYLOAD_SIZE}")]
    PayloadTooLarge(usize),
    #[error("total shred size {0} exceeds {MAX_SHRED_SIZE}")]
    ShredTooLarge(usize),
    #[error("version must be non-zero")]
    ZeroVersion,
}

/// Header size ≥ fixed; payload size within limit; total size ≤ 1280;
/// version ≠ 0.
pub fn validate_shred(shred: &Shred) -> Result<(), ValidationError> {
    if shred.payload.len() > MAX_PAYLOAD_SIZE {
        return Err(ValidationError::PayloadTooLarge(shred.payload.len()));
    }
    if shred.total_size() > MAX_SHRED_SIZE {
        return Err(ValidationError::ShredTooLarge(shred.total_size()));
    }
    if shred.version == 0 {
        return Err(ValidationError::ZeroVersion);
    }
    debug_assert!(HEADER_SIZE < MAX_SHRED_SIZE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shred::ShredVariant;
    use vcore_types::Signature;

    fn dummy_sign(_: &[u8]) -> Signature {
        Signature::zero()
    }

    #[test]
    fn rejects_zero_version() {
        let shred = Shred::new(ShredVariant::Data, 1, 0, 0, 0, vec![1], dummy_sign).unwrap();
        assert_eq!(validate_shred(&shred), Err(ValidationError::ZeroVersion));
    }

    #[test]
    fn accepts_well_formed_shred() {
        let shred = Shred::new(ShredVariant::Data, 1, 0, 1, 0, vec![1, 2, 3], dummy_sign).unwrap();
        assert!(validate_shred(&shred).is_ok());
    }

    #[test]
    fn rejects_oversized_payload() {
        let shred = Shred::new(
            ShredVariant::Data,
            1,
            0,
            1,
            0,
            vec![0u8; MAX_PAYLOAD_SIZE],
            dummy_sign,
        )
        .unwrap();
        assert!(validate_shred(&shred).is_ok());
    }
}
