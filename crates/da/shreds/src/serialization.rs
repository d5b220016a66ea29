use crate::shred::Shred;
use bincode::{deserialize, serialize};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("bincode encode failed: {0}")]
    Encode(#[from] bincode::Error),
}

pub fn serialize_shred(shred: &Shred) -> Result<Vec<u8>, CodecError> {
    Ok(serialize(shred)?)
}

pub fn deserialize_shred(bytes: &[u8]) -> Result<Shred, CodecError> {
    Ok(deserialize(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shred::ShredVariant;
    use vcore_types::Signature;

    #[test]
    fn roundtrip() {
        let shred = Shred::new(ShredVariant::Data, 1, 0, 1, 0, vec![1, 2, 3], |_| {
            Signature::zero()
        })
        .unwrap();

        let bytes = serialize_shred(&shred).unwrap();
        let decoded = deserialize_shred(&bytes).unwrap();
        assert_eq!(shred, decoded);
    }
}
