use crate::shred::{Shred, ShredError, ShredVariant, MAX_PAYLOAD_SIZE};
use vcore_types::{Signature, Slot};

/// Splits `data` into successive `MAX_PAYLOAD_SIZE` slices, each wrapped as
/// a data shred with contiguous indices starting at `start_index`.
pub fn split_into_shreds<S>(
    data: &[u8],
    slot: Slot,
    version: u16,
    fec_set_index: u16,
    start_index: u32,
    mut sign: S,
) -> Result<Vec<Shred>, ShredError>
where
    S: FnMut(&[u8]) -> Signature,
{
    data.chunks(MAX_PAYLOAD_SIZE)
        .enumerate()
        .map(|(offset, chunk)| {
            Shred::new(
                ShredVariant::Data,
                slot,
                start_index + offset as u32,
                version,
                fec_set_index,
                chunk.to_vec(),
                &mut sign,
            )
        })
        .collect()
}

/// Reconstructs the original byte sequence by sorting shreds by index
/// ascending and concatenating payloads.
pub fn reconstruct_payload(shreds: &[Shred]) -> Vec<u8> {
    let mut ordered: Vec<&Shred> = shreds.iter().collect();
    ordered.sort_by_key(|s| s.index);
    ordered.into_iter().flat_map(|s| s.payload.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_sign(_: &[u8]) -> Signature {
        Signature::zero()
    }

    #[test]
    fn split_then_reconstruct_roundtrips() {
        let data = vec![7u8; MAX_PAYLOAD_SIZE * 3 + 17];
        let shreds = split_into_shreds(&data, 1, 1, 0, 100, dummy_sign).unwrap();
        assert_eq!(shreds.len(), 4);
        assert_eq!(shreds[0].index, 100);
        assert_eq!(shreds[3].index, 103);
        assert_eq!(reconstruct_payload(&shreds), data);
    }

    #[test]
    fn reconstruct_is_order_independent_of_input_order() {
        let data = vec![1u8; MAX_PAYLOAD_SIZE + 10];
        let mut shreds = split_into_shreds(&data, 1, 1, 0, 0, dummy_sign).unwrap();
        shreds.reverse();
        assert_eq!(reconstruct_payload(&shreds), data);
    }

    #[test]
    fn empty_input_yields_no_shreds() {
        let shreds = split_into_shreds(&[], 1, 1, 0, 0, dummy_sign).unwrap();
        assert!(shreds.is_empty());
    }
}
