// ============================================================================
// VALIDATOR CORE SHRED MODEL (C6)
// ============================================================================
// PURPOSE: Wire format for a block's fragments, framing and validation of
// fixed-size shreds carried by Turbine (C7) over the UDP transport (C8).
//
// SHRED FORMAT (packed little-endian):
// signature(64) | variant(1) | slot(8) | index(4) | version(2) |
// fec_set_index(2) | payload(<= 1280 - header_size)
//
// The signature covers everything but itself: variant..payload.
// ============================================================================

pub mod framing;
pub mod serialization;
pub mod shred;
pub mod validation;

pub use framing::{reconstruct_payload, split_into_shreds};
pub use serialization::{deserialize_shred, serialize_shred, CodecError};
pub use shred::{Shred, ShredError, ShredVariant, HEADER_SIZE, MAX_PAYLOAD_SIZE, MAX_SHRED_SIZE};
pub use validation::{validate_shred, ValidationError};
