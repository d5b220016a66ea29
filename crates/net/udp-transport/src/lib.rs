// ============================================================================
// VALIDATOR CORE UDP BATCH TRANSPORT (C8)
// ============================================================================
// PURPOSE: Lock-free priority-queued packet transport targeting
// >= 50,000 pkt/s with small packets, using sendmmsg/recvmmsg batching
// where the OS supports it and a per-packet fallback otherwise.
// ============================================================================

pub mod packet;
pub mod queue;
pub mod socket_ops;
pub mod stats;
pub mod transport;

pub use packet::{Packet, PriorityBand};
pub use queue::PacketQueue;
pub use stats::BatchStats;
pub use transport::{TransportError, UdpTransport, UdpTransportConfig};
