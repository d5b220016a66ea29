use std::time::{SystemTime, UNIX_EPOCH};

/// Priority band a packet's `priority` byte falls into. Low < 64, normal
/// 64-191, high >= 192.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PriorityBand {
    Low,
    Normal,
    High,
}

impl PriorityBand {
    pub fn of(priority: u8) -> Self {
        match priority {
            0..=63 => PriorityBand::Low,
            64..=191 => PriorityBand::Normal,
            192..=255 => PriorityBand::High,
        }
    }
}

/// A single outbound or inbound UDP datagram plus its routing and priority
/// metadata.
#[derive(Debug, Clone)]
pub struct Packet {
    pub data: Vec<u8>,
    pub destination_addr: String,
    pub destination_port: u16,
    pub timestamp: u64,
    pub priority: u8,
}

impl Packet {
    pub fn new(data: Vec<u8>, destination_addr: String, destination_port: u16) -> Self {
        Packet {
            data,
            destination_addr,
            destination_port,
            timestamp: now_millis(),
            priority: 128,
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn band(&self) -> PriorityBand {
        PriorityBand::of(self.priority)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_bands_match_spec_boundaries() {
        assert_eq!(PriorityBand::of(0), PriorityBand::Low);
        assert_eq!(PriorityBand::of(63), PriorityBand::Low);
        assert_eq!(PriorityBand::of(64), PriorityBand::Normal);
        assert_eq!(PriorityBand::of(191), PriorityBand::Normal);
        assert_eq!(PriorityBand::of(192), PriorityBand::High);
        assert_eq!(PriorityBand::of(255), PriorityBand::High);
    }

    #[test]
    fn new_packet_defaults_to_normal_priority() {
        let p = Packet::new(vec![1, 2, 3], "127.0.0.1".into(), 9000);
        assert_eq!(p.band(), PriorityBand::Normal);
    }
}
