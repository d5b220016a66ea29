use crate::packet::{Packet, PriorityBand};
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

struct Lanes {
    high: VecDeque<Packet>,
    normal: VecDeque<Packet>,
    low: VecDeque<Packet>,
}

impl Lanes {
    fn total(&self) -> usize {
        self.high.len() + self.normal.len() + self.low.len()
    }
}

/// Three-lane priority queue feeding the sender workers. Enqueue never
/// blocks; it either succeeds or is rejected once `capacity` packets are
/// already queued. Dequeue blocks on a condvar until work arrives or the
/// caller's timeout elapses, draining high before normal before low.
pub struct PacketQueue {
    lanes: Mutex<Lanes>,
    cond: Condvar,
    capacity: usize,
}

impl PacketQueue {
    pub fn new(capacity: usize) -> Self {
        PacketQueue {
            lanes: Mutex::new(Lanes {
                high: VecDeque::new(),
                normal: VecDeque::new(),
                low: VecDeque::new(),
            }),
            cond: Condvar::new(),
            capacity,
        }
    }

    /// Enqueues `packet`. Returns `false` (and leaves `packet` dropped) if
    /// the queue is already at `capacity` — the caller is the backpressure
    /// signal and may retry or drop.
    pub fn enqueue(&self, packet: Packet) -> bool {
        let mut lanes = self.lanes.lock().unwrap();
        if lanes.total() >= self.capacity {
            return false;
        }
        match packet.band() {
            PriorityBand::High => lanes.high.push_back(packet),
            PriorityBand::Normal => lanes.normal.push_back(packet),
            PriorityBand::Low => lanes.low.push_back(packet),
        }
        self.cond.notify_one();
        true
    }

    /// Drains up to `max` packets, high lane first, blocking up to
    /// `timeout` if the queue starts empty. Returns an empty vec on
    /// timeout, never panics or spins indefinitely.
    pub fn drain_batch(&self, max: usize, timeout: Duration) -> Vec<Packet> {
        let lanes = self.lanes.lock().unwrap();
        let (mut lanes, _) = self
            .cond
            .wait_timeout_while(lanes, timeout, |lanes| lanes.total() == 0)
            .unwrap();

        let mut batch = Vec::with_capacity(max.min(lanes.total()));
        while batch.len() < max {
            if let Some(p) = lanes.high.pop_front() {
                batch.push(p);
            } else if let Some(p) = lanes.normal.pop_front() {
                batch.push(p);
            } else if let Some(p) = lanes.low.pop_front() {
                batch.push(p);
            } else {
                break;
            }
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.lanes.lock().unwrap().total()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify_all(&self) {
        self.cond.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkt(priority: u8) -> Packet {
        Packet::new(vec![0u8; 4], "127.0.0.1".into(), 9000).with_priority(priority)
    }

    #[test]
    fn enqueue_rejects_past_capacity() {
        let q = PacketQueue::new(1);
        assert!(q.enqueue(pkt(100)));
        assert!(!q.enqueue(pkt(100)));
    }

    #[test]
    fn drain_batch_prefers_high_then_normal_then_low() {
        let q = PacketQueue::new(16);
        q.enqueue(pkt(10));
        q.enqueue(pkt(200));
        q.enqueue(pkt(100));

        let batch = q.drain_batch(16, Duration::from_millis(50));
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].priority, 200);
        assert_eq!(batch[1].priority, 100);
        assert_eq!(batch[2].priority, 10);
    }

    #[test]
    fn drain_batch_respects_max() {
        let q = PacketQueue::new(16);
        for _ in 0..5 {
            q.enqueue(pkt(200));
        }
        let batch = q.drain_batch(2, Duration::from_millis(50));
        assert_eq!(batch.len(), 2);
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn drain_batch_times_out_on_empty_queue() {
        let q = PacketQueue::new(16);
        let batch = q.drain_batch(16, Duration::from_millis(10));
        assert!(batch.is_empty());
    }
}
