//! In-process stand-in for the network: fixed latency, periodic loss and optional reordering.
//!
//! Without reordering, delivery order equals send order, even when the latency is lowered
//! while packets are in flight (head-of-line blocking). With reordering on, every Nth snapshot
//! is held back and overtaken by the ones sent after it, which is what a `Discard` observer is
//! there to cope with.

use bevy::prelude::*;
use shared::{Seconds, Snapshot};

/// Tunable link quality.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct LinkConditions {
    /// One-way delay applied to every snapshot.
    pub latency: Seconds,
    /// Drop every Nth snapshot; `0` disables loss.
    pub drop_every: u32,
    /// Hold back every Nth snapshot by `hold_back`; `0` keeps send order.
    pub reorder_every: u32,
    pub hold_back: Seconds,
}

impl Default for LinkConditions {
    fn default() -> Self {
        Self {
            latency: 0.05,
            drop_every: 0,
            reorder_every: 0,
            hold_back: 0.05,
        }
    }
}

impl LinkConditions {
    /// Latencies the demo cycles through.
    pub const LATENCY_STEPS: [Seconds; 4] = [0.0, 0.05, 0.15, 0.4];

    pub fn next_latency(&self) -> Seconds {
        let steps = Self::LATENCY_STEPS;
        let current = steps
            .iter()
            .position(|&l| (l - self.latency).abs() < 1.0e-9)
            .unwrap_or(0);
        steps[(current + 1) % steps.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct InFlight {
    deliver_at: Seconds,
    order: u64,
    object_id: u64,
    snapshot: Snapshot,
}

#[derive(Resource, Debug, Default)]
pub struct LoopbackLink {
    queue: Vec<InFlight>,
    sent: u64,
    dropped: u64,
    held_back: u64,
    /// Delivery time of the latest in-order packet; later in-order packets never beat it.
    in_order_until: Seconds,
}

impl LoopbackLink {
    pub fn send(
        &mut self,
        conditions: &LinkConditions,
        now: Seconds,
        object_id: u64,
        snapshot: Snapshot,
    ) {
        self.sent += 1;
        if conditions.drop_every > 0 && self.sent % conditions.drop_every as u64 == 0 {
            self.dropped += 1;
            log::trace!("Link dropped snapshot #{} of object {object_id}", snapshot.sequence);
            return;
        }

        let arrival = now + conditions.latency.max(0.0);
        let deliver_at =
            if conditions.reorder_every > 0 && self.sent % conditions.reorder_every as u64 == 0 {
                self.held_back += 1;
                arrival + conditions.hold_back.max(0.0)
            } else {
                self.in_order_until = self.in_order_until.max(arrival);
                self.in_order_until
            };

        self.queue.push(InFlight {
            deliver_at,
            order: self.sent,
            object_id,
            snapshot,
        });
    }

    /// Remove every snapshot due at `now`, earliest first (send order on ties).
    pub fn deliver(&mut self, now: Seconds) -> Vec<(u64, Snapshot)> {
        let mut due: Vec<InFlight> = Vec::new();
        self.queue.retain(|packet| {
            if packet.deliver_at <= now {
                due.push(*packet);
                false
            } else {
                true
            }
        });

        due.sort_by(|a, b| a.deliver_at.total_cmp(&b.deliver_at).then(a.order.cmp(&b.order)));
        due.into_iter().map(|p| (p.object_id, p.snapshot)).collect()
    }

    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn held_back(&self) -> u64 {
        self.held_back
    }
}
