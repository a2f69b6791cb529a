use crate::transform::Transform;

/// One authoritative sample of a replicated object's pose, transmitted atomically.
///
/// `sequence` is stamped by the authority and wraps on overflow. Observers only look at it
/// when configured to discard stale snapshots; by default delivery order is trusted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub sequence: u32,
    pub transform: Transform,
}

impl Snapshot {
    pub fn new(sequence: u32, transform: Transform) -> Self {
        Self {
            sequence,
            transform,
        }
    }

    /// Serial-number comparison (RFC 1982 style): `true` if `self` was sent after `other`,
    /// tolerating wrap-around of the sequence counter.
    pub fn is_newer_than(&self, other: u32) -> bool {
        let diff = self.sequence.wrapping_sub(other);
        diff != 0 && diff < (1 << 31)
    }
}

/// Outbound side of the transport collaborator.
///
/// The authority hands every snapshot it produces to a sink; delivery, loss and ordering
/// are the sink's business.
pub trait SnapshotSink {
    fn emit(&mut self, snapshot: Snapshot);
}

impl SnapshotSink for Vec<Snapshot> {
    fn emit(&mut self, snapshot: Snapshot) {
        self.push(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(sequence: u32) -> Snapshot {
        Snapshot::new(sequence, Transform::identity())
    }

    #[test]
    fn newer_sequence_compares_newer() {
        assert!(snap(5).is_newer_than(4));
        assert!(!snap(4).is_newer_than(5));
    }

    #[test]
    fn duplicate_sequence_is_not_newer() {
        assert!(!snap(9).is_newer_than(9));
    }

    #[test]
    fn sequence_comparison_survives_wrap_around() {
        assert!(snap(2).is_newer_than(u32::MAX - 1));
        assert!(!snap(u32::MAX - 1).is_newer_than(2));
    }

    #[test]
    fn vec_sink_collects_in_emit_order() {
        let mut sink: Vec<Snapshot> = Vec::new();
        sink.emit(snap(1));
        sink.emit(snap(2));

        let sequences: Vec<u32> = sink.iter().map(|s| s.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
    }
}
