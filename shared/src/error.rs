use thiserror::Error;

/// Configuration errors raised while authoring or setting up a replicated object.
///
/// Transport loss, duplication and reordering are not errors at this layer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationError {
    /// `sends_per_second` must be strictly positive.
    #[error("sends_per_second must be greater than zero (got {0})")]
    InvalidSendRate(u32),

    /// No physics body was supplied and none could be resolved from the owning entity.
    #[error("no physics body supplied and none found on the owning entity")]
    MissingBody,
}
