//! The physics collaborator, seen from the replication core.
//!
//! The core never talks to a physics engine directly. It reads the body's current pose and
//! flips it between simulated (driven by physics, authoritative) and not simulated (driven
//! purely by interpolation). Engines plug in by implementing [`PhysicsBody`]; see
//! [`crate::rapier_body::RapierBody`] for the Rapier adapter.

use crate::{ReplicationError, transform::Transform};

pub trait PhysicsBody {
    /// Current world pose of the body.
    fn transform(&self) -> Transform;

    /// `true` lets physics integrate the body; `false` makes it follow externally written poses.
    fn set_simulated(&mut self, simulated: bool);

    fn is_simulated(&self) -> bool;
}

/// Authoring-time body resolution.
///
/// Uses `supplied` when present, otherwise asks the owning entity via `find`. A replicated
/// object without a body is a configuration error, reported here rather than at tick time.
pub fn resolve_body<B, F>(supplied: Option<B>, find: F) -> Result<B, ReplicationError>
where
    F: FnOnce() -> Option<B>,
{
    if let Some(body) = supplied {
        return Ok(body);
    }

    find().ok_or_else(|| {
        log::warn!("replicated object has no physics body to bind");
        ReplicationError::MissingBody
    })
}

#[cfg(test)]
pub(crate) mod test_body {
    use super::*;

    /// In-memory body double. Counts mode changes so setup idempotence can be observed.
    #[derive(Clone, Debug, Default)]
    pub struct TestBody {
        pub transform: Transform,
        pub simulated: bool,
        pub mode_writes: u32,
    }

    impl TestBody {
        pub fn at(transform: Transform) -> Self {
            Self {
                transform,
                simulated: true,
                mode_writes: 0,
            }
        }
    }

    impl PhysicsBody for TestBody {
        fn transform(&self) -> Transform {
            self.transform
        }

        fn set_simulated(&mut self, simulated: bool) {
            self.simulated = simulated;
            self.mode_writes += 1;
        }

        fn is_simulated(&self) -> bool {
            self.simulated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_body::TestBody;
    use super::*;

    #[test]
    fn supplied_body_wins_over_lookup() {
        let supplied = TestBody::default();
        let body = resolve_body(Some(supplied), || -> Option<TestBody> {
            panic!("lookup must not run when a body is supplied")
        });

        assert!(body.is_ok());
    }

    #[test]
    fn missing_body_is_resolved_from_owner() {
        let body = resolve_body(None, || Some(TestBody::default()));

        assert!(body.is_ok());
    }

    #[test]
    fn no_body_anywhere_is_a_configuration_error() {
        let body = resolve_body::<TestBody, _>(None, || None);

        assert_eq!(body.err(), Some(ReplicationError::MissingBody));
    }
}
