//! Transform replication and interpolation core.
//!
//! One process owns a physically simulated object (the authority) and samples its pose at a
//! fixed rate; every other process (observers) receives those snapshots and renders a smooth
//! blend between them. This crate holds everything both sides share:
//!
//! - [`scheduler`]: fixed-cadence send gate used by the authority.
//! - [`interpolation`]: blend fraction and the observer's interpolation state.
//! - [`reconcile`]: `Override` / `Addition` policies for new targets.
//! - [`role`]: `AuthorityRole` and `ObserverRole` behind one `ReplicatedEntity` interface.
//! - [`body`] / [`rapier_body`]: the physics collaborator and its Rapier adapter.
//!
//! Transport is out of scope: authorities emit into a [`SnapshotSink`], observers are fed
//! through [`ObserverRole::on_snapshot_received`]. Time is always passed in as `now`.

pub mod body;
pub mod config;
pub mod constants;
pub mod error;
pub mod interpolation;
pub mod rapier_body;
pub mod reconcile;
pub mod role;
pub mod scheduler;
pub mod snapshot;
pub mod transform;

pub use body::{PhysicsBody, resolve_body};
pub use config::{ReplicationConfig, StaleSnapshotPolicy, UpdateType};
pub use constants::{DEFAULT_SENDS_PER_SECOND, SLERP_EPSILON, Seconds};
pub use error::ReplicationError;
pub use interpolation::{InterpolationState, blend_fraction};
pub use rapier_body::{RapierBody, SharedBodySet, shared_body_set};
pub use role::{AuthorityRole, ObserverRole, ObserverStats, ReplicatedEntity, Role, spawn};
pub use scheduler::SendScheduler;
pub use snapshot::{Snapshot, SnapshotSink};
pub use transform::Transform;

// Re-export so hosts can build bodies without depending on `rapier3d` directly.
pub use rapier3d;
