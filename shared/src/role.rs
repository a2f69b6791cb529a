//! Authority and observer variants of a replicated object.
//!
//! The role is picked once, when the object is spawned, and never changes. Each variant owns
//! its physics body and exposes the same per-frame [`ReplicatedEntity::tick`], so hosts drive
//! every replicated object the same way without branching on role.

use crate::{
    ReplicationError, Seconds,
    body::PhysicsBody,
    config::{self, ReplicationConfig, StaleSnapshotPolicy, UpdateType},
    interpolation::InterpolationState,
    reconcile::reconcile,
    scheduler::SendScheduler,
    snapshot::{Snapshot, SnapshotSink},
    transform::Transform,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Owns the ground-truth transform and emits snapshots (server).
    Authority,
    /// Renders a transform derived from received snapshots (client).
    Observer,
}

/// Per-frame capability shared by both roles.
pub trait ReplicatedEntity {
    fn role(&self) -> Role;

    /// Bind the body and fix its simulation mode. Guarded: only the first call has effect.
    fn setup(&mut self);

    fn is_set_up(&self) -> bool;

    /// Advance one host frame. Authorities may emit into `sink`; observers never do.
    fn tick(&mut self, now: Seconds, sink: &mut dyn SnapshotSink);

    /// Pose this instance shows: ground truth on the authority, the blend on observers.
    fn rendered_transform(&self) -> Transform;
}

/// Build the role variant for a freshly spawned object.
pub fn spawn<B>(
    role: Role,
    config: &ReplicationConfig,
    body: B,
) -> Result<Box<dyn ReplicatedEntity + Send + Sync>, ReplicationError>
where
    B: PhysicsBody + Send + Sync + 'static,
{
    Ok(match role {
        Role::Authority => Box::new(AuthorityRole::new(config, body)?),
        Role::Observer => Box::new(ObserverRole::new(config, body)?),
    })
}

// ---------------------------------------------------------------------------
// Authority
// ---------------------------------------------------------------------------

/// Server side: samples the simulated body at a fixed cadence.
///
/// The authority never interpolates; it renders its own ground truth.
pub struct AuthorityRole<B> {
    body: B,
    scheduler: SendScheduler,
    next_sequence: u32,
    snapshots_sent: u64,
    set_up: bool,
}

impl<B: PhysicsBody> AuthorityRole<B> {
    pub fn new(config: &ReplicationConfig, body: B) -> Result<Self, ReplicationError> {
        config.validate()?;
        Ok(Self {
            body,
            scheduler: SendScheduler::new(config.sends_per_second)?,
            next_sequence: 0,
            snapshots_sent: 0,
            set_up: false,
        })
    }

    /// Rebuild an authority whose scheduling state was persisted between host ticks.
    pub fn resume(
        config: &ReplicationConfig,
        body: B,
        next_send: Option<Seconds>,
        next_sequence: u32,
    ) -> Result<Self, ReplicationError> {
        let mut authority = Self::new(config, body)?;
        authority.scheduler = SendScheduler::resume(config.sends_per_second, next_send)?;
        authority.next_sequence = next_sequence;
        Ok(authority)
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn scheduler(&self) -> &SendScheduler {
        &self.scheduler
    }

    /// Sequence number the next snapshot will carry.
    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    pub fn snapshots_sent(&self) -> u64 {
        self.snapshots_sent
    }

    fn capture(&mut self) -> Snapshot {
        let snapshot = Snapshot::new(self.next_sequence, self.body.transform());
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.snapshots_sent += 1;
        snapshot
    }
}

impl<B: PhysicsBody> ReplicatedEntity for AuthorityRole<B> {
    fn role(&self) -> Role {
        Role::Authority
    }

    fn setup(&mut self) {
        if self.set_up {
            return;
        }
        self.body.set_simulated(true);
        self.set_up = true;
        log::debug!("authority set up, body is simulated");
    }

    fn is_set_up(&self) -> bool {
        self.set_up
    }

    fn tick(&mut self, now: Seconds, sink: &mut dyn SnapshotSink) {
        self.setup();

        if !self.scheduler.poll(now) {
            return;
        }

        let snapshot = self.capture();
        log::trace!("authority emits snapshot #{} at {now:.4}s", snapshot.sequence);
        sink.emit(snapshot);
    }

    fn rendered_transform(&self) -> Transform {
        self.body.transform()
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Running counters of an observer, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObserverStats {
    pub received: u64,
    pub discarded: u64,
}

/// Client side: blends between authoritative targets every frame.
///
/// The body is switched out of simulation on setup; its pose is then driven solely by
/// [`ObserverRole::rendered_transform`], which the host writes back each frame.
pub struct ObserverRole<B> {
    body: B,
    update_type: UpdateType,
    sends_per_second: u32,
    stale_policy: StaleSnapshotPolicy,
    state: InterpolationState,
    rendered: Transform,
    last_sequence: Option<u32>,
    stats: ObserverStats,
    set_up: bool,
}

impl<B: PhysicsBody> ObserverRole<B> {
    pub fn new(config: &ReplicationConfig, body: B) -> Result<Self, ReplicationError> {
        config.validate()?;
        let rendered = body.transform();
        Ok(Self {
            body,
            update_type: config.update_type,
            sends_per_second: config.sends_per_second,
            stale_policy: config.stale_policy,
            state: InterpolationState::at_rest(rendered),
            rendered,
            last_sequence: None,
            stats: ObserverStats::default(),
            set_up: false,
        })
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn update_type(&self) -> UpdateType {
        self.update_type
    }

    pub fn sends_per_second(&self) -> u32 {
        self.sends_per_second
    }

    pub fn stale_policy(&self) -> StaleSnapshotPolicy {
        self.stale_policy
    }

    pub fn state(&self) -> &InterpolationState {
        &self.state
    }

    pub fn stats(&self) -> ObserverStats {
        self.stats
    }

    /// Blend progress at `now`.
    pub fn fraction(&self, now: Seconds) -> f32 {
        self.state.fraction(now, self.sends_per_second)
    }

    /// Change the nominal send rate the blend is timed against.
    pub fn set_sends_per_second(&mut self, sends_per_second: u32) -> Result<(), ReplicationError> {
        config::validate_send_rate(sends_per_second)?;
        self.sends_per_second = sends_per_second;
        Ok(())
    }

    /// Forget the binding so the next tick or snapshot runs setup again.
    ///
    /// Setup reseeds the interpolation state from the body's pose at that moment.
    pub fn reset(&mut self) {
        self.set_up = false;
        self.last_sequence = None;
    }

    /// Transport callback: apply one snapshot received at `now`.
    ///
    /// An observer that has not been set up yet is set up first; the snapshot is never
    /// dropped for that reason. Returns `false` when the stale policy discarded it.
    pub fn on_snapshot_received(&mut self, snapshot: Snapshot, now: Seconds) -> bool {
        self.setup();
        self.stats.received += 1;

        if self.is_stale(&snapshot) {
            self.stats.discarded += 1;
            log::warn!(
                "discarding stale snapshot #{} (last applied #{:?})",
                snapshot.sequence,
                self.last_sequence
            );
            return false;
        }
        self.last_sequence = Some(snapshot.sequence);

        // Freeze the in-flight blend where it is right now before retargeting.
        self.rendered = self.state.sample(now, self.sends_per_second);
        reconcile(
            &mut self.state,
            self.update_type,
            self.rendered,
            &snapshot,
            now,
        );
        self.rendered = self.state.sample(now, self.sends_per_second);

        log::trace!(
            "observer applied snapshot #{} at {now:.4}s ({:?})",
            snapshot.sequence,
            self.update_type
        );
        true
    }

    fn is_stale(&self, snapshot: &Snapshot) -> bool {
        match (self.stale_policy, self.last_sequence) {
            (StaleSnapshotPolicy::Discard, Some(last)) => !snapshot.is_newer_than(last),
            _ => false,
        }
    }
}

impl<B: PhysicsBody> ReplicatedEntity for ObserverRole<B> {
    fn role(&self) -> Role {
        Role::Observer
    }

    fn setup(&mut self) {
        if self.set_up {
            return;
        }
        self.body.set_simulated(false);
        self.rendered = self.body.transform();
        self.state = InterpolationState::at_rest(self.rendered);
        self.set_up = true;
        log::debug!("observer set up ({:?}), body is kinematic", self.update_type);
    }

    fn is_set_up(&self) -> bool {
        self.set_up
    }

    fn tick(&mut self, now: Seconds, _sink: &mut dyn SnapshotSink) {
        self.setup();
        self.rendered = self.state.sample(now, self.sends_per_second);
    }

    fn rendered_transform(&self) -> Transform {
        self.rendered
    }
}
