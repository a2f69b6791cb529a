//! Scheduled authority sampling.
//!
//! One timer row drives `snapshot_tick_reducer` at `ReplicationSettings::tick_interval_micros`.
//! Each invocation rebuilds an `AuthorityRole` per object from its persisted scheduling state,
//! ticks it once, publishes whatever it emitted into `transform_snapshot`, and writes the
//! advanced state back. The per-object scheduler decides whether a snapshot is due, so objects
//! with different send rates share the same timer.
//!
//! Scheduler time is measured in seconds since the timer's `epoch`, which is fixed when the
//! timer is created.

use crate::{
    row_body::RowBody,
    schema::*,
    types::from_transform,
    utils::{interval_seconds, seconds_since},
};
use shared::{AuthorityRole, PhysicsBody, ReplicatedEntity, Snapshot};
use spacetimedb::{ReducerContext, ScheduleAt, Table, TimeDuration, Timestamp};

#[spacetimedb::table(name = snapshot_tick_timer, scheduled(snapshot_tick_reducer))]
pub struct SnapshotTickTimer {
    #[primary_key]
    #[auto_inc]
    pub scheduled_id: u64,
    pub scheduled_at: ScheduleAt,
    pub epoch: Timestamp,
}

pub fn init(ctx: &ReducerContext, settings: &ReplicationSettings) {
    let interval = TimeDuration::from_micros(settings.tick_interval_micros.max(1));
    ctx.db.snapshot_tick_timer().scheduled_id().delete(1);
    ctx.db.snapshot_tick_timer().insert(SnapshotTickTimer {
        scheduled_id: 1,
        scheduled_at: ScheduleAt::Interval(interval),
        epoch: ctx.timestamp,
    });
}

#[spacetimedb::reducer]
fn snapshot_tick_reducer(ctx: &ReducerContext, timer: SnapshotTickTimer) -> Result<(), String> {
    // Only the server (module identity) may invoke scheduled reducers.
    if ctx.sender != ctx.identity() {
        return Err("`snapshot_tick_reducer` may not be invoked by clients.".into());
    }

    let Some(now) = seconds_since(ctx.timestamp, timer.epoch) else {
        return Err("`snapshot_tick_reducer` ran before its epoch.".into());
    };
    let tick_interval = interval_seconds(timer.scheduled_at);

    for object in ctx.db.replicated_object().iter() {
        let config = object.replication_config();
        let mut authority = match AuthorityRole::resume(
            &config,
            RowBody::from(&object),
            object.next_send_secs,
            object.next_sequence,
        ) {
            Ok(authority) => authority,
            Err(e) => {
                log::warn!("Skipping replicated object {}: {e}", object.id);
                continue;
            }
        };

        if tick_interval.is_some_and(|dt| dt > authority.scheduler().period()) {
            log::debug!(
                "Object {} wants {} sends/s but the snapshot tick is slower",
                object.id,
                object.sends_per_second
            );
        }

        let mut emitted: Vec<Snapshot> = Vec::new();
        authority.tick(now, &mut emitted);
        for snapshot in emitted {
            publish(ctx, object.id, &snapshot);
        }

        let next_send_secs = authority.scheduler().next_send();
        let next_sequence = authority.next_sequence();
        let simulated = authority.body().is_simulated();
        if next_send_secs != object.next_send_secs
            || next_sequence != object.next_sequence
            || simulated != object.simulated
        {
            ctx.db.replicated_object().id().update(ReplicatedObject {
                next_send_secs,
                next_sequence,
                simulated,
                ..object
            });
        }
    }

    Ok(())
}

/// Upsert the object's snapshot row; subscribers see it as one received snapshot.
fn publish(ctx: &ReducerContext, object_id: u64, snapshot: &Snapshot) {
    let (translation, rotation) = from_transform(&snapshot.transform);
    let row = TransformSnapshot {
        object_id,
        sequence: snapshot.sequence,
        translation,
        rotation,
    };

    if ctx.db.transform_snapshot().object_id().find(object_id).is_some() {
        ctx.db.transform_snapshot().object_id().update(row);
    } else {
        ctx.db.transform_snapshot().insert(row);
    }
}
