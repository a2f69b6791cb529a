//! Replicated object lifecycle and the physics collaborator's write path.
//!
//! - `spawn_replicated_object`: creates the authoritative row and publishes its descriptor.
//! - `despawn_replicated_object`: removes the row, its descriptor and its last snapshot.
//! - `write_object_transform`: the simulation writes the live pose; the next snapshot tick
//!   samples it.
//! - `set_object_send_rate`: changes an object's send rate; observers follow via the descriptor.
//!
//! The role of each process is fixed: this module is always the authority, every subscribed
//! client is an observer.

use crate::{
    schema::*,
    types::{DbQuat, DbStalePolicy, DbUpdateType, DbVec3, validate_pose},
};
use shared::ReplicationConfig;
use spacetimedb::{ReducerContext, Table};

#[spacetimedb::reducer]
pub fn spawn_replicated_object(
    ctx: &ReducerContext,
    translation: DbVec3,
    rotation: DbQuat,
    update_type: DbUpdateType,
    sends_per_second: Option<u32>,
    stale_policy: DbStalePolicy,
) -> Result<(), String> {
    validate_pose(&translation, &rotation)?;

    let settings = ctx
        .db
        .replication_settings()
        .id()
        .find(ReplicationSettings::ID)
        .unwrap_or_default();
    let sends_per_second = sends_per_second.unwrap_or(settings.default_sends_per_second);

    // Authoring-time validation: a bad rate is rejected here, never at tick time.
    ReplicationConfig::default()
        .with_sends_per_second(sends_per_second)
        .validate()
        .map_err(|e| e.to_string())?;

    let object = ctx.db.replicated_object().insert(ReplicatedObject {
        id: 0,
        owner: ctx.sender,
        translation,
        rotation,
        simulated: false,
        update_type,
        sends_per_second,
        stale_policy,
        next_send_secs: None,
        next_sequence: 0,
    });

    ctx.db
        .replication_descriptor()
        .insert(ReplicationDescriptor::of(&object));

    log::info!(
        "Spawned replicated object {} ({:?}, {} sends/s, {:?}) for {:?}",
        object.id,
        update_type,
        sends_per_second,
        stale_policy,
        ctx.sender
    );
    Ok(())
}

#[spacetimedb::reducer]
pub fn despawn_replicated_object(ctx: &ReducerContext, object_id: u64) -> Result<(), String> {
    let Some(object) = ctx.db.replicated_object().id().find(object_id) else {
        return Err(format!("No replicated object {object_id}"));
    };
    ensure_writer(ctx, &object)?;

    ctx.db.replicated_object().id().delete(object_id);
    ctx.db.replication_descriptor().object_id().delete(object_id);
    ctx.db.transform_snapshot().object_id().delete(object_id);

    log::info!("Despawned replicated object {object_id}");
    Ok(())
}

#[spacetimedb::reducer]
pub fn write_object_transform(
    ctx: &ReducerContext,
    object_id: u64,
    translation: DbVec3,
    rotation: DbQuat,
) -> Result<(), String> {
    let Some(object) = ctx.db.replicated_object().id().find(object_id) else {
        return Err(format!("No replicated object {object_id}"));
    };
    ensure_writer(ctx, &object)?;
    validate_pose(&translation, &rotation)?;

    ctx.db.replicated_object().id().update(ReplicatedObject {
        translation,
        rotation,
        ..object
    });
    Ok(())
}

#[spacetimedb::reducer]
pub fn set_object_send_rate(
    ctx: &ReducerContext,
    object_id: u64,
    sends_per_second: u32,
) -> Result<(), String> {
    let Some(object) = ctx.db.replicated_object().id().find(object_id) else {
        return Err(format!("No replicated object {object_id}"));
    };
    ensure_writer(ctx, &object)?;

    ReplicationConfig::default()
        .with_sends_per_second(sends_per_second)
        .validate()
        .map_err(|e| e.to_string())?;

    // The persisted deadline stays; the new period applies from the next send on.
    let object = ctx.db.replicated_object().id().update(ReplicatedObject {
        sends_per_second,
        ..object
    });
    ctx.db
        .replication_descriptor()
        .object_id()
        .update(ReplicationDescriptor::of(&object));

    log::info!("Replicated object {object_id} now sends {sends_per_second} times per second");
    Ok(())
}

/// Only the owner (or the module itself) may change an object's ground truth.
fn ensure_writer(ctx: &ReducerContext, object: &ReplicatedObject) -> Result<(), String> {
    if ctx.sender == object.owner || ctx.sender == ctx.identity() {
        return Ok(());
    }
    log::warn!(
        "{:?} tried to modify replicated object {} owned by {:?}",
        ctx.sender,
        object.id,
        object.owner
    );
    Err("Only the owner may modify this replicated object".into())
}
