//! Authority host for replicated physics objects.
//!
//! The module owns the ground-truth pose of every replicated object and samples it into the
//! public `transform_snapshot` table at each object's send rate. Clients subscribe to that
//! table and run the observer side of `shared`.

mod reducers {
    pub mod objects;
    pub(crate) mod snapshot_tick;
}
mod row_body;
pub mod schema;
pub mod types;
mod utils;

use crate::schema::*;
use spacetimedb::*;

#[reducer(init)]
pub fn init(ctx: &ReducerContext) {
    let settings = ReplicationSettings::default();
    ctx.db.replication_settings().id().delete(ReplicationSettings::ID);
    let settings = ctx.db.replication_settings().insert(settings);

    reducers::snapshot_tick::init(ctx, &settings);
    log::info!(
        "Replication module initialised: {} sends/s default, tick every {}us",
        settings.default_sends_per_second,
        settings.tick_interval_micros
    );
}
