//! Bevy client for replicated physics objects.
//!
//! [`replication`] is the observer side and knows nothing about transports. [`loopback`] runs an
//! authority in the same process and feeds the observers through a simulated link. With the
//! `stdb` feature, `server` also observes the objects published by the SpacetimeDB module.

#[cfg(feature = "dev_native")]
mod debug_tools;

mod camera;
mod input;
pub mod loopback;
#[cfg(feature = "stdb")]
mod module_bindings;
pub mod physics;
pub mod replication;
#[cfg(feature = "stdb")]
mod server;
pub mod types;
mod world;

pub use replication::{
    ObjectDescribed, ObjectRetired, ReplicatedEntityMapping, ReplicatedObserver,
    ReplicationSystems, SendRateChanged, SnapshotReceived,
};

use bevy::prelude::*;

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: "Replicated Transforms".to_string(),
                fit_canvas_to_parent: true,
                ..default()
            }
            .into(),
            ..default()
        }));

        app.add_plugins((
            world::plugin,
            camera::plugin,
            input::plugin,
            physics::plugin,
            replication::plugin,
            loopback::plugin,
        ));

        #[cfg(feature = "stdb")]
        app.add_plugins(server::plugin);

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}
