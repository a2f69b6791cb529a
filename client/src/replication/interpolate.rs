use super::ReplicatedObserver;
use crate::types::apply_pose;
use bevy::prelude::*;
use shared::{ReplicatedEntity, Snapshot};

/// Blend every observer at the current frame time and show the result.
///
/// The rendered pose also drives the observer's kinematic body, so local physics queries see
/// the object where it is drawn.
pub(super) fn interpolate(
    time: Res<Time>,
    mut observer_q: Query<(&mut Transform, &mut ReplicatedObserver)>,
) {
    let now = time.elapsed_secs_f64();
    let mut no_sink: Vec<Snapshot> = Vec::new();
    for (mut transform, mut observer) in observer_q.iter_mut() {
        observer.0.tick(now, &mut no_sink);

        let rendered = observer.0.rendered_transform();
        apply_pose(&mut transform, &rendered);
        observer.0.body().drive_kinematic(&rendered);
    }
}
