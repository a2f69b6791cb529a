use crate::{
    Seconds, config::UpdateType, interpolation::InterpolationState, snapshot::Snapshot,
    transform::Transform,
};

/// Turn an arriving snapshot into the next blend.
///
/// - `Override`: blend from `rendered`, the pose the observer shows right now.
/// - `Addition`: blend from the previous goal, regardless of where rendering got to.
///
/// In both cases the new goal is the snapshot's pose and the blend clock restarts at `now`.
pub fn reconcile(
    state: &mut InterpolationState,
    update_type: UpdateType,
    rendered: Transform,
    snapshot: &Snapshot,
    now: Seconds,
) {
    let start = match update_type {
        UpdateType::Override => rendered,
        UpdateType::Addition => state.goal,
    };

    state.retarget(start, snapshot.transform, now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn at(x: f32) -> Transform {
        Transform::from_position(Vector3::new(x, 0.0, 0.0))
    }

    #[test]
    fn override_starts_from_rendered_pose() {
        let mut state = InterpolationState::at_rest(at(0.0));
        state.retarget(at(0.0), at(1.0), 0.0);

        reconcile(&mut state, UpdateType::Override, at(0.4), &Snapshot::new(2, at(2.0)), 0.5);

        assert_eq!(state.start, at(0.4));
        assert_eq!(state.goal, at(2.0));
        assert_eq!(state.last_arrival, Some(0.5));
    }

    #[test]
    fn addition_starts_from_previous_goal() {
        let mut state = InterpolationState::at_rest(at(0.0));
        state.retarget(at(0.0), at(1.0), 0.0);

        reconcile(&mut state, UpdateType::Addition, at(0.4), &Snapshot::new(2, at(2.0)), 0.5);

        assert_eq!(state.start, at(1.0));
        assert_eq!(state.goal, at(2.0));
        assert_eq!(state.last_arrival, Some(0.5));
    }
}
