use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DemoAction {
    /// Knock the authority bodies around so there is motion to replicate.
    Kick,
    ToggleDrops,
    /// Hold back every few snapshots so they arrive out of order.
    ToggleReorder,
    CycleLatency,
    ResetObservers,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<DemoAction>::default());

    app.register_type::<DemoAction>();

    let mut input_map = InputMap::<DemoAction>::default();
    input_map
        .insert(DemoAction::Kick, KeyCode::Space)
        .insert(DemoAction::ToggleDrops, KeyCode::KeyD)
        .insert(DemoAction::ToggleReorder, KeyCode::KeyO)
        .insert(DemoAction::CycleLatency, KeyCode::KeyL)
        .insert(DemoAction::ResetObservers, KeyCode::KeyR);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<DemoAction>::default());
}
