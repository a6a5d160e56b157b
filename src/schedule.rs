use bevy::prelude::*;

pub struct SchedulePlugin;

impl Plugin for SchedulePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                UpdateStage::UpdateView,
                UpdateStage::UserInput,
                UpdateStage::Spawning,
                UpdateStage::Simulate,
                UpdateStage::Animate,
                UpdateStage::Monitor,
                UpdateStage::DestroyEntities,
                UpdateStage::Visualize,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                (apply_deferred).after(UpdateStage::UserInput).before(UpdateStage::Spawning),
                (apply_deferred).after(UpdateStage::Spawning).before(UpdateStage::Simulate),
            ),
        );
    }
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, SystemSet)]
pub enum UpdateStage {
    UpdateView,
    UserInput,
    Spawning,
    Simulate,
    Animate,
    Monitor,
    DestroyEntities,
    Visualize,
}
