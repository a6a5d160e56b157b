pub mod camera;
pub mod models;
pub mod overlay;

use bevy::prelude::*;

pub struct GraphicsPlugin;

impl Plugin for GraphicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((camera::CameraPlugin, models::ModelPlugin, overlay::OverlayPlugin));
    }
}
