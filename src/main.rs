mod config;
mod geometry;
mod graphics;
mod schedule;
mod spikes;
mod tools;
mod types;
mod ui;
mod world;

use bevy::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(config::SettingsPlugin::default())
        .add_plugins(schedule::SchedulePlugin)
        .add_plugins(world::DemoWorldPlugin)
        .add_plugins(types::vehicle::VehiclePlugin)
        .add_plugins(spikes::SpikeStripPlugin)
        .add_plugins(tools::pursuit_tool::PursuitToolPlugin)
        .add_plugins(graphics::GraphicsPlugin)
        .add_plugins(ui::egui::UiPlugin)
        .run();
}
