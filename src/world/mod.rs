pub mod demo_network;
pub mod query;
pub mod raycast_world;
pub mod scene;

use bevy::prelude::*;
use demo_network::DemoRoadNetwork;

pub struct DemoWorldPlugin;

impl Plugin for DemoWorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DemoRoadNetwork>()
            .add_systems(Startup, (scene::spawn_ground, scene::spawn_roads, scene::spawn_vehicles));
    }
}
