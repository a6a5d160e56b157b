use crate::{
    geometry::heading,
    schedule::UpdateStage,
    spikes::{
        spike_strip::{PlacementSide, SpikeStrip, SpikeStripProp},
        state::SpikeStripState,
    },
    types::vehicle::{GroundVehicle, PursuedVehicle, VEHICLE_HEIGHT, VEHICLE_LENGTH, VEHICLE_WIDTH},
};
use bevy::prelude::*;

const MIN_VISIBLE_EXTENSION: f32 = 0.05;

pub struct ModelPlugin;

impl Plugin for ModelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_models).add_systems(
            Update,
            (attach_vehicle_models, attach_prop_models, tint_vehicles, animate_props).in_set(UpdateStage::Visualize),
        );
    }
}

/// Shared handles for everything drawn from primitives.
#[derive(Resource)]
pub struct Models {
    pub vehicle_mesh: Handle<Mesh>,
    pub pursued_material: Handle<StandardMaterial>,
    pub traffic_material: Handle<StandardMaterial>,
    pub burst_material: Handle<StandardMaterial>,
    pub stowed_material: Handle<StandardMaterial>,
    pub moving_material: Handle<StandardMaterial>,
    pub deployed_material: Handle<StandardMaterial>,
    pub hit_material: Handle<StandardMaterial>,
    pub bypassed_material: Handle<StandardMaterial>,
    pub error_material: Handle<StandardMaterial>,
}

impl Models {
    fn strip_material(&self, state: SpikeStripState) -> Handle<StandardMaterial> {
        match state {
            SpikeStripState::Preparing | SpikeStripState::Undeployed | SpikeStripState::Disposed => {
                self.stowed_material.clone()
            }
            SpikeStripState::Deploying => self.moving_material.clone(),
            SpikeStripState::Deployed => self.deployed_material.clone(),
            SpikeStripState::Hit => self.hit_material.clone(),
            SpikeStripState::Bypassed => self.bypassed_material.clone(),
            SpikeStripState::Error => self.error_material.clone(),
        }
    }
}

fn load_models(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>, mut materials: ResMut<Assets<StandardMaterial>>) {
    commands.insert_resource(Models {
        vehicle_mesh: meshes.add(Cuboid::new(VEHICLE_WIDTH, VEHICLE_HEIGHT, VEHICLE_LENGTH)),
        pursued_material: materials.add(Color::srgb(0.1, 0.3, 0.9)),
        traffic_material: materials.add(Color::srgb(0.6, 0.6, 0.6)),
        burst_material: materials.add(Color::srgb(0.5, 0.1, 0.1)),
        stowed_material: materials.add(Color::srgb(0.3, 0.3, 0.3)),
        moving_material: materials.add(Color::srgb(0.9, 0.8, 0.1)),
        deployed_material: materials.add(Color::srgb(0.95, 0.5, 0.05)),
        hit_material: materials.add(Color::srgb(0.1, 0.8, 0.2)),
        bypassed_material: materials.add(Color::srgb(0.6, 0.2, 0.8)),
        error_material: materials.add(Color::srgb(1.0, 0.0, 0.0)),
    });
}

fn attach_vehicle_models(
    mut commands: Commands,
    query: Query<(Entity, Has<PursuedVehicle>), Added<GroundVehicle>>,
    models: Res<Models>,
) {
    for (entity, pursued) in &query {
        let material = if pursued {
            models.pursued_material.clone()
        } else {
            models.traffic_material.clone()
        };
        commands.entity(entity).insert((models.vehicle_mesh.clone(), material));
    }
}

fn attach_prop_models(
    mut commands: Commands,
    query: Query<(Entity, &SpikeStripProp), Added<SpikeStripProp>>,
    mut meshes: ResMut<Assets<Mesh>>,
    models: Res<Models>,
) {
    for (entity, prop) in &query {
        log::debug!("drawing {} as a {} box", prop.model, prop.dimensions);
        commands
            .entity(entity)
            .insert((meshes.add(Cuboid::from_size(prop.dimensions)), models.stowed_material.clone()));
    }
}

fn tint_vehicles(
    mut query: Query<(&GroundVehicle, Has<PursuedVehicle>, &mut Handle<StandardMaterial>), Changed<GroundVehicle>>,
    models: Res<Models>,
) {
    for (vehicle, pursued, mut material) in &mut query {
        *material = match (vehicle.burst_count() > 0, pursued) {
            (true, _) => models.burst_material.clone(),
            (false, true) => models.pursued_material.clone(),
            (false, false) => models.traffic_material.clone(),
        };
    }
}

/// Rolls props out from the side they are laid from and colors them by state.
fn animate_props(
    mut prop_query: Query<(&SpikeStripProp, &mut Transform, &mut Handle<StandardMaterial>)>,
    strip_query: Query<&SpikeStrip>,
    models: Res<Models>,
) {
    for (prop, mut transform, mut material) in &mut prop_query {
        let Ok(strip) = strip_query.get(prop.strip) else {
            continue;
        };

        let extension = strip.extension().max(MIN_VISIBLE_EXTENSION);
        let retracted = match strip.side() {
            PlacementSide::Middle => 0.0,
            PlacementSide::Left | PlacementSide::Right => prop.dimensions.z * (1.0 - extension) / 2.0,
        };

        transform.translation = strip.position() - heading::direction(strip.heading()) * retracted;
        transform.scale = Vec3::new(1.0, 1.0, extension);

        let wanted = models.strip_material(strip.state());
        if *material != wanted {
            *material = wanted;
        }
    }
}
