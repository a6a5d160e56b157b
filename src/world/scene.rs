use crate::{
    config::RoadGeometrySettings,
    geometry::{edge_locator::RoadEdgeLocator, heading, road_builder::RoadGeometryBuilder},
    types::vehicle::{DriveBounds, Driver, GroundVehicle, PursuedVehicle, VEHICLE_HEIGHT},
    world::{
        demo_network::{DemoRoadNetwork, ROAD_HEIGHT},
        query::SurfaceMaterial,
    },
};
use bevy::{pbr::CascadeShadowConfigBuilder, prelude::*};
use rand::{seq::SliceRandom, Rng};

const GROUND_SIZE: f32 = 160.0;
const PURSUIT_START: Vec3 = Vec3::new(2.0, 0.0, 45.0);
const PURSUIT_SPEED: f32 = 12.0;

pub fn spawn_ground(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>, mut materials: ResMut<Assets<StandardMaterial>>) {
    commands.spawn((
        PbrBundle {
            mesh: meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE)),
            material: materials.add(Color::srgb(0.2, 0.4, 0.2)),
            ..default()
        },
        SurfaceMaterial::Grass,
        Name::new("Ground"),
    ));

    commands.spawn(DirectionalLightBundle {
        transform: Transform::from_xyz(0.3, 1.0, 0.6).looking_at(Vec3::ZERO, Vec3::Y),
        directional_light: DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        cascade_shadow_config: CascadeShadowConfigBuilder {
            num_cascades: 3,
            maximum_distance: 120.0,
            ..default()
        }
        .into(),
        ..default()
    });

    commands.insert_resource(DriveBounds(GROUND_SIZE / 2.0 - 20.0));
}

pub fn spawn_roads(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    network: Res<DemoRoadNetwork>,
) {
    let asphalt = materials.add(Color::linear_rgb(0.02, 0.02, 0.02));

    for road in &network.roads {
        commands.spawn((
            PbrBundle {
                mesh: meshes.add(Cuboid::new(road.width(), ROAD_HEIGHT, road.length())),
                material: asphalt.clone(),
                transform: Transform::from_translation(road.midpoint().with_y(ROAD_HEIGHT / 2.0))
                    .with_rotation(heading::rotation(road.heading())),
                ..default()
            },
            SurfaceMaterial::Asphalt,
            Name::new("Road"),
        ));
    }
}

fn vehicle(position: Vec3, heading: f32, speed: f32) -> (SpatialBundle, Driver, GroundVehicle) {
    let transform = Transform::from_translation(position.with_y(position.y + VEHICLE_HEIGHT / 2.0))
        .with_rotation(heading::rotation(heading));
    (
        SpatialBundle::from_transform(transform),
        Driver::new(heading, speed),
        GroundVehicle::car(),
    )
}

/// Puts the pursued car and some traffic into lanes reconstructed from the network.
pub fn spawn_vehicles(mut commands: Commands, network: Res<DemoRoadNetwork>, settings: Res<RoadGeometrySettings>) {
    let edges = RoadEdgeLocator::new(network.as_ref(), &settings);
    let builder = RoadGeometryBuilder::new(&edges).with_ground(network.as_ref());
    let mut rng = rand::thread_rng();

    match builder.build_closest(network.as_ref(), PURSUIT_START) {
        Ok(road) => {
            let lane = &road.lanes()[road.closest_lane(PURSUIT_START)];
            commands.spawn((
                vehicle(lane.center(), lane.heading(), PURSUIT_SPEED),
                PursuedVehicle,
                Name::new("Pursued vehicle"),
            ));
        }
        Err(err) => log::error!("no road for the pursued vehicle: {}", err),
    }

    for demo_road in &network.roads {
        for _ in 0..demo_road.traffic {
            let along = rng.gen_range(-0.4..0.4) * demo_road.length();
            let position = demo_road.midpoint() + heading::direction(demo_road.heading()) * along;

            let road = match builder.build_closest(network.as_ref(), position) {
                Ok(road) => road,
                Err(err) => {
                    log::warn!("skipping traffic at {}: {}", position, err);
                    continue;
                }
            };

            if let Some(lane) = road.lanes().choose(&mut rng) {
                commands.spawn((
                    vehicle(lane.center(), lane.heading(), rng.gen_range(6.0..14.0)),
                    Name::new("Traffic"),
                ));
            }
        }
    }
}
