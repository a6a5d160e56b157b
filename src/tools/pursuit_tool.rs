use crate::{
    config::{IntersectionSettings, RoadGeometrySettings},
    geometry::{
        edge_locator::RoadEdgeLocator, intersection::IntersectionLocator, road::Road,
        road_builder::RoadGeometryBuilder,
    },
    schedule::UpdateStage,
    spikes::{
        dispatcher::SpikeStripDispatcher,
        spike_strip::{PlacementSide, SpikeStripPlacement},
    },
    types::vehicle::PursuedVehicle,
    world::{demo_network::DemoRoadNetwork, query::SurfaceMaterial, raycast_world::RaycastWorld},
};
use bevy::prelude::*;
use bevy_mod_raycast::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuitRequest {
    /// Lay a strip in the target's lane, some distance ahead of it.
    PlaceAhead(PlacementSide),
    SurveyJunction,
}

/// How strips get laid for the pursued vehicle.
#[derive(Resource, Debug)]
pub struct PursuitTool {
    pub ahead_distance: f32,
    /// Placed strips stay as an outline until spawned by hand.
    pub preview: bool,
}

impl Default for PursuitTool {
    fn default() -> Self {
        Self {
            ahead_distance: 30.0,
            preview: false,
        }
    }
}

/// Roads reconstructed by the last placement or survey, kept around for drawing.
#[derive(Resource, Debug, Default)]
pub struct RoadSurvey {
    pub junction: Option<Vec3>,
    pub roads: Vec<Road>,
}

pub struct PursuitToolPlugin;

impl Plugin for PursuitToolPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PursuitTool>()
            .init_resource::<RoadSurvey>()
            .add_event::<PursuitRequest>()
            .add_systems(
                Update,
                (request_on_keypress, handle_pursuit_requests).chain().in_set(UpdateStage::UserInput),
            );
    }
}

fn request_on_keypress(keyboard: Res<ButtonInput<KeyCode>>, mut requests: EventWriter<PursuitRequest>) {
    if keyboard.just_pressed(KeyCode::Digit1) {
        requests.send(PursuitRequest::PlaceAhead(PlacementSide::Left));
    } else if keyboard.just_pressed(KeyCode::Digit2) {
        requests.send(PursuitRequest::PlaceAhead(PlacementSide::Middle));
    } else if keyboard.just_pressed(KeyCode::Digit3) {
        requests.send(PursuitRequest::PlaceAhead(PlacementSide::Right));
    } else if keyboard.just_pressed(KeyCode::KeyJ) {
        requests.send(PursuitRequest::SurveyJunction);
    }
}

fn handle_pursuit_requests(
    mut requests: EventReader<PursuitRequest>,
    mut raycast: Raycast,
    surfaces: Query<&'static SurfaceMaterial>,
    network: Res<DemoRoadNetwork>,
    geometry_settings: Res<RoadGeometrySettings>,
    intersection_settings: Res<IntersectionSettings>,
    target_query: Query<(Entity, &Transform), With<PursuedVehicle>>,
    tool: Res<PursuitTool>,
    mut survey: ResMut<RoadSurvey>,
    mut dispatcher: SpikeStripDispatcher,
) {
    if requests.is_empty() {
        return;
    }

    let Ok((target, transform)) = target_query.get_single() else {
        log::warn!("no pursued vehicle to act on");
        requests.clear();
        return;
    };

    let world = RaycastWorld::new(&mut raycast, &surfaces, &network);
    let edges = RoadEdgeLocator::new(&world, &geometry_settings);
    let builder = RoadGeometryBuilder::new(&edges).with_ground(&world);

    for request in requests.read() {
        match *request {
            PursuitRequest::PlaceAhead(side) => {
                let ahead = transform.translation + transform.forward() * tool.ahead_distance;

                let road = match builder.build_closest(&world, ahead) {
                    Ok(road) => road,
                    Err(err) => {
                        log::warn!("cannot lay a strip ahead of {:?}: {}", target, err);
                        continue;
                    }
                };

                let lane = road.closest_lane(ahead);
                let placement = match SpikeStripPlacement::new(road.clone(), lane, side) {
                    Ok(placement) => placement,
                    Err(err) => {
                        log::warn!("{}", err);
                        continue;
                    }
                };

                log::debug!(
                    "laying strip in lane {} of the road at {} ({} lanes)",
                    lane,
                    road.node().position,
                    road.lanes().len()
                );

                match dispatcher.place(&placement, Some(target)) {
                    Ok(strip) if tool.preview => dispatcher.set_preview(strip, true),
                    Ok(strip) => dispatcher.spawn(strip),
                    Err(err) => log::warn!("{}", err),
                }

                survey.junction = None;
                survey.roads = vec![road];
            }
            PursuitRequest::SurveyJunction => {
                let locator = IntersectionLocator::new(&world, &builder, &intersection_settings);
                let intersection = locator.discover(transform.translation.with_y(0.0));

                log::info!(
                    "surveyed {} roads around {} (heading {})",
                    intersection.roads.len(),
                    intersection.position,
                    intersection.heading
                );

                survey.junction = Some(intersection.position);
                survey.roads = intersection.roads;
            }
        }
    }
}
