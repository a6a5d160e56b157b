use crate::{
    geometry::road_node::RoadNode,
    world::{
        demo_network::DemoRoadNetwork,
        query::{NearestRoad, SurfaceMaterial, WorldQuery},
    },
};
use bevy::prelude::*;
use bevy_mod_raycast::prelude::*;
use std::cell::RefCell;

const PROBE_HEIGHT: f32 = 10.0;

/// Probes the rendered scene for ground material and height, and leaves the rest to the road
/// network.
pub struct RaycastWorld<'a, 'w, 's> {
    raycast: RefCell<&'a mut Raycast<'w, 's>>,
    surfaces: &'a Query<'a, 'a, &'static SurfaceMaterial>,
    network: &'a DemoRoadNetwork,
}

impl<'a, 'w, 's> RaycastWorld<'a, 'w, 's> {
    pub fn new(
        raycast: &'a mut Raycast<'w, 's>,
        surfaces: &'a Query<'a, 'a, &'static SurfaceMaterial>,
        network: &'a DemoRoadNetwork,
    ) -> Self {
        Self {
            raycast: RefCell::new(raycast),
            surfaces,
            network,
        }
    }

    /// First surface straight below `position`.
    fn probe(&self, position: Vec3) -> Option<(SurfaceMaterial, Vec3)> {
        let ray = Ray3d {
            origin: position.with_y(position.y + PROBE_HEIGHT),
            direction: Dir3::NEG_Y,
        };
        let filter = |entity: Entity| self.surfaces.contains(entity);
        let settings = RaycastSettings::default()
            .with_filter(&filter)
            .with_visibility(RaycastVisibility::Ignore)
            .always_early_exit();

        let mut raycast = self.raycast.borrow_mut();
        let (entity, hit) = raycast.cast_ray(ray, &settings).first()?;
        let material = self.surfaces.get(*entity).ok()?;

        Some((*material, hit.position()))
    }
}

impl WorldQuery for RaycastWorld<'_, '_, '_> {
    fn ground_material(&self, position: Vec3) -> Option<SurfaceMaterial> {
        self.probe(position).map(|(material, _)| material)
    }

    fn road_boundary(&self, position: Vec3, heading: f32) -> Option<Vec3> {
        self.network.road_boundary(position, heading)
    }

    fn is_point_on_road(&self, position: Vec3) -> bool {
        matches!(
            self.ground_material(position),
            Some(SurfaceMaterial::Asphalt | SurfaceMaterial::Concrete)
        )
    }

    fn closest_node(&self, position: Vec3) -> Option<RoadNode> {
        self.network.closest_node(position)
    }

    fn nearest_road(&self, position: Vec3) -> Option<NearestRoad> {
        self.network.nearest_road(position)
    }

    fn ground_height(&self, position: Vec3) -> Option<f32> {
        self.probe(position).map(|(_, point)| point.y)
    }
}
