use crate::geometry::road_node::RoadNode;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Surface type reported by a downward ground probe.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceMaterial {
    Asphalt,
    Concrete,
    Gravel,
    Grass,
    Dirt,
}

/// Result of a nearest-road lookup: two sub-positions on the road and the lane count travelling
/// away from each of them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestRoad {
    pub point_a: Vec3,
    pub point_b: Vec3,
    pub lanes_a: u32,
    pub lanes_b: u32,
}

impl NearestRoad {
    /// `(same, opposite)` lane counts for a node, taking the sub-position nearest to it as its
    /// own direction.
    pub fn lanes_for(&self, position: Vec3) -> (u32, u32) {
        if position.distance_squared(self.point_a) <= position.distance_squared(self.point_b) {
            (self.lanes_a, self.lanes_b)
        } else {
            (self.lanes_b, self.lanes_a)
        }
    }
}

/// What road reconstruction needs to know about the world.
pub trait WorldQuery {
    /// Material of the ground directly below `position`, from a short downward cast.
    fn ground_material(&self, position: Vec3) -> Option<SurfaceMaterial>;

    /// The road edge reached from `position` when heading along `heading`, if the world knows it.
    fn road_boundary(&self, position: Vec3, heading: f32) -> Option<Vec3>;

    fn is_point_on_road(&self, position: Vec3) -> bool;

    fn closest_node(&self, position: Vec3) -> Option<RoadNode>;

    fn nearest_road(&self, position: Vec3) -> Option<NearestRoad>;

    fn ground_height(&self, position: Vec3) -> Option<f32>;
}
