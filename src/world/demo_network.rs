use crate::{
    geometry::{heading, road_node::RoadNode},
    world::query::{NearestRoad, SurfaceMaterial, WorldQuery},
};
use bevy::prelude::*;

pub const ROAD_HEIGHT: f32 = 0.05;
const NODE_SEARCH_RADIUS: f32 = 40.0;
const NEAREST_ROAD_SPACING: f32 = 5.0;

/// A straight stretch of road in the demo world. Same-direction lanes run from `start` to `end`
/// on the right-hand side.
#[derive(Clone, Debug, PartialEq)]
pub struct DemoRoad {
    pub start: Vec3,
    pub end: Vec3,
    pub lanes_same: u32,
    pub lanes_opposite: u32,
    pub lane_width: f32,
    /// Whether the road's edges can be answered without probing the ground.
    pub mapped_boundary: bool,
    /// Number of traffic vehicles the scene puts on this road.
    pub traffic: u8,
}

impl DemoRoad {
    pub fn heading(&self) -> f32 {
        heading::from_direction(self.end - self.start)
    }

    pub fn width(&self) -> f32 {
        (self.lanes_same + self.lanes_opposite) as f32 * self.lane_width
    }

    pub fn length(&self) -> f32 {
        self.start.with_y(0.0).distance(self.end.with_y(0.0))
    }

    pub fn midpoint(&self) -> Vec3 {
        (self.start + self.end) / 2.0
    }

    /// Distance along the center line and signed distance to the right of it.
    fn project(&self, position: Vec3) -> (f32, f32) {
        let offset = (position - self.start).with_y(0.0);
        let along = offset.dot(heading::direction(self.heading()));
        let lateral = offset.dot(heading::direction(self.heading() - 90.0));
        (along, lateral)
    }

    fn point_at(&self, along: f32) -> Vec3 {
        let along = along.clamp(0.0, self.length());
        (self.start + heading::direction(self.heading()) * along).with_y(ROAD_HEIGHT)
    }

    fn contains(&self, position: Vec3) -> bool {
        let (along, lateral) = self.project(position);
        (0.0..=self.length()).contains(&along) && 2.0 * lateral.abs() <= self.width()
    }

    fn distance_to(&self, position: Vec3) -> f32 {
        let (along, _) = self.project(position);
        self.point_at(along).with_y(0.0).distance(position.with_y(0.0))
    }

    /// Where a walk from `position` along `heading` leaves the road, if it ever does.
    fn boundary(&self, position: Vec3, heading: f32) -> Option<Vec3> {
        let (_, lateral) = self.project(position);
        let direction = heading::direction(heading);
        let drift = direction.dot(heading::direction(self.heading() - 90.0));

        if drift.abs() < 1e-3 {
            return None;
        }

        let distance = (drift.signum() * self.width() / 2.0 - lateral) / drift;
        Some(position + direction * distance)
    }
}

/// The hand-laid road network the demo scene is built from. Answers road questions exactly from
/// its own geometry.
#[derive(Resource, Clone, Debug)]
pub struct DemoRoadNetwork {
    pub roads: Vec<DemoRoad>,
}

impl Default for DemoRoadNetwork {
    /// A two-lane road running north crossing a three-lane road running west.
    fn default() -> Self {
        Self {
            roads: vec![
                DemoRoad {
                    start: Vec3::new(0.0, 0.0, 60.0),
                    end: Vec3::new(0.0, 0.0, -60.0),
                    lanes_same: 1,
                    lanes_opposite: 1,
                    lane_width: 4.0,
                    mapped_boundary: true,
                    traffic: 2,
                },
                DemoRoad {
                    start: Vec3::new(60.0, 0.0, 0.0),
                    end: Vec3::new(-60.0, 0.0, 0.0),
                    lanes_same: 2,
                    lanes_opposite: 1,
                    lane_width: 3.5,
                    mapped_boundary: false,
                    traffic: 4,
                },
            ],
        }
    }
}

impl DemoRoadNetwork {
    fn nearest(&self, position: Vec3) -> Option<&DemoRoad> {
        self.roads
            .iter()
            .map(|road| (road, road.distance_to(position)))
            .filter(|(_, distance)| *distance <= NODE_SEARCH_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(road, _)| road)
    }

    fn road_at(&self, position: Vec3) -> Option<&DemoRoad> {
        self.roads.iter().find(|road| road.contains(position))
    }
}

impl WorldQuery for DemoRoadNetwork {
    fn ground_material(&self, position: Vec3) -> Option<SurfaceMaterial> {
        Some(match self.road_at(position) {
            Some(_) => SurfaceMaterial::Asphalt,
            None => SurfaceMaterial::Grass,
        })
    }

    fn road_boundary(&self, position: Vec3, heading: f32) -> Option<Vec3> {
        self.road_at(position)
            .filter(|road| road.mapped_boundary)
            .and_then(|road| road.boundary(position, heading))
    }

    fn is_point_on_road(&self, position: Vec3) -> bool {
        self.road_at(position).is_some()
    }

    fn closest_node(&self, position: Vec3) -> Option<RoadNode> {
        let road = self.nearest(position)?;
        let (along, _) = road.project(position);
        let point = road.point_at(along);

        let mut node = RoadNode::new(point, road.heading(), road.lanes_same, road.lanes_opposite);
        node.is_junction = self.roads.iter().filter(|other| other.contains(point)).count() > 1;
        node.traffic_density = road.traffic;
        Some(node)
    }

    fn nearest_road(&self, position: Vec3) -> Option<NearestRoad> {
        let road = self.nearest(position)?;
        let (along, _) = road.project(position);

        Some(NearestRoad {
            point_a: road.point_at(along),
            point_b: road.point_at(along) + heading::direction(road.heading()) * NEAREST_ROAD_SPACING,
            lanes_a: road.lanes_same,
            lanes_b: road.lanes_opposite,
        })
    }

    fn ground_height(&self, position: Vec3) -> Option<f32> {
        Some(match self.road_at(position) {
            Some(_) => ROAD_HEIGHT,
            None => 0.0,
        })
    }
}
