use crate::{
    geometry::{
        edge_locator::LocateEdge,
        heading,
        lane::Lane,
        road::{Road, RoadBuildError},
        road_node::RoadNode,
    },
    world::query::WorldQuery,
};
use bevy::prelude::*;

const MIN_SPAN: f32 = 1e-3;

/// Turns a road node into a `Road` by locating both edges and subdividing the span into lanes.
pub struct RoadGeometryBuilder<'a> {
    edges: &'a dyn LocateEdge,
    ground: Option<&'a dyn WorldQuery>,
}

impl<'a> RoadGeometryBuilder<'a> {
    pub fn new(edges: &'a dyn LocateEdge) -> Self {
        Self { edges, ground: None }
    }

    /// Snap located edges onto the ground reported by `world`.
    pub fn with_ground(self, world: &'a dyn WorldQuery) -> Self {
        Self {
            ground: Some(world),
            ..self
        }
    }

    pub fn build(&self, node: RoadNode) -> Result<Road, RoadBuildError> {
        if node.total_lanes() == 0 {
            return Err(RoadBuildError::InvalidLaneData {
                position: node.position,
            });
        }

        let right_edge = self.snap(self.edges.locate(node.position, node.heading - 90.0));
        let left_edge = self.snap(self.edges.locate(node.position, node.heading + 90.0));

        if right_edge.distance(left_edge) < MIN_SPAN {
            return Err(RoadBuildError::DegenerateSpan {
                position: node.position,
            });
        }

        let lanes = if node.lanes_opposite == 0 {
            subdivide(right_edge, left_edge, node.lanes_same, node.heading, false)
        } else if node.lanes_same == 0 {
            subdivide(left_edge, right_edge, node.lanes_opposite, heading::opposite(node.heading), true)
        } else {
            let center = right_edge.lerp(left_edge, 0.5);
            let mut lanes = subdivide(right_edge, center, node.lanes_same, node.heading, false);
            lanes.extend(subdivide(left_edge, center, node.lanes_opposite, heading::opposite(node.heading), true));
            lanes
        };

        log::debug!(
            "built road at {} with {} lanes ({} same, {} opposite)",
            node.position,
            lanes.len(),
            node.lanes_same,
            node.lanes_opposite
        );

        Ok(Road::new(right_edge, left_edge, lanes, node))
    }

    /// Builds the road around the node nearest to `position`.
    pub fn build_closest(&self, world: &dyn WorldQuery, position: Vec3) -> Result<Road, RoadBuildError> {
        let node = world
            .closest_node(position)
            .ok_or(RoadBuildError::NoRoadNearby { position })?;
        self.build(node)
    }

    fn snap(&self, point: Vec3) -> Vec3 {
        match self.ground.and_then(|world| world.ground_height(point)) {
            Some(height) => point.with_y(height),
            None => point,
        }
    }
}

/// Splits `from..to` into `count` equally wide lanes, the first lane's right edge at `from`.
fn subdivide(from: Vec3, to: Vec3, count: u32, heading: f32, is_opposite: bool) -> Vec<Lane> {
    let width = from.distance(to) / count as f32;
    let across = (to - from).normalize_or_zero();

    (0..count)
        .map(|index| {
            let right_edge = from + across * (width * index as f32);
            let left_edge = right_edge + across * width;
            Lane::new(heading, right_edge, left_edge, width, is_opposite)
        })
        .collect()
}
