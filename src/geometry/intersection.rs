use crate::{
    config::IntersectionSettings,
    geometry::{heading, road::Road, road_builder::RoadGeometryBuilder, road_node::RoadNode},
    world::query::WorldQuery,
};
use bevy::prelude::*;

/// The roads meeting around a sampled point.
#[derive(Clone, Debug)]
pub struct Intersection {
    pub position: Vec3,
    pub heading: f32,
    pub directions: Vec<RoadNode>,
    pub roads: Vec<Road>,
}

pub struct IntersectionLocator<'a> {
    world: &'a dyn WorldQuery,
    builder: &'a RoadGeometryBuilder<'a>,
    settings: &'a IntersectionSettings,
}

impl<'a> IntersectionLocator<'a> {
    pub fn new(world: &'a dyn WorldQuery, builder: &'a RoadGeometryBuilder<'a>, settings: &'a IntersectionSettings) -> Self {
        Self {
            world,
            builder,
            settings,
        }
    }

    pub fn discover(&self, position: Vec3) -> Intersection {
        let heading = self.world.closest_node(position).map(|node| node.heading).unwrap_or(0.0);
        let directions = self.sample_directions(position);
        let mut roads: Vec<Road> = Vec::new();

        for direction in &directions {
            let Some(node) = self.find_connecting_node(position, direction, &roads) else {
                log::debug!(
                    "no road connects to the junction at {} from direction node {}",
                    position,
                    direction.position
                );
                continue;
            };

            match self.builder.build(self.resolve_lanes(node)) {
                Ok(road) => roads.push(road),
                Err(err) => log::warn!("dropping junction direction at {}: {}", node.position, err),
            }
        }

        log::debug!("junction at {} has {} roads from {} directions", position, roads.len(), directions.len());

        Intersection {
            position,
            heading,
            directions,
            roads,
        }
    }

    fn sample_directions(&self, position: Vec3) -> Vec<RoadNode> {
        let count = self.settings.sample_directions.max(1);
        let step = 360.0 / count as f32;
        let mut nodes: Vec<RoadNode> = Vec::new();

        for index in 0..count {
            let sample = position + heading::direction(step * index as f32) * self.settings.sample_radius;
            if let Some(node) = self.world.closest_node(sample) {
                if !nodes.iter().any(|known| known.same_sample(&node)) {
                    nodes.push(node);
                }
            }
        }

        nodes
    }

    fn find_connecting_node(&self, junction: Vec3, direction: &RoadNode, roads: &[Road]) -> Option<RoadNode> {
        let outward = match (direction.position - junction).with_y(0.0).try_normalize() {
            Some(outward) => outward,
            None => heading::direction(direction.heading),
        };
        let mut distance = self.settings.initial_search_distance;

        for _ in 0..self.settings.max_search_attempts {
            let candidate = self.world.closest_node(direction.position + outward * distance);

            if let Some(node) = candidate.filter(|node| self.accepts(direction, node, roads)) {
                return Some(node);
            }

            distance *= self.settings.search_growth;
        }

        None
    }

    fn accepts(&self, direction: &RoadNode, candidate: &RoadNode, roads: &[Road]) -> bool {
        let moved = !candidate.position.abs_diff_eq(direction.position, 1e-3);
        let aligned = heading::difference(candidate.heading, direction.heading) <= self.settings.heading_tolerance;
        let unseen = roads
            .iter()
            .all(|road| heading::difference(road.heading(), candidate.heading) >= self.settings.duplicate_road_tolerance);

        moved && aligned && unseen
    }

    fn resolve_lanes(&self, node: RoadNode) -> RoadNode {
        match self.world.nearest_road(node.position) {
            Some(nearest) => {
                let (same, opposite) = nearest.lanes_for(node.position);
                node.with_lanes(same, opposite)
            }
            None => node,
        }
    }
}
