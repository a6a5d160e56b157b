use crate::{config::RoadGeometrySettings, geometry::heading, world::query::WorldQuery};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Anything that can tell where the drivable surface ends when walking from a point along a heading.
pub trait LocateEdge {
    fn locate(&self, position: Vec3, heading: f32) -> Vec3;
}

/// One independent way of finding a road edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeStrategy {
    /// Walk outward in shrinking steps until the ground material changes.
    RayTrace,
    /// Ask the world for the road boundary directly.
    NativeBoundary,
    /// Step while the point is still on road. Coarse, no material discrimination.
    RoadWalk,
}

impl EdgeStrategy {
    pub fn probe(
        self,
        world: &dyn WorldQuery,
        settings: &RoadGeometrySettings,
        position: Vec3,
        heading: f32,
    ) -> Option<Vec3> {
        match self {
            EdgeStrategy::RayTrace => ray_trace(world, settings, position, heading),
            EdgeStrategy::NativeBoundary => world.road_boundary(position, heading),
            EdgeStrategy::RoadWalk => road_walk(world, settings, position, heading),
        }
    }
}

fn ray_trace(world: &dyn WorldQuery, settings: &RoadGeometrySettings, position: Vec3, heading: f32) -> Option<Vec3> {
    let Some(center_material) = world.ground_material(position) else {
        log::debug!("no ground material below {}", position);
        return None;
    };

    let direction = heading::direction(heading);
    let mut step = settings.ray_trace_initial_step;
    let mut last_on_road = position;
    let mut searched = 0.0;

    while step >= settings.ray_trace_min_step {
        let candidate = last_on_road + direction * step;
        searched += step;

        if searched > settings.max_search_distance {
            log::debug!("ray trace from {} searched {} units without an edge", position, searched);
            return None;
        }

        if world.ground_material(candidate) == Some(center_material) {
            last_on_road = candidate;
        } else {
            step /= 2.0;
        }
    }

    let edge_distance = position.with_y(0.0).distance(last_on_road.with_y(0.0));
    if edge_distance < settings.min_edge_distance {
        log::debug!("ray trace edge {} is only {} from the center", last_on_road, edge_distance);
        return None;
    }

    Some(last_on_road)
}

fn road_walk(world: &dyn WorldQuery, settings: &RoadGeometrySettings, position: Vec3, heading: f32) -> Option<Vec3> {
    let step = heading::direction(heading) * settings.road_walk_step;
    let mut last_on_road = None;

    for attempt in 1..=settings.road_walk_max_attempts {
        let candidate = position + step * attempt as f32;
        if !world.is_point_on_road(candidate) {
            break;
        }
        last_on_road = Some(candidate);
    }

    last_on_road
}

/// Tries each configured strategy in order and falls back to a fixed offset, so it always
/// produces an edge.
pub struct RoadEdgeLocator<'a> {
    world: &'a dyn WorldQuery,
    settings: &'a RoadGeometrySettings,
}

impl<'a> RoadEdgeLocator<'a> {
    pub fn new(world: &'a dyn WorldQuery, settings: &'a RoadGeometrySettings) -> Self {
        Self { world, settings }
    }
}

impl LocateEdge for RoadEdgeLocator<'_> {
    fn locate(&self, position: Vec3, heading: f32) -> Vec3 {
        for strategy in &self.settings.edge_strategies {
            if let Some(edge) = strategy.probe(self.world, self.settings, position, heading) {
                return edge;
            }
            log::debug!("{:?} found no edge from {} at heading {}", strategy, position, heading);
        }

        log::debug!("all edge strategies failed at {}, using fallback offset", position);
        position + heading::direction(heading) * self.settings.fallback_offset
    }
}
