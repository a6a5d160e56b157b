use crate::geometry::{lane::Lane, road_node::RoadNode};
use bevy::prelude::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoadBuildError {
    #[error("invalid lane data: road node at {position} has no lanes in either direction")]
    InvalidLaneData { position: Vec3 },
    #[error("road edges around {position} collapse onto a single point")]
    DegenerateSpan { position: Vec3 },
    #[error("no road node near {position}")]
    NoRoadNearby { position: Vec3 },
}

/// A reconstructed stretch of road. Only `RoadGeometryBuilder` creates these, so there is always
/// at least one lane.
#[derive(Clone, Debug, PartialEq)]
pub struct Road {
    right_edge: Vec3,
    left_edge: Vec3,
    lanes: Vec<Lane>,
    node: RoadNode,
}

impl Road {
    pub(crate) fn new(right_edge: Vec3, left_edge: Vec3, lanes: Vec<Lane>, node: RoadNode) -> Self {
        debug_assert!(!lanes.is_empty());
        Self {
            right_edge,
            left_edge,
            lanes,
            node,
        }
    }

    pub fn right_edge(&self) -> Vec3 {
        self.right_edge
    }

    pub fn left_edge(&self) -> Vec3 {
        self.left_edge
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, index: usize) -> Option<&Lane> {
        self.lanes.get(index)
    }

    pub fn node(&self) -> &RoadNode {
        &self.node
    }

    pub fn position(&self) -> Vec3 {
        self.node.position
    }

    pub fn heading(&self) -> f32 {
        self.node.heading
    }

    pub fn width(&self) -> f32 {
        self.lanes.iter().map(Lane::width).sum()
    }

    pub fn center(&self) -> Vec3 {
        self.right_edge.lerp(self.left_edge, 0.5)
    }

    pub fn is_single_direction(&self) -> bool {
        self.node.lanes_same == 0 || self.node.lanes_opposite == 0
    }

    pub fn lanes_same_direction(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter().filter(|lane| !lane.is_opposite())
    }

    pub fn lanes_opposite_direction(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter().filter(|lane| lane.is_opposite())
    }

    /// Index of the lane whose center line is nearest to `point`, ignoring height.
    pub fn closest_lane(&self, point: Vec3) -> usize {
        self.lanes
            .iter()
            .enumerate()
            .map(|(index, lane)| (index, lane_distance(lane, point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
            .unwrap_or(0)
    }
}

fn lane_distance(lane: &Lane, point: Vec3) -> f32 {
    let across = (lane.left_edge() - lane.right_edge()).with_y(0.0).normalize_or_zero();
    let offset = (point - lane.center()).with_y(0.0);
    offset.dot(across).abs()
}
