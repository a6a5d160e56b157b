use bevy::prelude::*;

/// A sampled point on the drivable network.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadNode {
    pub position: Vec3,
    pub heading: f32,
    pub lanes_same: u32,
    pub lanes_opposite: u32,
    pub is_junction: bool,
    pub traffic_density: u8,
}

impl RoadNode {
    pub fn new(position: Vec3, heading: f32, lanes_same: u32, lanes_opposite: u32) -> Self {
        Self {
            position,
            heading,
            lanes_same,
            lanes_opposite,
            is_junction: false,
            traffic_density: 0,
        }
    }

    pub fn with_lanes(self, lanes_same: u32, lanes_opposite: u32) -> Self {
        Self {
            lanes_same,
            lanes_opposite,
            ..self
        }
    }

    pub fn total_lanes(&self) -> u32 {
        self.lanes_same.saturating_add(self.lanes_opposite)
    }

    /// Same sample point, used to drop duplicates returned by the node query.
    pub fn same_sample(&self, other: &RoadNode) -> bool {
        self.position.abs_diff_eq(other.position, 1e-3) && (self.heading - other.heading).abs() < 1e-3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_total_saturates_on_corrupt_counts() {
        let node = RoadNode::new(Vec3::ZERO, 0.0, u32::MAX, 3);
        assert_eq!(node.total_lanes(), u32::MAX);
        assert_eq!(RoadNode::new(Vec3::ZERO, 0.0, 0, 0).total_lanes(), 0);
    }
}
