use crate::geometry::heading;
use bevy::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Lane {
    heading: f32,
    right_edge: Vec3,
    left_edge: Vec3,
    width: f32,
    is_opposite: bool,
}

impl Lane {
    pub fn new(heading: f32, right_edge: Vec3, left_edge: Vec3, width: f32, is_opposite: bool) -> Self {
        Self {
            heading: heading::normalize(heading),
            right_edge,
            left_edge,
            width,
            is_opposite,
        }
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn right_edge(&self) -> Vec3 {
        self.right_edge
    }

    pub fn left_edge(&self) -> Vec3 {
        self.left_edge
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn is_opposite(&self) -> bool {
        self.is_opposite
    }

    pub fn center(&self) -> Vec3 {
        self.right_edge + heading::direction(self.heading + 90.0) * (self.width / 2.0)
    }

    pub fn translated(&self, offset: Vec3) -> Lane {
        Lane {
            right_edge: self.right_edge + offset,
            left_edge: self.left_edge + offset,
            ..self.clone()
        }
    }
}
