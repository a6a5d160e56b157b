use bevy::prelude::*;

// Headings are degrees, counter-clockwise seen from above. Heading 0 faces -Z (Bevy forward),
// heading 90 faces -X.

pub fn normalize(heading: f32) -> f32 {
    heading.rem_euclid(360.0)
}

pub fn direction(heading: f32) -> Vec3 {
    let radians = heading.to_radians();
    Vec3::new(-radians.sin(), 0.0, -radians.cos())
}

pub fn rotation(heading: f32) -> Quat {
    Quat::from_rotation_y(heading.to_radians())
}

pub fn from_direction(direction: Vec3) -> f32 {
    normalize((-direction.x).atan2(-direction.z).to_degrees())
}

/// Smallest angle between two headings, in `[0, 180]`.
pub fn difference(a: f32, b: f32) -> f32 {
    let delta = normalize(a - b);
    delta.min(360.0 - delta)
}

pub fn opposite(heading: f32) -> f32 {
    normalize(heading - 180.0)
}
