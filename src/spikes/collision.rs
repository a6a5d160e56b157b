use bevy::prelude::*;

/// A box rotated with its owner, sized by full extents along its local X, Y and Z axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub rotation: Quat,
    pub dimensions: Vec3,
}

impl OrientedBox {
    pub fn new(center: Vec3, rotation: Quat, dimensions: Vec3) -> Self {
        Self {
            center,
            rotation,
            dimensions,
        }
    }

    /// The box a prop occupies right now, scale included.
    pub fn from_transform(transform: &Transform, dimensions: Vec3) -> Self {
        Self::new(transform.translation, transform.rotation, dimensions * transform.scale)
    }

    pub fn axes(&self) -> [Vec3; 3] {
        [self.rotation * Vec3::X, self.rotation * Vec3::Y, self.rotation * Vec3::Z]
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let [x, y, z] = self.axes();
        let half = self.dimensions / 2.0;
        let mut corners = [Vec3::ZERO; 8];
        for (index, corner) in corners.iter_mut().enumerate() {
            let sx = if index & 1 == 0 { -1.0 } else { 1.0 };
            let sy = if index & 2 == 0 { -1.0 } else { 1.0 };
            let sz = if index & 4 == 0 { -1.0 } else { 1.0 };
            *corner = self.center + x * (sx * half.x) + y * (sy * half.y) + z * (sz * half.z);
        }
        corners
    }
}

/// Whether `point` lies inside the prop's box: its offset from the center, projected onto each
/// local axis, must be within half the box's extent on that axis.
pub fn is_touching(prop: &OrientedBox, point: Vec3) -> bool {
    let offset = point - prop.center;
    let extents = prop.dimensions.to_array();

    prop.axes()
        .iter()
        .zip(extents)
        .all(|(axis, extent)| 2.0 * offset.dot(*axis).abs() <= extent)
}
