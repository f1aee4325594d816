//! Forbidden workspace volumes described by parry3d shapes (meshes, cylinders, capsules
//! and everything else parry supports), placed in the world by their own pose.

use nalgebra::{Isometry3, Point3, Vector3};
use parry3d::shape::SharedShape;

use crate::workspace::WorkspaceVolume;

/// Static object the end effector must not enter.
/// Unlike the axis aligned box, it has the global transform allowing to place it
/// where desired.
#[derive(Clone)]
pub struct ShapeVolume {
    /// Shape of this object
    pub shape: SharedShape,
    /// Global transform of this object.
    pub pose: Isometry3<f32>,
}

impl ShapeVolume {
    pub fn new(shape: SharedShape, pose: Isometry3<f32>) -> Self {
        ShapeVolume { shape, pose }
    }

    /// Vertical cylinder standing on the given base point, like the pole holding the arm.
    pub fn pillar(base: Vector3<f64>, radius: f64, height: f64) -> Self {
        let half_height = (height / 2.0) as f32;
        let center = base.cast::<f32>() + Vector3::new(0.0, 0.0, half_height);
        // parry cylinders are aligned with y, turn them upright.
        let pose = Isometry3::new(center, Vector3::x() * std::f32::consts::FRAC_PI_2);
        ShapeVolume::new(SharedShape::cylinder(half_height, radius as f32), pose)
    }
}

impl WorkspaceVolume for ShapeVolume {
    fn contains(&self, point: &Vector3<f64>) -> bool {
        let point: Point3<f32> = Point3::from(point.cast::<f32>());
        self.shape.contains_point(&self.pose, &point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_volume() {
        let ball = ShapeVolume::new(
            SharedShape::ball(0.2),
            Isometry3::translation(1.0, 0.0, 0.5),
        );
        assert!(ball.contains(&Vector3::new(1.1, 0.0, 0.5)));
        assert!(!ball.contains(&Vector3::new(1.3, 0.0, 0.5)));
        assert!(!ball.contains(&Vector3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_pillar_is_upright() {
        let pillar = ShapeVolume::pillar(Vector3::new(0.0, 0.0, 0.0), 0.05, 1.0);
        assert!(pillar.contains(&Vector3::new(0.0, 0.0, 0.9)));
        assert!(pillar.contains(&Vector3::new(0.03, 0.0, 0.1)));
        assert!(!pillar.contains(&Vector3::new(0.0, 0.0, 1.1)));
        assert!(!pillar.contains(&Vector3::new(0.0, 0.5, 0.5)));
    }
}
