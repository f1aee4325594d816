//! Helper functions

use crate::kinematic_traits::Joints;
use nalgebra::{Isometry3, UnitQuaternion};

/// Checks if all elements in the array are finite
pub fn is_valid(qs: &Joints) -> bool {
    qs.iter().all(|&q| q.is_finite())
}

/// Convert array of f32's in degrees to Joints
/// that are array of f64's in radians
pub fn joints(angles: &[f32; 6]) -> Joints {
    std::array::from_fn(|i| (angles[i] as f64).to_radians())
}

/// Convert joints that are array of f64's in radians to
/// array of f32's in degrees
pub fn to_degrees(angles: &Joints) -> [f32; 6] {
    std::array::from_fn(|i| angles[i].to_degrees() as f32)
}

/// Joint values in degrees, formatted on a single line.
pub fn format_joints(joints: &Joints) -> String {
    let row: Vec<String> = joints.iter().map(|q| format!("{:5.2}", q.to_degrees())).collect();
    format!("[{}]", row.join(" "))
}

/// Print joint values, converting radians to degrees.
pub fn dump_joints(joints: &Joints) {
    println!("{}", format_joints(joints));
}

pub fn format_pose(isometry: &Isometry3<f64>) -> String {
    let translation = isometry.translation.vector;
    let rotation: UnitQuaternion<f64> = isometry.rotation;
    format!(
        "x: {:.5}, y: {:.5}, z: {:.5},  quat: {:.5},{:.5},{:.5},{:.5}",
        translation.x, translation.y, translation.z, rotation.i, rotation.j, rotation.k, rotation.w
    )
}

pub fn dump_pose(isometry: &Isometry3<f64>) {
    println!("{}", format_pose(isometry));
}

/// formatting for YAML output
pub(crate) fn deg(x: &f64) -> String {
    if *x == 0.0 {
        return "0".to_string();
    }
    format!("deg({:.4})", x.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_is_valid_with_all_finite() {
        let qs = [0.0, 1.0, -1.0, 0.5, -0.5, PI];
        assert!(is_valid(&qs));
    }

    #[test]
    fn test_is_valid_with_nan() {
        let qs = [0.0, f64::NAN, 1.0, -1.0, 0.5, -0.5];
        assert!(!is_valid(&qs));
    }

    #[test]
    fn test_is_valid_with_infinity() {
        let qs = [0.0, f64::INFINITY, 1.0, -1.0, 0.5, -0.5];
        assert!(!is_valid(&qs));
    }

    #[test]
    fn test_format_joints_in_degrees() {
        assert_eq!(format_joints(&[0.0, PI, 0.0, 0.0, 0.0, -PI / 2.0]), "[ 0.00 180.00  0.00  0.00  0.00 -90.00]");
    }

    #[test]
    fn test_deg_formatting() {
        assert_eq!(deg(&0.0), "0");
        assert_eq!(deg(&(PI / 2.0)), "deg(90.0000)");
    }

    #[test]
    fn test_degrees_round_trip_precision() {
        let degrees = [90.0, -45.0, 0.0, 180.0, 30.0, -120.0];
        let radians = joints(&degrees);
        assert!((radians[0] - PI / 2.0).abs() < 1e-6);
        let back = joints(&to_degrees(&radians));
        for i in 0..6 {
            assert!((back[i] - radians[i]).abs() < 1e-6);
        }
    }
}
