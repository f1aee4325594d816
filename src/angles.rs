//! Angle wrapping and wrapped distance metrics.
//!
//! All comparisons of joint values and headings go through [wrap] so that angles that
//! differ by full turns compare as equal. Actuation values themselves are never wrapped.

use std::f64::consts::TAU;

use nalgebra::Matrix3;

use crate::kinematic_traits::Joints;

/// Default tolerance (radians) under which a target joint is considered to be already
/// at the current angle.
pub const SNAP_TOLERANCE: f64 = 0.01;

/// Maps any angle into [0, 2π). Zero maps to zero, negative angles are measured back
/// from a full turn, so -π/2 and 3π/2 give the same value.
pub fn wrap(angle: f64) -> f64 {
    let wrapped = if angle >= 0.0 {
        angle % TAU
    } else {
        TAU - (-angle % TAU)
    };
    // -2π gives exactly 2π above, and tiny negative values round up to it.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Wraps both configurations elementwise and returns the Euclidean norm of the difference.
///
/// The difference is not taken around the circle: an angle just below 0 wraps to
/// almost 2π, so it is far from 0 by this measure.
pub fn wrapped_error(a: &Joints, b: &Joints) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = wrap(x) - wrap(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// True if two angles are the same within the tolerance once wrapped.
pub fn wrap_equal(a: f64, b: f64, tolerance: f64) -> bool {
    (wrap(a) - wrap(b)).abs() <= tolerance
}

/// Replaces every target joint that is wrap equal to the current one by the current
/// value, so the joint is not commanded through a full turn to an equivalent angle.
pub fn snap_to_current(target: &Joints, current: &Joints, tolerance: f64) -> Joints {
    std::array::from_fn(|i| {
        if wrap_equal(target[i], current[i], tolerance) {
            current[i]
        } else {
            target[i]
        }
    })
}

/// sin(t)/t, with the limit value 1 at zero.
pub fn sinc(t: f64) -> f64 {
    if t == 0.0 { 1.0 } else { t.sin() / t }
}

/// Rotation matrix for the roll, pitch, yaw triple as the task sequencer sends it:
/// roll turns about z, pitch about y and yaw about x, composed as `Rz * Ry * Rx`.
pub fn euler_to_rotation(roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
    let (sr, cr) = roll.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();

    let x_rot = Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, cy, -sy,
        0.0, sy, cy,
    );
    let y_rot = Matrix3::new(
        cp, 0.0, sp,
        0.0, 1.0, 0.0,
        -sp, 0.0, cp,
    );
    let z_rot = Matrix3::new(
        cr, -sr, 0.0,
        sr, cr, 0.0,
        0.0, 0.0, 1.0,
    );
    z_rot * y_rot * x_rot
}

/// Yaw (rotation about z) of the orientation quaternion, as odometry reports it.
pub fn quaternion_to_yaw(qx: f64, qy: f64, qz: f64, qw: f64) -> f64 {
    let siny_cosp = 2.0 * (qw * qz + qx * qy);
    let cosy_cosp = 1.0 - 2.0 * (qy * qy + qz * qz);
    siny_cosp.atan2(cosy_cosp)
}
