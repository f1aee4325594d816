//! Trajectory tracking law of the differential drive base.
//!
//! The base is modelled as a unicycle with state (x, y, heading) and inputs (linear,
//! angular velocity). [UnicycleController] computes one command per call from the
//! current pose, the reference pose and the reference (feed-forward) velocities; it
//! keeps no state between calls.

use std::f64::consts::{PI, TAU};

use nalgebra::Vector2;

use crate::angles::{sinc, wrap};

/// Heading errors larger than this are a wrap artifact of the odometry, not a real divergence.
const WRAP_ARTIFACT_THRESHOLD: f64 = 4.0;

/// Planar pose of the base, heading in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose2D { x, y, theta }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn distance_to(&self, point: &Vector2<f64>) -> f64 {
        (point - self.position()).norm()
    }
}

/// Unicycle command, or reference velocities when used as feed-forward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BaseVelocity {
    /// m/s along the heading
    pub linear: f64,
    /// rad/s, counterclockwise positive
    pub angular: f64,
}

impl BaseVelocity {
    pub const ZERO: BaseVelocity = BaseVelocity { linear: 0.0, angular: 0.0 };

    pub fn new(linear: f64, angular: f64) -> Self {
        BaseVelocity { linear, angular }
    }
}

/// Wraps both headings and moves them onto the same side of the wrap boundary
/// when they lie on opposite sides of it. Returns the corrected (current, desired) pair.
fn aligned_headings(current: f64, desired: f64) -> (f64, f64) {
    let mut current = wrap(current);
    let mut desired = wrap(desired);
    let error = current - desired;
    if error < -WRAP_ARTIFACT_THRESHOLD {
        current += TAU;
    } else if error > WRAP_ARTIFACT_THRESHOLD {
        desired += TAU;
    }
    (current, desired)
}

/// Heading error `current - desired` after the wrap boundary correction.
pub fn heading_error(current: f64, desired: f64) -> f64 {
    let (current, desired) = aligned_headings(current, desired);
    current - desired
}

/// Angle in (-π, π] equivalent to the given one.
pub fn shortest_angle(angle: f64) -> f64 {
    let wrapped = wrap(angle);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Rotation in [0, 2π) that turns the base from its heading to face the target point.
pub fn rotation_towards(position: &Vector2<f64>, heading: f64, target: &Vector2<f64>) -> f64 {
    let delta = target - position;
    let bearing = wrap(delta.y.atan2(delta.x));
    wrap(bearing - heading)
}

/// Feedback linearization controller for unicycle tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnicycleController {
    /// Position error gain.
    pub kp: f64,
    /// Heading error gain.
    pub kth: f64,
}

impl Default for UnicycleController {
    fn default() -> Self {
        UnicycleController { kp: 0.5, kth: 0.5 }
    }
}

impl UnicycleController {
    pub fn new(kp: f64, kth: f64) -> Self {
        UnicycleController { kp, kth }
    }

    /// Velocity command driving the base from `current` towards the reference `desired`
    /// that moves with `desired_velocity`.
    pub fn compute_velocity_command(
        &self,
        current: &Pose2D,
        desired: &Pose2D,
        desired_velocity: &BaseVelocity,
    ) -> BaseVelocity {
        let (theta, theta_d) = aligned_headings(current.theta, desired.theta);
        let error_rot = theta - theta_d;

        let error = current.position() - desired.position();
        let error_xy = error.norm();
        let psi = error.y.atan2(error.x);
        let alpha = (theta + theta_d) / 2.0;

        let linear = desired_velocity.linear - self.kp * error_xy * (psi - theta).cos();
        let angular = desired_velocity.angular
            - self.kth * error_rot
            - desired_velocity.linear * sinc(error_rot / 2.0) * error_xy * (psi - alpha).sin();

        BaseVelocity { linear, angular }
    }
}
