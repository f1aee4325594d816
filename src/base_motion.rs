//! Motion primitives of the mobile base built on the unicycle tracking law.
//!
//! Each primitive generates a reference trajectory at the configured speed, tracks
//! it at the base loop rate and ends once the reference is finished and the base is
//! within tolerance of its end. A zero velocity command is always published last.

use std::thread::sleep;
use std::time::Instant;

use nalgebra::Vector2;
use tracing::{debug, info, warn};

use crate::actuators::BaseActuator;
use crate::base_controller::{heading_error, rotation_towards, shortest_angle, BaseVelocity, Pose2D, UnicycleController};
use crate::config::BaseControllerConfig;
use crate::error::MotionError;
use crate::feedback::OdometryReader;
use crate::motion_bound::{BoundExpired, MotionBound};

/// Reference pose and feed-forward velocity at a point in time.
trait Reference {
    fn at(&self, t: f64) -> (Pose2D, BaseVelocity);
    fn duration(&self) -> f64;
    /// Distance of the pose from where the reference ends.
    fn remaining(&self, pose: &Pose2D) -> f64;
    fn tolerance(&self) -> f64;
}

/// Straight line along a fixed heading at constant speed.
struct LineReference {
    start: Pose2D,
    speed: f64,
    duration: f64,
    position_tolerance: f64,
}

impl LineReference {
    fn end(&self) -> Vector2<f64> {
        self.at(self.duration).0.position()
    }

    fn direction(&self) -> Vector2<f64> {
        let (sin, cos) = self.start.theta.sin_cos();
        Vector2::new(cos, sin)
    }

    /// Sideways offset from the line. Once the reference has stopped the tracking law
    /// can no longer reduce it, so it is reported but does not gate termination.
    fn lateral(&self, pose: &Pose2D) -> f64 {
        let offset = pose.position() - self.end();
        let direction = self.direction();
        direction.x * offset.y - direction.y * offset.x
    }
}

impl Reference for LineReference {
    fn at(&self, t: f64) -> (Pose2D, BaseVelocity) {
        let s = t.min(self.duration);
        let (sin, cos) = self.start.theta.sin_cos();
        let travelled = self.speed * s;
        let pose = Pose2D::new(
            self.start.x + travelled * cos,
            self.start.y + travelled * sin,
            self.start.theta,
        );
        let velocity = if t < self.duration {
            BaseVelocity::new(self.speed, 0.0)
        } else {
            BaseVelocity::ZERO
        };
        (pose, velocity)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    /// Along track distance to the end point.
    fn remaining(&self, pose: &Pose2D) -> f64 {
        (self.end() - pose.position()).dot(&self.direction()).abs()
    }

    fn tolerance(&self) -> f64 {
        self.position_tolerance
    }
}

/// In place rotation at constant angular speed.
struct RotationReference {
    start: Pose2D,
    rate: f64,
    duration: f64,
    heading_tolerance: f64,
}

impl Reference for RotationReference {
    fn at(&self, t: f64) -> (Pose2D, BaseVelocity) {
        let s = t.min(self.duration);
        let pose = Pose2D::new(self.start.x, self.start.y, self.start.theta + self.rate * s);
        let velocity = if t < self.duration {
            BaseVelocity::new(0.0, self.rate)
        } else {
            BaseVelocity::ZERO
        };
        (pose, velocity)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn remaining(&self, pose: &Pose2D) -> f64 {
        let end = self.at(self.duration).0;
        heading_error(pose.theta, end.theta).abs()
    }

    fn tolerance(&self) -> f64 {
        self.heading_tolerance
    }
}

pub struct BaseMotionController {
    config: BaseControllerConfig,
    controller: UnicycleController,
    actuator: Box<dyn BaseActuator>,
    odometry: OdometryReader,
}

impl BaseMotionController {
    pub fn new(
        config: BaseControllerConfig,
        actuator: Box<dyn BaseActuator>,
        odometry: OdometryReader,
    ) -> Result<Self, MotionError> {
        config.validate()?;
        Ok(BaseMotionController {
            controller: config.controller(),
            config,
            actuator,
            odometry,
        })
    }

    pub fn config(&self) -> &BaseControllerConfig {
        &self.config
    }

    pub fn pose(&self) -> Pose2D {
        self.odometry.pose()
    }

    /// One step of the tracking law, without publishing.
    pub fn compute_velocity_command(
        &self,
        current: &Pose2D,
        desired: &Pose2D,
        desired_velocity: &BaseVelocity,
    ) -> BaseVelocity {
        self.controller.compute_velocity_command(current, desired, desired_velocity)
    }

    /// Drives the given distance along the current heading, backwards if negative.
    /// Returns the final pose.
    pub fn forward(&mut self, distance: f64) -> Result<Pose2D, MotionError> {
        self.forward_bounded(distance, &MotionBound::unbounded())
    }

    pub fn forward_bounded(&mut self, distance: f64, bound: &MotionBound) -> Result<Pose2D, MotionError> {
        finite("distance", distance)?;
        let start = self.odometry.pose();
        let reference = LineReference {
            start,
            speed: self.config.linear_speed.copysign(distance),
            duration: distance.abs() / self.config.linear_speed,
            position_tolerance: self.config.position_tolerance,
        };
        info!("Base forward {:.3} m from ({:.3}, {:.3})", distance, start.x, start.y);
        let pose = self.track(&reference, bound)?;
        let lateral = reference.lateral(&pose);
        if lateral.abs() >= self.config.position_tolerance {
            warn!("Base stopped {:.3} m off the line", lateral);
        }
        Ok(pose)
    }

    /// Rotates in place by the given angle, counterclockwise if positive.
    pub fn rotate(&mut self, angle: f64) -> Result<Pose2D, MotionError> {
        self.rotate_bounded(angle, &MotionBound::unbounded())
    }

    pub fn rotate_bounded(&mut self, angle: f64, bound: &MotionBound) -> Result<Pose2D, MotionError> {
        finite("angle", angle)?;
        let start = self.odometry.pose();
        let reference = RotationReference {
            start,
            rate: self.config.angular_speed.copysign(angle),
            duration: angle.abs() / self.config.angular_speed,
            heading_tolerance: self.config.heading_tolerance,
        };
        info!("Base rotate {:.3} rad from heading {:.3}", angle, start.theta);
        self.track(&reference, bound)
    }

    /// Turns by the shortest rotation that makes the base face the target point.
    pub fn point_towards(&mut self, target: &Vector2<f64>) -> Result<Pose2D, MotionError> {
        self.point_towards_bounded(target, &MotionBound::unbounded())
    }

    pub fn point_towards_bounded(&mut self, target: &Vector2<f64>, bound: &MotionBound) -> Result<Pose2D, MotionError> {
        finite("target x", target.x)?;
        finite("target y", target.y)?;
        let pose = self.odometry.pose();
        let angle = shortest_angle(rotation_towards(&pose.position(), pose.theta, target));
        self.rotate_bounded(angle, bound)
    }

    /// Points towards the target, then drives to it.
    pub fn drive_to(&mut self, target: &Vector2<f64>) -> Result<Pose2D, MotionError> {
        self.drive_to_bounded(target, &MotionBound::unbounded())
    }

    pub fn drive_to_bounded(&mut self, target: &Vector2<f64>, bound: &MotionBound) -> Result<Pose2D, MotionError> {
        let pose = self.point_towards_bounded(target, bound)?;
        self.forward_bounded(pose.distance_to(target), bound)
    }

    fn track(&mut self, reference: &impl Reference, bound: &MotionBound) -> Result<Pose2D, MotionError> {
        let dt = self.config.dt();
        let period = self.config.period();
        let started = Instant::now();
        let mut ticks: u64 = 0;

        let result = loop {
            // Reference time advances with the commands, not the wall clock.
            let t = ticks as f64 * dt;
            let current = self.odometry.pose();
            if t >= reference.duration() && reference.remaining(&current) < reference.tolerance() {
                break Ok(current);
            }
            if let Some(expired) = bound.check() {
                let elapsed = started.elapsed();
                let error = reference.remaining(&current);
                warn!("Base motion stopped ({:?}) after {:?}", expired, elapsed);
                break Err(match expired {
                    BoundExpired::Deadline => MotionError::TimedOut { elapsed, error },
                    BoundExpired::Cancelled => MotionError::Cancelled { error },
                });
            }

            let (desired, feed_forward) = reference.at(t);
            let command = self.controller.compute_velocity_command(&current, &desired, &feed_forward);
            self.actuator.publish_velocity(command);
            ticks += 1;
            sleep(period);
        };

        self.actuator.publish_velocity(BaseVelocity::ZERO);
        if let Ok(pose) = &result {
            debug!("Base at ({:.3}, {:.3}, {:.3}) after {} ticks", pose.x, pose.y, pose.theta, ticks);
        }
        result
    }
}

fn finite(name: &str, value: f64) -> Result<(), MotionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MotionError::InvalidTarget(format!("{} is {}", name, value)))
    }
}
