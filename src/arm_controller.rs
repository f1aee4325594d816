//! Closed loop joint motion of the arm.
//!
//! A motion request is resolved into a validated joint path by the [SolutionSelector],
//! then executed by a fixed rate loop that drives the cascaded filter towards the path
//! target and publishes the filter output every tick. The loop ends when the wrapped
//! error between the target and the latest feedback falls under the threshold.
//!
//! Motions block the calling thread. [ArmController::move_to] runs until convergence,
//! [ArmController::move_to_bounded] also stops at a deadline or on cancellation.

use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use nalgebra::{Matrix3, Vector3};
use tracing::{debug, info, trace, warn};

use crate::actuators::{ArmActuator, GripperActuator};
use crate::angles::wrapped_error;
use crate::config::ArmControllerConfig;
use crate::error::MotionError;
use crate::feedback::FeedbackReader;
use crate::filter::CascadedFilter;
use crate::gripper::GripperSequencer;
use crate::kinematic_traits::{pose_from_parts, InverseKinematics, Joints, Kinematics, Solutions, MAX_CANDIDATES};
use crate::motion_bound::{BoundExpired, MotionBound};
use crate::path_check::PathValidator;
use crate::selector::{Selection, SolutionSelector};
use crate::utils::format_joints;

/// Lifecycle of a single motion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    Moving,
    Converged,
}

/// Summary of a completed motion.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionReport {
    /// Configuration the arm was driven to.
    pub target: Joints,
    /// Number of commands published.
    pub ticks: u64,
    pub elapsed: Duration,
    /// Wrapped error at convergence.
    pub final_error: f64,
    /// Index of the chosen candidate in the inverse kinematics output.
    pub candidate_index: usize,
}

pub struct ArmController {
    config: ArmControllerConfig,
    solver: Arc<dyn InverseKinematics>,
    selector: SolutionSelector,
    actuator: Box<dyn ArmActuator>,
    feedback: FeedbackReader,
    gripper: GripperSequencer,
    filter: CascadedFilter,
    state: MotionState,
}

impl ArmController {
    pub fn new(
        config: ArmControllerConfig,
        validator: PathValidator,
        solver: Arc<dyn InverseKinematics>,
        actuator: Box<dyn ArmActuator>,
        gripper: Box<dyn GripperActuator>,
        feedback: FeedbackReader,
    ) -> Result<Self, MotionError> {
        config.validate()?;
        let seed = feedback.joints();
        Ok(ArmController {
            filter: CascadedFilter::new(config.dt(), config.settling_time, &seed),
            selector: SolutionSelector::new(validator, config.snap_tolerance),
            gripper: GripperSequencer::new(gripper, config.gripper_settle),
            config,
            solver,
            actuator,
            feedback,
            state: MotionState::Idle,
        })
    }

    pub fn config(&self) -> &ArmControllerConfig {
        &self.config
    }

    pub fn kinematics(&self) -> &Arc<dyn Kinematics> {
        self.selector.validator().kinematics()
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Latest joint feedback.
    pub fn get_joint_state(&self) -> Joints {
        self.feedback.joints()
    }

    /// Moves the end effector to the given position and orientation, blocking until
    /// the arm converges. Fails without commanding anything if no candidate of the
    /// inverse kinematics has a valid path.
    ///
    /// Convergence uses [wrapped_error], so feedback settling just below a target
    /// joint of exactly 0 is never within the threshold and this call does not return.
    /// Use [ArmController::move_to_bounded] where that can happen.
    pub fn move_to(
        &mut self,
        position: &Vector3<f64>,
        rotation: &Matrix3<f64>,
        waypoints: usize,
    ) -> Result<MotionReport, MotionError> {
        self.move_to_bounded(position, rotation, waypoints, &MotionBound::unbounded())
    }

    pub fn move_to_bounded(
        &mut self,
        position: &Vector3<f64>,
        rotation: &Matrix3<f64>,
        waypoints: usize,
        bound: &MotionBound,
    ) -> Result<MotionReport, MotionError> {
        let pose = pose_from_parts(position, rotation);
        let mut candidates = self.solver.inverse(&pose);
        if candidates.len() > MAX_CANDIDATES {
            debug!("Solver returned {} candidates, keeping {}", candidates.len(), MAX_CANDIDATES);
            candidates.truncate(MAX_CANDIDATES);
        }
        info!(
            "Move to x: {:.4}, y: {:.4}, z: {:.4}, {} candidates",
            position.x, position.y, position.z, candidates.len()
        );
        self.execute(&candidates, waypoints, bound)
    }

    /// Joint space motion to a known configuration, validated like any other target.
    /// Blocks like [ArmController::move_to].
    pub fn move_to_joints(&mut self, target: &Joints, waypoints: usize) -> Result<MotionReport, MotionError> {
        self.move_to_joints_bounded(target, waypoints, &MotionBound::unbounded())
    }

    pub fn move_to_joints_bounded(
        &mut self,
        target: &Joints,
        waypoints: usize,
        bound: &MotionBound,
    ) -> Result<MotionReport, MotionError> {
        info!("Move to joints {}", format_joints(target));
        self.execute(&vec![*target], waypoints, bound)
    }

    /// Commands the gripper and waits for it to settle.
    pub fn set_gripper(&mut self, aperture: i32) {
        self.gripper.set(aperture);
    }

    pub fn gripper_aperture(&self) -> Option<i32> {
        self.gripper.aperture()
    }

    fn execute(
        &mut self,
        candidates: &Solutions,
        waypoints: usize,
        bound: &MotionBound,
    ) -> Result<MotionReport, MotionError> {
        let current = self.feedback.joints();
        let selection = self.selector.select(&current, candidates, waypoints).inspect_err(|e| {
            warn!("Motion not started: {}", e);
            self.state = MotionState::Idle;
        })?;
        self.run(&current, selection, bound)
    }

    fn run(&mut self, current: &Joints, selection: Selection, bound: &MotionBound) -> Result<MotionReport, MotionError> {
        let target = selection.target;
        let period = self.config.period();
        let threshold = self.config.joints_error;

        // Stale state of a previous motion must not leak into this one.
        self.filter.reset(current);
        self.state = MotionState::Moving;
        debug!(
            "Following {} waypoint path to {}, filter gain {:.6}",
            selection.path.len(), format_joints(&target), self.filter.gain()
        );

        let started = Instant::now();
        let mut ticks: u64 = 0;
        loop {
            let sample = self.feedback.latest();
            let error = wrapped_error(&target, &sample.joints);
            if error < threshold {
                self.state = MotionState::Converged;
                let elapsed = started.elapsed();
                info!("Converged after {} ticks, {:?}, error {:.5}", ticks, elapsed, error);
                return Ok(MotionReport {
                    target,
                    ticks,
                    elapsed,
                    final_error: error,
                    candidate_index: selection.candidate.index,
                });
            }

            if let Some(expired) = bound.check() {
                self.state = MotionState::Idle;
                let elapsed = started.elapsed();
                warn!("Motion stopped ({:?}) after {:?}, error {:.5}", expired, elapsed, error);
                return Err(match expired {
                    BoundExpired::Deadline => MotionError::TimedOut { elapsed, error },
                    BoundExpired::Cancelled => MotionError::Cancelled { error },
                });
            }

            let setpoint = self.filter.step(&target);
            self.publish(&setpoint, &sample.auxiliary);
            ticks += 1;
            trace!("Tick {} error {:.5}", ticks, error);
            sleep(period);
        }
    }

    fn publish(&self, setpoint: &Joints, auxiliary: &[f64]) {
        if self.config.auxiliary_passthrough {
            let channels = self.config.auxiliary_names.len().min(auxiliary.len());
            let mut command = Vec::with_capacity(6 + channels);
            command.extend_from_slice(setpoint);
            command.extend_from_slice(&auxiliary[..channels]);
            self.actuator.publish_joints(&command);
        } else {
            self.actuator.publish_joints(setpoint);
        }
    }
}
