//! Simulated actuators for running the controllers without hardware. The simulated arm
//! reaches every commanded configuration instantly; the simulated base integrates the
//! unicycle model over the command period.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::actuators::{ArmActuator, BaseActuator, GripperActuator};
use crate::base_controller::{BaseVelocity, Pose2D};
use crate::feedback::{FeedbackWriter, OdometryWriter};
use crate::kinematic_traits::Joints;

struct ArmState {
    feedback: FeedbackWriter,
    last_command: Mutex<Option<Vec<f64>>>,
    aperture: Mutex<Option<i32>>,
    commands: AtomicU64,
}

/// Arm that echoes every command into its joint feedback. Clones share the same arm,
/// so one clone can serve as the joint actuator and another as the gripper.
#[derive(Clone)]
pub struct SimulatedArm {
    state: Arc<ArmState>,
}

impl SimulatedArm {
    /// Takes ownership of the feedback writer, the simulated arm becomes the only source of feedback.
    pub fn new(feedback: FeedbackWriter, initial: &Joints) -> Self {
        feedback.set_joints(initial);
        SimulatedArm {
            state: Arc::new(ArmState {
                feedback,
                last_command: Mutex::new(None),
                aperture: Mutex::new(None),
                commands: AtomicU64::new(0),
            }),
        }
    }

    /// Number of joint commands received so far.
    pub fn commands(&self) -> u64 {
        self.state.commands.load(Ordering::Acquire)
    }

    pub fn last_command(&self) -> Option<Vec<f64>> {
        self.state.last_command.lock().clone()
    }

    pub fn aperture(&self) -> Option<i32> {
        *self.state.aperture.lock()
    }

    /// Moves the arm as if by an external force, e.g. to set up a test.
    pub fn place(&self, joints: &Joints) {
        self.state.feedback.set_joints(joints);
    }
}

impl ArmActuator for SimulatedArm {
    fn publish_joints(&self, command: &[f64]) {
        if command.len() >= 6 {
            let joints: Joints = std::array::from_fn(|i| command[i]);
            self.state.feedback.set_joints(&joints);
        }
        *self.state.last_command.lock() = Some(command.to_vec());
        self.state.commands.fetch_add(1, Ordering::AcqRel);
    }
}

impl GripperActuator for SimulatedArm {
    fn publish_aperture(&self, aperture: i32) {
        *self.state.aperture.lock() = Some(aperture);
    }
}

/// Differential drive base. Every velocity command is applied for one control period,
/// then the new pose is written to the odometry.
pub struct SimulatedBase {
    odometry: OdometryWriter,
    pose: Mutex<Pose2D>,
    dt: f64,
    commands: AtomicU64,
}

impl SimulatedBase {
    pub fn new(odometry: OdometryWriter, initial: Pose2D, dt: f64) -> Self {
        odometry.update(initial);
        SimulatedBase {
            odometry,
            pose: Mutex::new(initial),
            dt,
            commands: AtomicU64::new(0),
        }
    }

    pub fn pose(&self) -> Pose2D {
        *self.pose.lock()
    }

    pub fn commands(&self) -> u64 {
        self.commands.load(Ordering::Acquire)
    }
}

impl BaseActuator for SimulatedBase {
    fn publish_velocity(&self, command: BaseVelocity) {
        let mut pose = self.pose.lock();
        // Midpoint heading keeps arcs accurate at large periods.
        let heading = pose.theta + command.angular * self.dt / 2.0;
        pose.x += command.linear * heading.cos() * self.dt;
        pose.y += command.linear * heading.sin() * self.dt;
        pose.theta += command.angular * self.dt;
        self.odometry.update(*pose);
        self.commands.fetch_add(1, Ordering::AcqRel);
    }
}
