//! Output side of the controllers. The wire formats belong to the drivers behind these traits.

use std::sync::Arc;

use crate::base_controller::BaseVelocity;

/// Joint position command channel of the arm.
pub trait ArmActuator: Send {
    /// Ordered values, one per controlled joint, followed by passthrough values for the
    /// channels not under closed loop control.
    fn publish_joints(&self, command: &[f64]);
}

/// Gripper aperture command channel.
pub trait GripperActuator: Send {
    fn publish_aperture(&self, aperture: i32);
}

/// Velocity command channel of the mobile base.
pub trait BaseActuator: Send {
    fn publish_velocity(&self, command: BaseVelocity);
}

/// Lets the owner of a base keep a handle on it while a controller drives it.
impl<T: BaseActuator + Sync> BaseActuator for Arc<T> {
    fn publish_velocity(&self, command: BaseVelocity) {
        self.as_ref().publish_velocity(command)
    }
}
