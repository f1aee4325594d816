//! Timed gripper actuation. The gripper has no feedback; every command is followed
//! by a fixed wait long enough for the mechanism to settle.

use std::thread::sleep;
use std::time::Duration;

use tracing::info;

use crate::actuators::GripperActuator;

pub struct GripperSequencer {
    actuator: Box<dyn GripperActuator>,
    settle: Duration,
    aperture: Option<i32>,
}

impl GripperSequencer {
    pub fn new(actuator: Box<dyn GripperActuator>, settle: Duration) -> Self {
        GripperSequencer { actuator, settle, aperture: None }
    }

    /// Publishes the aperture, then blocks for the settle time.
    pub fn set(&mut self, aperture: i32) {
        info!("Gripper aperture {}, settling for {:?}", aperture, self.settle);
        self.actuator.publish_aperture(aperture);
        self.aperture = Some(aperture);
        if !self.settle.is_zero() {
            sleep(self.settle);
        }
    }

    /// Last commanded aperture, None if never commanded.
    pub fn aperture(&self) -> Option<i32> {
        self.aperture
    }
}
