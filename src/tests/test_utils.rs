//! Shared fixtures of the scenario tests.

use std::sync::Arc;
use std::time::Duration;

use nalgebra::{Rotation3, Translation3, UnitQuaternion};

use crate::angles::euler_to_rotation;
use crate::arm_controller::ArmController;
use crate::config::ArmControllerConfig;
use crate::feedback::feedback_channel;
use crate::kinematic_traits::{InverseKinematics, Joints, Kinematics, Pose, Solutions};
use crate::path_check::PathValidator;
use crate::simulation::SimulatedArm;
use crate::workspace::Workspace;

/// Three prismatic axes followed by three rotations. The end effector position is the
/// first three joint values, so forbidden volumes can be placed exactly on the path.
/// Not singular unless the pitch (J5) reaches ±π/2.
pub(crate) struct CartesianRobot;

impl Kinematics for CartesianRobot {
    fn forward(&self, qs: &Joints) -> Pose {
        let rotation = Rotation3::from_matrix_unchecked(euler_to_rotation(qs[3], qs[4], qs[5]));
        Pose::from_parts(
            Translation3::new(qs[0], qs[1], qs[2]),
            UnitQuaternion::from_rotation_matrix(&rotation),
        )
    }

    fn forward_with_joint_poses(&self, qs: &Joints) -> [Pose; 6] {
        [self.forward(qs); 6]
    }
}

/// Exact inverse of [CartesianRobot].
pub(crate) fn cartesian_inverse(pose: &Pose) -> Solutions {
    let p = pose.translation.vector;
    // nalgebra returns (about x, about y, about z) of Rz * Ry * Rx
    let (about_x, about_y, about_z) = pose.rotation.euler_angles();
    vec![[p.x, p.y, p.z, about_z, about_y, about_x]]
}

/// Converges within a few ticks against a simulated arm: filter gain 0.5 at 1 kHz.
pub(crate) fn fast_config() -> ArmControllerConfig {
    ArmControllerConfig {
        loop_frequency: 1000.0,
        settling_time: 0.01,
        gripper_settle: Duration::ZERO,
        ..Default::default()
    }
}

pub(crate) struct Rig {
    pub controller: ArmController,
    pub arm: SimulatedArm,
}

pub(crate) fn simulated_rig(
    kinematics: Arc<dyn Kinematics>,
    workspace: Workspace,
    solver: Arc<dyn InverseKinematics>,
    start: &Joints,
    config: ArmControllerConfig,
) -> Rig {
    let (writer, reader) = feedback_channel(config.name_map());
    let arm = SimulatedArm::new(writer, start);
    let validator = PathValidator::new(kinematics, workspace, config.singularity);
    let controller = ArmController::new(
        config,
        validator,
        solver,
        Box::new(arm.clone()),
        Box::new(arm.clone()),
        reader,
    )
    .expect("test configuration must be valid");
    Rig { controller, arm }
}

/// Cartesian test robot with no forbidden volumes.
pub(crate) fn cartesian_rig(start: &Joints) -> Rig {
    simulated_rig(
        Arc::new(CartesianRobot),
        Workspace::new(),
        Arc::new(cartesian_inverse),
        start,
        fast_config(),
    )
}

pub(crate) fn assert_joints_near(actual: &Joints, expected: &Joints, tolerance: f64) {
    for i in 0..6 {
        assert!(
            (actual[i] - expected[i]).abs() <= tolerance,
            "J{}: {} vs expected {} (tolerance {})",
            i + 1, actual[i], expected[i], tolerance
        );
    }
}
