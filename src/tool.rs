//! Provides tool and base for the arm.
//! Both Tool and Base take arbitrary implementation of Kinematics and are such
//! implementations themselves. Hence, they can be cascaded, like a base holding the arm,
//! that arm holding the gripper. Workspace limits are then checked at the gripper tip,
//! in world coordinates:
//! ```
//! use std::sync::Arc;
//! use nalgebra::{Isometry3, Translation3, UnitQuaternion};
//! use rs_cobot_motion::kinematic_traits::{Joints, Kinematics, Pose};
//! use rs_cobot_motion::kinematics_impl::DhKinematics;
//! use rs_cobot_motion::parameters::dh_parameters::LinkParameters;
//! let arm_alone = DhKinematics::new(LinkParameters::ur5());
//!
//! // Arm mounted on a 0.8 m high support structure
//! let arm_on_support = rs_cobot_motion::tool::Base {
//!   robot: Arc::new(arm_alone),
//!   base: Isometry3::from_parts(Translation3::new(0.0, 0.0, 0.8), UnitQuaternion::identity()),
//! };
//!
//! // Gripper fingertips 0.15 m past the flange
//! let arm_with_gripper = rs_cobot_motion::tool::Tool {
//!   robot: Arc::new(arm_on_support),
//!   tool: Isometry3::from_parts(Translation3::new(0.0, 0.0, 0.15), UnitQuaternion::identity()),
//! };
//!
//! let joints: Joints = [0.0, -1.0, 1.2, -0.2, 1.57, 0.0];
//! let tcp: Pose = arm_with_gripper.forward(&joints);
//! println!("The gripper is at: {:?}", tcp.translation);
//! ```

extern crate nalgebra as na;

use std::sync::Arc;
use na::{Isometry3, Matrix6, Vector3};
use crate::kinematic_traits::{Joints, Kinematics, Pose};

/// Defines the fixed tool that is attached to the flange (joint 6) of the arm.
/// The tool moves with the arm, providing additional translation and, if needed,
/// rotation. The pose of the tool is the pose of its tip (tool center point).
#[derive(Clone)]
pub struct Tool {
    pub robot: Arc<dyn Kinematics>,  // The arm

    /// Transformation from the flange to the tool center point.
    pub tool: Isometry3<f64>,
}

/// Defines the fixed base that holds the arm, placing it at its installed location
/// and, if required, orientation (arms can be installed upside down or tilted).
#[derive(Clone)]
pub struct Base {
    pub robot: Arc<dyn Kinematics>,  // The arm

    /// Transformation from the world origin to the arm base.
    pub base: Isometry3<f64>,
}

impl Kinematics for Tool {
    fn forward(&self, qs: &Joints) -> Pose {
        self.robot.forward(qs) * self.tool
    }

    /// Joint frames are not affected by the tool.
    fn forward_with_joint_poses(&self, qs: &Joints) -> [Pose; 6] {
        self.robot.forward_with_joint_poses(qs)
    }

    /// Jacobian of the tool center point: the angular part is the one of the flange,
    /// the linear part gains the lever arm `w x r` from the flange to the tool tip.
    fn jacobian(&self, qs: &Joints) -> Matrix6<f64> {
        let mut jacobian = self.robot.jacobian(qs);
        let flange = self.robot.forward(qs);
        let lever: Vector3<f64> = flange.rotation * self.tool.translation.vector;
        for i in 0..6 {
            let angular: Vector3<f64> = jacobian.fixed_view::<3, 1>(3, i).into_owned();
            let linear: Vector3<f64> = jacobian.fixed_view::<3, 1>(0, i).into_owned() + angular.cross(&lever);
            jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&linear);
        }
        jacobian
    }
}

impl Kinematics for Base {
    fn forward(&self, joints: &Joints) -> Pose {
        self.base * self.robot.forward(joints)
    }

    fn forward_with_joint_poses(&self, qs: &Joints) -> [Pose; 6] {
        self.robot.forward_with_joint_poses(qs).map(|pose| self.base * pose)
    }

    /// Jacobian in world coordinates, both halves rotated by the base orientation.
    fn jacobian(&self, qs: &Joints) -> Matrix6<f64> {
        let mut jacobian = self.robot.jacobian(qs);
        let rotation = self.base.rotation.to_rotation_matrix();
        for i in 0..6 {
            let linear: Vector3<f64> = rotation * jacobian.fixed_view::<3, 1>(0, i).into_owned();
            let angular: Vector3<f64> = rotation * jacobian.fixed_view::<3, 1>(3, i).into_owned();
            jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&linear);
            jacobian.fixed_view_mut::<3, 1>(3, i).copy_from(&angular);
        }
        jacobian
    }
}
