//! Defines the kinematic vocabulary shared by all parts of the crate

extern crate nalgebra as na;

use na::{Isometry3, Matrix3, Matrix6, Rotation3, Translation3, UnitQuaternion, Vector3};

use crate::jacobian::compute_jacobian;

/// Pose is used a pose of the robot tcp. It contains both Cartesian position and rotation quaternion
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// // The quaternion should be normalized to represent a valid rotation.
/// let rotation = UnitQuaternion::from_quaternion(na::Quaternion::new(1.0, 0.0, 0.0, 1.0).normalize());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Rotations of the six arm joints, in radians.
pub type Joints = [f64; 6];

/// Inverse kinematics may return up to 8 candidate joint configurations for one pose.
pub type Solutions = Vec<Joints>;

/// All joints at zero
pub const JOINTS_AT_ZERO: Joints = [0.0; 6];

/// Maximal number of candidates the analytic solvers of 6 axis arms produce.
pub const MAX_CANDIDATES: usize = 8;

/// Forward kinematics of the arm. Implementations must be pure functions of the joint
/// values so they can be evaluated for many waypoints in parallel.
pub trait Kinematics: Send + Sync {
    /// Pose of the end effector for the given joint configuration.
    fn forward(&self, qs: &Joints) -> Pose;

    /// Poses of all six joint frames, the last one being the end effector flange.
    fn forward_with_joint_poses(&self, qs: &Joints) -> [Pose; 6];

    /// Velocity Jacobian, 3 position rows followed by 3 orientation rows.
    /// The default implementation differentiates `forward` numerically.
    fn jacobian(&self, qs: &Joints) -> Matrix6<f64> {
        compute_jacobian(self, qs, 1e-6)
    }
}

/// Inverse kinematics collaborator: any component producing up to [MAX_CANDIDATES]
/// joint configurations for a target pose. Infeasible branches are simply not returned.
pub trait InverseKinematics: Send + Sync {
    fn inverse(&self, pose: &Pose) -> Solutions;
}

/// Closures and function pointers can serve as solvers directly.
impl<F> InverseKinematics for F
where
    F: Fn(&Pose) -> Solutions + Send + Sync,
{
    fn inverse(&self, pose: &Pose) -> Solutions {
        self(pose)
    }
}

/// Builds the arm pose from the Cartesian position and the 3x3 rotation matrix,
/// as requested by the task sequencer.
pub fn pose_from_parts(position: &Vector3<f64>, rotation: &Matrix3<f64>) -> Pose {
    let rotation = Rotation3::from_matrix_unchecked(*rotation);
    Pose::from_parts(
        Translation3::from(*position),
        UnitQuaternion::from_rotation_matrix(&rotation),
    )
}
