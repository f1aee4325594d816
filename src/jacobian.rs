extern crate nalgebra as na;
use na::{Matrix6, Vector3, Vector6};
use na::linalg::SVD;
use rayon::prelude::*;
use crate::kinematic_traits::{Joints, Kinematics, Pose};

/// Velocity Jacobian of the arm at one configuration. Column i is the end effector
/// twist (linear over angular) produced by a unit velocity of joint i.
pub struct Jacobian {
    matrix: Matrix6<f64>,
}

impl Jacobian {
    /// Jacobian of the robot at `qs`: analytic if the robot overrides
    /// [Kinematics::jacobian], numeric otherwise.
    pub fn new<K: Kinematics + ?Sized>(robot: &K, qs: &Joints) -> Self {
        Self { matrix: robot.jacobian(qs) }
    }

    pub fn from_matrix(matrix: Matrix6<f64>) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &Matrix6<f64> {
        &self.matrix
    }

    /// Determinant, zero at a kinematic singularity.
    pub fn determinant(&self) -> f64 {
        self.matrix.determinant()
    }

    /// Smallest singular value, measures how close the arm is to losing a direction of motion.
    pub fn min_singular_value(&self) -> f64 {
        let svd = SVD::new(self.matrix, false, false);
        svd.singular_values.min()
    }
}

/// Geometric Jacobian from the joint frame poses: column i is `[z_i x (p_e - o_i); z_i]`
/// where `z_i` is the axis of joint i, `o_i` a point on it and `p_e` the end effector.
pub fn geometric_jacobian(joint_poses: &[Pose; 6]) -> Matrix6<f64> {
    let mut jacobian = Matrix6::zeros();
    let end_effector = joint_poses[5].translation.vector;

    for (i, pose) in joint_poses.iter().enumerate() {
        let axis: Vector3<f64> = pose.rotation * Vector3::z();
        let origin = pose.translation.vector;
        let linear = axis.cross(&(end_effector - origin));
        jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&linear);
        jacobian.fixed_view_mut::<3, 1>(3, i).copy_from(&axis);
    }
    jacobian
}

/// Finite difference Jacobian: every joint is moved by `epsilon` on its own and the
/// change of the end effector pose is taken as that joint's column. The six forward
/// evaluations run in parallel. Rotation is the scaled axis of the orientation change.
pub fn compute_jacobian<K: Kinematics + ?Sized>(robot: &K, joints: &Joints, epsilon: f64) -> Matrix6<f64> {
    let reference = robot.forward(joints);
    let columns: Vec<Vector6<f64>> = (0..6)
        .into_par_iter()
        .map(|joint| {
            let mut moved = *joints;
            moved[joint] += epsilon;
            let pose = robot.forward(&moved);
            let linear = (pose.translation.vector - reference.translation.vector) / epsilon;
            let angular = (pose.rotation * reference.rotation.inverse()).scaled_axis() / epsilon;
            Vector6::new(linear.x, linear.y, linear.z, angular.x, angular.y, angular.z)
        })
        .collect();
    Matrix6::from_columns(&columns)
}
