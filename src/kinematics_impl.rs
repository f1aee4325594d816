use crate::jacobian::geometric_jacobian;
use crate::kinematic_traits::{Joints, Kinematics, Pose};
use crate::parameters::dh_parameters::LinkParameters;
use nalgebra::{Isometry3, Matrix4, Matrix6, Rotation3, Translation3, UnitQuaternion, Vector3};

/// Forward kinematics engine for an arm described by a modified DH table.
#[derive(Debug, Clone, Copy)]
pub struct DhKinematics {
    parameters: LinkParameters,
}

impl DhKinematics {
    /// Creates a new `DhKinematics` instance with the given parameters.
    pub fn new(parameters: LinkParameters) -> Self {
        DhKinematics { parameters }
    }

    pub fn parameters(&self) -> &LinkParameters {
        &self.parameters
    }

    /// Homogeneous transform from frame `joint - 1` to frame `joint` at angle `q`.
    pub fn link_transform(&self, joint: usize, q: f64) -> Matrix4<f64> {
        let p = &self.parameters;
        let (sa, ca) = p.alpha[joint].sin_cos();
        let (st, ct) = q.sin_cos();
        let a = p.a[joint];
        let d = p.d[joint];

        Matrix4::new(
            ct, -st, 0.0, a,
            st * ca, ct * ca, -sa, -sa * d,
            st * sa, ct * sa, ca, ca * d,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Chained homogeneous transforms of all joint frames relative to the base.
    pub fn joint_transforms(&self, qs: &Joints) -> [Matrix4<f64>; 6] {
        let mut frames = [Matrix4::identity(); 6];
        let mut t = Matrix4::identity();
        for (joint, frame) in frames.iter_mut().enumerate() {
            t *= self.link_transform(joint, qs[joint]);
            *frame = t;
        }
        frames
    }
}

/// Converts a rigid homogeneous transform into an isometry.
pub(crate) fn to_pose(t: &Matrix4<f64>) -> Pose {
    let rotation = Rotation3::from_matrix_unchecked(t.fixed_view::<3, 3>(0, 0).into_owned());
    let translation = Vector3::new(t[(0, 3)], t[(1, 3)], t[(2, 3)]);
    Isometry3::from_parts(
        Translation3::from(translation),
        UnitQuaternion::from_rotation_matrix(&rotation),
    )
}

impl Kinematics for DhKinematics {
    fn forward(&self, qs: &Joints) -> Pose {
        let t06 = (0..6).fold(Matrix4::identity(), |t, joint| {
            t * self.link_transform(joint, qs[joint])
        });
        to_pose(&t06)
    }

    fn forward_with_joint_poses(&self, qs: &Joints) -> [Pose; 6] {
        self.joint_transforms(qs).map(|t| to_pose(&t))
    }

    fn jacobian(&self, qs: &Joints) -> Matrix6<f64> {
        geometric_jacobian(&self.forward_with_joint_poses(qs))
    }
}
