#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;
    use std::sync::Arc;

    use nalgebra::Vector3;

    use crate::angles::euler_to_rotation;
    use crate::arm_controller::MotionState;
    use crate::error::MotionError;
    use crate::kinematic_traits::{Joints, Kinematics, Pose, Solutions, JOINTS_AT_ZERO};
    use crate::kinematics_impl::DhKinematics;
    use crate::parameters::dh_parameters::LinkParameters;
    use crate::path_check::{Path, PathValidator, RejectionReason, SingularityLimits};
    use crate::selector::SolutionSelector;
    use crate::tests::test_utils::{assert_joints_near, cartesian_rig, fast_config, simulated_rig, CartesianRobot};
    use crate::workspace::{AxisAlignedBox, Workspace};

    fn cartesian_selector(workspace: Workspace) -> SolutionSelector {
        let validator = PathValidator::new(Arc::new(CartesianRobot), workspace, SingularityLimits::default());
        SolutionSelector::new(validator, 0.01)
    }

    #[test]
    fn test_small_move_interpolates_without_snapping() {
        let selector = cartesian_selector(Workspace::new());
        let current = JOINTS_AT_ZERO;
        let candidates: Solutions = vec![[0.02, 0.0, 0.0, 0.0, 0.0, 0.0]];

        let selection = selector.select(&current, &candidates, 5).unwrap();
        assert_eq!(selection.target, candidates[0]);
        assert_eq!(selection.path.len(), 5);
        for (k, waypoint) in selection.path.waypoints.iter().enumerate() {
            let expected = 0.02 * k as f64 / 4.0;
            assert!((waypoint[0] - expected).abs() < 1e-15, "waypoint {}: {}", k, waypoint[0]);
            assert!(waypoint[1..].iter().all(|&q| q == 0.0));
        }
    }

    #[test]
    fn test_wrap_equal_joint_is_not_turned_around() {
        let selector = cartesian_selector(Workspace::new());
        let current = [0.0, 0.0, 0.0, 0.0, 0.0, TAU - 0.005];
        // Same J6 angle expressed one turn lower, J1 really moves.
        let candidates: Solutions = vec![[0.05, 0.0, 0.0, 0.0, 0.0, -0.001]];

        let selection = selector.select(&current, &candidates, 10).unwrap();
        assert_eq!(selection.target[5], current[5]);
        assert_eq!(selection.target[0], 0.05);
        assert!(selection.path.waypoints.iter().all(|q| q[5] == current[5]));
    }

    #[test]
    fn test_forbidden_volume_rejects_path_and_shrunk_volume_accepts() {
        let from = JOINTS_AT_ZERO;
        let to = [0.2, 0.0, 0.0, 0.0, 0.0, 0.0];
        let path = Path::interpolate(&from, &to, 11).unwrap();

        // Covers the waypoints at x = 0.10 and x = 0.12
        let obstacle = AxisAlignedBox::around(Vector3::new(0.11, 0.0, 0.0), Vector3::new(0.015, 0.015, 0.015));
        let blocked = PathValidator::new(
            Arc::new(CartesianRobot),
            Workspace::new().with_volume(obstacle),
            SingularityLimits::default(),
        );
        let rejection = blocked.validate(&path).unwrap_err();
        assert_eq!(rejection.waypoint, 5);
        assert!(matches!(rejection.reason, RejectionReason::Workspace { .. }));

        // Shrunk to fall between the waypoints
        let free = PathValidator::new(
            Arc::new(CartesianRobot),
            Workspace::new().with_volume(obstacle.shrunk(0.25)),
            SingularityLimits::default(),
        );
        assert_eq!(free.validate(&path), Ok(()));
    }

    #[cfg(feature = "collisions")]
    #[test]
    fn test_shape_volume_rejects_path() {
        use crate::collisions::ShapeVolume;
        use nalgebra::Isometry3;
        use parry3d::shape::SharedShape;

        let path = Path::interpolate(&JOINTS_AT_ZERO, &[0.2, 0.0, 0.0, 0.0, 0.0, 0.0], 11).unwrap();
        let ball = ShapeVolume::new(SharedShape::ball(0.015), Isometry3::translation(0.11, 0.0, 0.0));
        let validator = PathValidator::new(
            Arc::new(CartesianRobot),
            Workspace::new().with_volume(ball),
            SingularityLimits::default(),
        );
        let rejection = validator.validate(&path).unwrap_err();
        assert_eq!(rejection.waypoint, 5);

        // The same pillar the arm stands on, well away from the path
        let pillar = ShapeVolume::pillar(Vector3::new(0.0, 0.5, -1.0), 0.05, 2.0);
        let validator = PathValidator::new(
            Arc::new(CartesianRobot),
            Workspace::new().with_volume(pillar),
            SingularityLimits::default(),
        );
        assert_eq!(validator.validate(&path), Ok(()));
    }

    #[test]
    fn test_blocked_candidate_falls_back_to_next() {
        let obstacle = AxisAlignedBox::around(Vector3::new(0.05, 0.0, 0.0), Vector3::new(0.01, 0.01, 0.01));
        let selector = cartesian_selector(Workspace::new().with_volume(obstacle));
        let candidates: Solutions = vec![
            [-0.3, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.1, 0.0, 0.0, 0.0, 0.0, 0.0], // closest, but through the obstacle
        ];
        let selection = selector.select(&JOINTS_AT_ZERO, &candidates, 21).unwrap();
        assert_eq!(selection.candidate.index, 0);
        assert_eq!(selection.target, candidates[0]);
    }

    #[test]
    fn test_path_through_wrist_singularity_rejected() {
        let ur5: Arc<dyn Kinematics> = Arc::new(DhKinematics::new(LinkParameters::ur5()));
        let validator = PathValidator::new(ur5, Workspace::new(), SingularityLimits::default());

        let from = [0.0, -1.0, 1.2, -0.2, 1.57, 0.0];
        let to = [0.0, -1.0, 1.2, -0.2, -1.57, 0.0];
        // J5 crosses zero at the middle waypoint
        let path = Path::interpolate(&from, &to, 21).unwrap();
        let rejection = validator.validate(&path).unwrap_err();
        assert_eq!(rejection.waypoint, 10);
        assert!(matches!(rejection.reason, RejectionReason::Singular { .. }));

        // Staying on one side of the singularity is fine.
        let to = [0.3, -1.5, 1.0, 0.5, 1.0, -0.4];
        assert_eq!(validator.validate(&Path::interpolate(&from, &to, 21).unwrap()), Ok(()));
    }

    #[test]
    fn test_move_to_joints_converges() {
        let mut rig = cartesian_rig(&JOINTS_AT_ZERO);
        assert_eq!(rig.controller.state(), MotionState::Idle);

        let target = [0.02, -0.01, 0.03, 0.1, 0.0, -0.2];
        let report = rig.controller.move_to_joints(&target, 20).unwrap();

        assert_eq!(rig.controller.state(), MotionState::Converged);
        assert_eq!(report.target, target);
        assert_eq!(report.candidate_index, 0);
        assert!(report.final_error < 0.005);
        assert!(report.ticks > 0);
        assert_eq!(rig.arm.commands(), report.ticks);
        assert_joints_near(&rig.controller.get_joint_state(), &target, 0.005);
    }

    #[test]
    fn test_move_to_pose() {
        let start: Joints = [0.0, 0.0, 0.3, 0.0, 0.0, 0.0];
        let mut rig = cartesian_rig(&start);

        let position = Vector3::new(0.05, -0.02, 0.25);
        let rotation = euler_to_rotation(0.2, -0.1, 0.05);
        let report = rig.controller.move_to(&position, &rotation, 20).unwrap();
        assert_joints_near(&report.target, &[0.05, -0.02, 0.25, 0.2, -0.1, 0.05], 1e-9);

        let reached: Pose = rig.controller.kinematics().forward(&rig.controller.get_joint_state());
        assert!((reached.translation.vector - position).norm() < 0.005);
    }

    #[test]
    fn test_infeasible_motion_commands_nothing() {
        let start: Joints = JOINTS_AT_ZERO;
        let obstacle = AxisAlignedBox::around(Vector3::new(0.1, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        let candidates = vec![[0.2, 0.0, 0.0, 0.0, 0.0, 0.0], [0.0, 0.3, 0.0, 0.0, 0.0, 0.0]];
        let solver = move |_: &Pose| -> Solutions { candidates.clone() };
        let mut rig = simulated_rig(
            Arc::new(CartesianRobot),
            Workspace::new().with_volume(obstacle),
            Arc::new(solver),
            &start,
            fast_config(),
        );

        let result = rig.controller.move_to(&Vector3::new(0.2, 0.0, 0.0), &euler_to_rotation(0.0, 0.0, 0.0), 20);
        assert_eq!(result, Err(MotionError::NoFeasiblePath { candidates: 2 }));
        assert_eq!(rig.controller.state(), MotionState::Idle);
        assert_eq!(rig.arm.commands(), 0);
        assert_eq!(rig.controller.get_joint_state(), start);
    }

    #[test]
    fn test_solver_without_candidates() {
        let mut rig = simulated_rig(
            Arc::new(CartesianRobot),
            Workspace::new(),
            Arc::new(|_: &Pose| -> Solutions { vec![[f64::NAN; 6]] }),
            &JOINTS_AT_ZERO,
            fast_config(),
        );
        let result = rig.controller.move_to(&Vector3::new(5.0, 0.0, 0.0), &euler_to_rotation(0.0, 0.0, 0.0), 20);
        assert_eq!(result, Err(MotionError::NoCandidates));
        assert_eq!(rig.arm.commands(), 0);
    }

    #[test]
    fn test_already_at_target_publishes_nothing() {
        let start = [0.01, 0.0, 0.0, 0.0, 0.0, 0.0];
        let mut rig = cartesian_rig(&start);
        let report = rig.controller.move_to_joints(&start, 20).unwrap();
        assert_eq!(report.ticks, 0);
        assert_eq!(rig.arm.commands(), 0);
        assert_eq!(rig.controller.state(), MotionState::Converged);
    }

    #[test]
    fn test_zero_waypoints_rejected() {
        let mut rig = cartesian_rig(&JOINTS_AT_ZERO);
        let result = rig.controller.move_to_joints(&[0.1, 0.0, 0.0, 0.0, 0.0, 0.0], 0);
        assert_eq!(result, Err(MotionError::InvalidWaypointCount(0)));
        assert_eq!(rig.arm.commands(), 0);
    }

    #[test]
    fn test_gripper() {
        let mut rig = cartesian_rig(&JOINTS_AT_ZERO);
        assert_eq!(rig.controller.gripper_aperture(), None);
        rig.controller.set_gripper(70);
        assert_eq!(rig.controller.gripper_aperture(), Some(70));
        assert_eq!(rig.arm.aperture(), Some(70));
        assert_eq!(rig.arm.commands(), 0);
    }
}
