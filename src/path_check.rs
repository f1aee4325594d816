//! Joint space path generation and validation.
//!
//! A path is a straight line in joint space from the current configuration to the
//! target, sampled at a caller given number of waypoints. It is accepted only if every
//! waypoint keeps the end effector out of the forbidden workspace and stays away from
//! kinematic singularities.

use std::fmt;
use std::sync::Arc;

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::error::MotionError;
use crate::jacobian::Jacobian;
use crate::kinematic_traits::{Joints, Kinematics};
use crate::workspace::Workspace;

/// Ordered waypoints from the start to the target configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub waypoints: Vec<Joints>,
}

impl Path {
    /// Interpolates `n` waypoints linearly, both ends included.
    /// A single waypoint path contains only the target.
    pub fn interpolate(from: &Joints, to: &Joints, n: usize) -> Result<Path, MotionError> {
        if n == 0 {
            return Err(MotionError::InvalidWaypointCount(n));
        }
        if n == 1 {
            return Ok(Path { waypoints: vec![*to] });
        }
        let last = (n - 1) as f64;
        let waypoints = (0..n)
            .map(|k| match k {
                0 => *from,
                k if k == n - 1 => *to,
                k => {
                    let s = k as f64 / last;
                    std::array::from_fn(|j| from[j] + (to[j] - from[j]) * s)
                }
            })
            .collect();
        Ok(Path { waypoints })
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn start(&self) -> Option<&Joints> {
        self.waypoints.first()
    }

    pub fn target(&self) -> Option<&Joints> {
        self.waypoints.last()
    }
}

/// Thresholds under which a configuration counts as singular. Zero disables the test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingularityLimits {
    /// Minimal allowed absolute value of the Jacobian determinant.
    pub min_determinant: f64,
    /// Minimal allowed singular value of the Jacobian.
    pub min_singular_value: f64,
}

impl SingularityLimits {
    pub const DISABLED: SingularityLimits = SingularityLimits {
        min_determinant: 0.0,
        min_singular_value: 0.0,
    };

    pub fn is_singular(&self, jacobian: &Jacobian) -> Option<(f64, f64)> {
        let determinant = jacobian.determinant();
        let min_singular_value = if self.min_singular_value > 0.0 {
            jacobian.min_singular_value()
        } else {
            f64::INFINITY
        };
        if determinant.abs() < self.min_determinant || min_singular_value < self.min_singular_value {
            Some((determinant, min_singular_value))
        } else {
            None
        }
    }
}

impl Default for SingularityLimits {
    fn default() -> Self {
        SingularityLimits {
            min_determinant: 1e-7,
            min_singular_value: 1e-5,
        }
    }
}

/// Why a waypoint was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// End effector inside a forbidden volume.
    Workspace { position: Vector3<f64> },
    /// Too close to a kinematic singularity.
    Singular { determinant: f64, min_singular_value: f64 },
}

/// First offending waypoint of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRejection {
    pub waypoint: usize,
    pub reason: RejectionReason,
}

impl fmt::Display for PathRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            RejectionReason::Workspace { position } => write!(
                f, "waypoint {}: end effector at ({:.3}, {:.3}, {:.3}) is in forbidden workspace",
                self.waypoint, position.x, position.y, position.z
            ),
            RejectionReason::Singular { determinant, min_singular_value } => write!(
                f, "waypoint {}: singular (det {:.3e}, min singular value {:.3e})",
                self.waypoint, determinant, min_singular_value
            ),
        }
    }
}

/// Checks paths against the workspace and the singularity limits.
pub struct PathValidator {
    kinematics: Arc<dyn Kinematics>,
    workspace: Workspace,
    singularity: SingularityLimits,
}

impl PathValidator {
    pub fn new(kinematics: Arc<dyn Kinematics>, workspace: Workspace, singularity: SingularityLimits) -> Self {
        PathValidator { kinematics, workspace, singularity }
    }

    pub fn kinematics(&self) -> &Arc<dyn Kinematics> {
        &self.kinematics
    }

    /// Checks a single configuration.
    pub fn check_waypoint(&self, qs: &Joints) -> Result<(), RejectionReason> {
        let position = self.kinematics.forward(qs).translation.vector;
        if self.workspace.is_forbidden(&position) {
            return Err(RejectionReason::Workspace { position });
        }
        let jacobian = Jacobian::new(self.kinematics.as_ref(), qs);
        if let Some((determinant, min_singular_value)) = self.singularity.is_singular(&jacobian) {
            return Err(RejectionReason::Singular { determinant, min_singular_value });
        }
        Ok(())
    }

    /// Validates all waypoints. These checks are done in parallel; the rejection
    /// reported is the first offending waypoint in path order.
    pub fn validate(&self, path: &Path) -> Result<(), PathRejection> {
        let rejection = path
            .waypoints
            .par_iter()
            .enumerate()
            .map(|(waypoint, qs)| {
                self.check_waypoint(qs)
                    .err()
                    .map(|reason| PathRejection { waypoint, reason })
            })
            .find_first(|rejection| rejection.is_some())
            .flatten();

        match rejection {
            Some(rejection) => Err(rejection),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_includes_both_ends() {
        let from = [0.0; 6];
        let to = [1.0, -2.0, 0.0, 0.5, 0.0, 4.0];
        let path = Path::interpolate(&from, &to, 5).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.start(), Some(&from));
        assert_eq!(path.target(), Some(&to));
        assert_eq!(path.waypoints[2], [0.5, -1.0, 0.0, 0.25, 0.0, 2.0]);
    }

    #[test]
    fn test_interpolate_edge_counts() {
        let to = [1.0; 6];
        assert_eq!(Path::interpolate(&[0.0; 6], &to, 1).unwrap().waypoints, vec![to]);
        assert!(matches!(
            Path::interpolate(&[0.0; 6], &to, 0),
            Err(MotionError::InvalidWaypointCount(0))
        ));
    }

    #[test]
    fn test_disabled_limits_accept_singular() {
        let jacobian = Jacobian::from_matrix(nalgebra::Matrix6::zeros());
        assert!(SingularityLimits::DISABLED.is_singular(&jacobian).is_none());
        assert!(SingularityLimits::default().is_singular(&jacobian).is_some());
        let identity = Jacobian::from_matrix(nalgebra::Matrix6::identity());
        assert!(SingularityLimits::default().is_singular(&identity).is_none());
    }
}
