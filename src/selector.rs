//! Ranks inverse kinematics candidates and picks the first one with a valid path.

use tracing::{debug, info};

use crate::angles::{snap_to_current, wrapped_error};
use crate::error::MotionError;
use crate::kinematic_traits::{Joints, Solutions};
use crate::path_check::{Path, PathValidator};
use crate::utils::{format_joints, is_valid};

/// IK candidate together with its position in the original candidate set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCandidate {
    pub index: usize,
    pub joints: Joints,
    /// Wrapped distance to the current configuration.
    pub error: f64,
}

/// Sorts the candidates by wrapped distance to the current configuration, closest first.
/// Equal distances keep the original candidate order. Candidates containing NaN or
/// infinite values (infeasible solver branches) are dropped.
pub fn rank_candidates(candidates: &Solutions, current: &Joints) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .enumerate()
        .filter(|(_, joints)| is_valid(joints))
        .map(|(index, joints)| RankedCandidate {
            index,
            joints: *joints,
            error: wrapped_error(joints, current),
        })
        .collect();
    // sort_by is stable, ties stay in index order
    ranked.sort_by(|a, b| a.error.total_cmp(&b.error));
    ranked
}

/// Path chosen for a motion, with the candidate it leads to.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub candidate: RankedCandidate,
    /// Target after joints already at an equivalent angle were snapped to the current value.
    pub target: Joints,
    pub path: Path,
}

/// Ranks candidates, snaps their joints, builds and validates the paths.
pub struct SolutionSelector {
    validator: PathValidator,
    snap_tolerance: f64,
}

impl SolutionSelector {
    pub fn new(validator: PathValidator, snap_tolerance: f64) -> Self {
        SolutionSelector { validator, snap_tolerance }
    }

    pub fn validator(&self) -> &PathValidator {
        &self.validator
    }

    /// Returns the path to the closest candidate whose entire path validates.
    /// Candidates are tried in ranked order; if none validates, the motion is infeasible.
    pub fn select(&self, current: &Joints, candidates: &Solutions, waypoints: usize) -> Result<Selection, MotionError> {
        if waypoints == 0 {
            return Err(MotionError::InvalidWaypointCount(waypoints));
        }
        let ranked = rank_candidates(candidates, current);
        if ranked.is_empty() {
            return Err(MotionError::NoCandidates);
        }
        debug!("{} of {} candidates usable", ranked.len(), candidates.len());

        for candidate in &ranked {
            let target = snap_to_current(&candidate.joints, current, self.snap_tolerance);
            let path = Path::interpolate(current, &target, waypoints)?;
            match self.validator.validate(&path) {
                Ok(()) => {
                    info!(
                        "Selected candidate {} {} at wrapped distance {:.4}",
                        candidate.index, format_joints(&target), candidate.error
                    );
                    return Ok(Selection { candidate: *candidate, target, path });
                }
                Err(rejection) => {
                    debug!("Candidate {} rejected: {}", candidate.index, rejection);
                }
            }
        }
        Err(MotionError::NoFeasiblePath { candidates: ranked.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_by_wrapped_distance() {
        let current = [0.0; 6];
        let candidates = vec![
            [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.1, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.5, 0.0, 0.0, 0.0, 0.0, 0.0],
        ];
        let ranked = rank_candidates(&candidates, &current);
        let order: Vec<usize> = ranked.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_ranking_ties_keep_index_order() {
        let current = [0.0; 6];
        let candidates = vec![
            [0.0, 0.3, 0.0, 0.0, 0.0, 0.0],
            [0.3, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.1],
            [0.0, 0.0, 0.3, 0.0, 0.0, 0.0],
        ];
        for _ in 0..10 {
            let order: Vec<usize> = rank_candidates(&candidates, &current)
                .iter().map(|c| c.index).collect();
            assert_eq!(order, vec![2, 0, 1, 3]);
        }
    }

    #[test]
    fn test_ranking_uses_wrapped_angles() {
        // -π/2 and 3π/2 are the same angle
        let current = [-std::f64::consts::FRAC_PI_2, 0.0, 0.0, 0.0, 0.0, 0.0];
        let candidates = vec![
            [0.2, 0.0, 0.0, 0.0, 0.0, 0.0],
            [3.0 * std::f64::consts::FRAC_PI_2, 0.0, 0.0, 0.0, 0.0, 0.0],
        ];
        let ranked = rank_candidates(&candidates, &current);
        assert_eq!(ranked[0].index, 1);
        assert!(ranked[0].error < 1e-12);
    }

    #[test]
    fn test_ranking_drops_invalid_candidates() {
        let candidates = vec![
            [f64::NAN; 6],
            [0.5, 0.0, 0.0, 0.0, 0.0, 0.0],
        ];
        let ranked = rank_candidates(&candidates, &[0.0; 6]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].index, 1);
    }
}
