//! Errors of the motion operations

use std::time::Duration;

use thiserror::Error;

/// Outcome of a motion request that did not complete. Validation failures are
/// reported here rather than aborting the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotionError {
    /// Every candidate path entered the forbidden workspace or passed through a singularity.
    #[error("no feasible path: all {candidates} candidates rejected")]
    NoFeasiblePath { candidates: usize },

    /// The inverse kinematics collaborator returned nothing usable.
    #[error("inverse kinematics returned no valid candidates")]
    NoCandidates,

    #[error("invalid waypoint count: {0}")]
    InvalidWaypointCount(usize),

    /// Deadline passed before the motion converged.
    #[error("motion timed out after {elapsed:?}, remaining error {error:.5}")]
    TimedOut { elapsed: Duration, error: f64 },

    #[error("motion cancelled, remaining error {error:.5}")]
    Cancelled { error: f64 },

    /// Requested target is not a finite value.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
