//! Kinematic motion control for a six axis collaborative arm with a gripper and for the
//! differential drive base carrying it.
//!
//! # Features
//!
//! - Forward kinematics of arms described by a modified Denavit-Hartenberg table, with the
//!   analytic geometric Jacobian used to detect singularities.
//! - Inverse kinematics is pluggable: any solver producing up to eight candidate joint
//!   configurations for a pose can be used. Candidates are ranked by wrapped distance to the
//!   current configuration and the first one with a valid joint space path is taken.
//! - Paths are rejected if any waypoint puts the end effector into a forbidden workspace
//!   volume or comes too close to a singularity.
//! - The arm controller follows the chosen path through two cascaded low pass stages at a
//!   fixed loop rate, until the joint feedback converges. Motions can optionally be bounded
//!   by a deadline or cancelled from another thread.
//! - The base is driven by a feedback linearization law for unicycle tracking, with
//!   straight line and in place rotation primitives built on it.
//! - The arm can be placed on a base and equipped with a tool, checking the workspace at the
//!   tool center point.
//! - YAML configuration and a small command line tool running the controllers in simulation.
//!
//! # Parameters
//!
//! The arm geometry is given as `LinkParameters` (the `alpha`, `a` and `d` columns of the
//! modified DH table). `LinkParameters::ur5()` describes the Universal Robots UR5.

pub mod parameters;
pub mod parameters_robots;

#[path = "utils/utils.rs"]
pub mod utils;
pub mod angles;
pub mod kinematic_traits;
pub mod kinematics_impl;

pub mod tool;

pub mod jacobian;

pub mod workspace;
pub mod path_check;
pub mod selector;

pub mod error;
pub mod parameter_error;

pub mod config;
#[cfg(feature = "allow_filesystem")]
pub mod config_from_file;

pub mod feedback;
pub mod actuators;
pub mod motion_bound;
pub mod filter;
pub mod gripper;
pub mod arm_controller;

pub mod base_controller;
pub mod base_motion;

pub mod simulation;

#[cfg(feature = "collisions")]
pub mod collisions;

#[cfg(test)]
mod tests;
