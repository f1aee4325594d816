//! Controller configuration. Values are set at construction and stay fixed for the
//! lifetime of the controller.

use std::time::Duration;

use nalgebra::Vector3;

use crate::base_controller::UnicycleController;
use crate::error::MotionError;
use crate::feedback::{JointNameMap, UR5_AUXILIARY_NAMES, UR5_JOINT_NAMES};
use crate::parameters::dh_parameters::LinkParameters;
use crate::path_check::SingularityLimits;
use crate::workspace::{AxisAlignedBox, HalfSpace, Workspace};

#[derive(Debug, Clone, PartialEq)]
pub struct ArmControllerConfig {
    /// Control tick rate, Hz.
    pub loop_frequency: f64,
    /// Wrapped error norm under which the motion is converged.
    pub joints_error: f64,
    /// Filter time constant, seconds. Larger is slower and smoother.
    pub settling_time: f64,
    /// Target joints this close to the current angle are not moved.
    pub snap_tolerance: f64,
    /// Default number of path waypoints.
    pub waypoints: usize,
    /// Wait after every gripper command.
    pub gripper_settle: Duration,
    pub singularity: SingularityLimits,
    /// Feedback names of the six controlled joints, in axis order.
    pub joint_names: Vec<String>,
    /// Feedback names of the gripper fingers.
    pub auxiliary_names: Vec<String>,
    /// Append the latest auxiliary readings to every joint command.
    pub auxiliary_passthrough: bool,
}

impl Default for ArmControllerConfig {
    fn default() -> Self {
        ArmControllerConfig {
            loop_frequency: 1000.0,
            joints_error: 0.005,
            settling_time: 10.0,
            snap_tolerance: crate::angles::SNAP_TOLERANCE,
            waypoints: 20,
            gripper_settle: Duration::from_secs(2),
            singularity: SingularityLimits::default(),
            joint_names: UR5_JOINT_NAMES.iter().map(|s| s.to_string()).collect(),
            auxiliary_names: UR5_AUXILIARY_NAMES.iter().map(|s| s.to_string()).collect(),
            auxiliary_passthrough: false,
        }
    }
}

impl ArmControllerConfig {
    /// Tick period in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.loop_frequency
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(self.dt())
    }

    pub fn name_map(&self) -> JointNameMap {
        JointNameMap::new(&self.joint_names, &self.auxiliary_names)
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        check_frequency("arm loop_frequency", self.loop_frequency)?;
        check_non_negative("joints_error", self.joints_error)?;
        check_non_negative("settling_time", self.settling_time)?;
        check_non_negative("snap_tolerance", self.snap_tolerance)?;
        check_non_negative("min_determinant", self.singularity.min_determinant)?;
        check_non_negative("min_singular_value", self.singularity.min_singular_value)?;
        if self.joints_error == 0.0 {
            return Err(MotionError::InvalidConfig("joints_error must be positive".into()));
        }
        if self.waypoints == 0 {
            return Err(MotionError::InvalidWaypointCount(0));
        }
        if self.joint_names.len() != 6 {
            return Err(MotionError::InvalidConfig(format!(
                "expected 6 joint names, found {}", self.joint_names.len()
            )));
        }
        if self.auxiliary_names.len() > crate::feedback::AUXILIARY_COUNT {
            return Err(MotionError::InvalidConfig(format!(
                "at most {} auxiliary names supported, found {}",
                crate::feedback::AUXILIARY_COUNT, self.auxiliary_names.len()
            )));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> String {
        format!(
            "arm:\n  \
            loop_frequency: {}\n  \
            joints_error: {}\n  \
            settling_time: {}\n  \
            snap_tolerance: {}\n  \
            waypoints: {}\n  \
            gripper_settle: {}\n  \
            min_determinant: {}\n  \
            min_singular_value: {}\n  \
            joint_names: [{}]\n  \
            auxiliary_names: [{}]\n  \
            auxiliary_passthrough: {}\n",
            self.loop_frequency,
            self.joints_error,
            self.settling_time,
            self.snap_tolerance,
            self.waypoints,
            self.gripper_settle.as_secs_f64(),
            self.singularity.min_determinant,
            self.singularity.min_singular_value,
            self.joint_names.join(", "),
            self.auxiliary_names.join(", "),
            self.auxiliary_passthrough,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaseControllerConfig {
    pub kp: f64,
    pub kth: f64,
    /// Control tick rate of the base primitives, Hz.
    pub loop_frequency: f64,
    /// Reference speed of straight line motions, m/s.
    pub linear_speed: f64,
    /// Reference speed of in place rotations, rad/s.
    pub angular_speed: f64,
    /// Position error, m, under which a straight line motion is complete.
    pub position_tolerance: f64,
    /// Heading error, rad, under which a rotation is complete.
    pub heading_tolerance: f64,
}

impl Default for BaseControllerConfig {
    fn default() -> Self {
        BaseControllerConfig {
            kp: 0.5,
            kth: 0.5,
            loop_frequency: 100.0,
            linear_speed: 0.2,
            angular_speed: 0.5,
            position_tolerance: 0.01,
            heading_tolerance: 0.01,
        }
    }
}

impl BaseControllerConfig {
    pub fn dt(&self) -> f64 {
        1.0 / self.loop_frequency
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(self.dt())
    }

    pub fn controller(&self) -> UnicycleController {
        UnicycleController::new(self.kp, self.kth)
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        check_frequency("base loop_frequency", self.loop_frequency)?;
        check_non_negative("kp", self.kp)?;
        check_non_negative("kth", self.kth)?;
        check_positive("linear_speed", self.linear_speed)?;
        check_positive("angular_speed", self.angular_speed)?;
        check_positive("position_tolerance", self.position_tolerance)?;
        check_positive("heading_tolerance", self.heading_tolerance)?;
        Ok(())
    }

    pub fn to_yaml(&self) -> String {
        format!(
            "base:\n  \
            kp: {}\n  \
            kth: {}\n  \
            loop_frequency: {}\n  \
            linear_speed: {}\n  \
            angular_speed: {}\n  \
            position_tolerance: {}\n  \
            heading_tolerance: {}\n",
            self.kp,
            self.kth,
            self.loop_frequency,
            self.linear_speed,
            self.angular_speed,
            self.position_tolerance,
            self.heading_tolerance,
        )
    }
}

/// Description of the forbidden workspace that can be stored in a configuration file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkspaceConfig {
    /// Everything below this height is forbidden (the table).
    pub floor: Option<f64>,
    /// Everything above this height is forbidden.
    pub ceiling: Option<f64>,
    pub boxes: Vec<AxisAlignedBox>,
}

impl WorkspaceConfig {
    pub fn build(&self) -> Workspace {
        let mut workspace = Workspace::new();
        if let Some(height) = self.floor {
            workspace.add(Box::new(HalfSpace::below(height)));
        }
        if let Some(height) = self.ceiling {
            workspace.add(Box::new(HalfSpace::above(height)));
        }
        for b in &self.boxes {
            workspace.add(Box::new(*b));
        }
        workspace
    }

    pub fn to_yaml(&self) -> String {
        fn point(v: &Vector3<f64>) -> String {
            format!("[{}, {}, {}]", v.x, v.y, v.z)
        }
        let mut yaml = String::from("workspace:\n");
        if let Some(height) = self.floor {
            yaml.push_str(&format!("  floor: {}\n", height));
        }
        if let Some(height) = self.ceiling {
            yaml.push_str(&format!("  ceiling: {}\n", height));
        }
        if self.boxes.is_empty() {
            yaml.push_str("  boxes: []\n");
        } else {
            yaml.push_str("  boxes:\n");
            for b in &self.boxes {
                yaml.push_str(&format!("    - {{ min: {}, max: {} }}\n", point(&b.min), point(&b.max)));
            }
        }
        yaml
    }
}

/// Everything the controllers need, as loaded from one configuration document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotionConfig {
    pub arm: ArmControllerConfig,
    pub base: BaseControllerConfig,
    pub links: LinkParameters,
    pub workspace: WorkspaceConfig,
}

impl MotionConfig {
    pub fn validate(&self) -> Result<(), MotionError> {
        self.arm.validate()?;
        self.base.validate()
    }

    pub fn to_yaml(&self) -> String {
        format!(
            "{}{}{}{}",
            self.arm.to_yaml(),
            self.base.to_yaml(),
            self.links.to_yaml(),
            self.workspace.to_yaml()
        )
    }
}

fn check_frequency(name: &str, value: f64) -> Result<(), MotionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MotionError::InvalidConfig(format!("{} must be a positive frequency, got {}", name, value)))
    }
}

fn check_positive(name: &str, value: f64) -> Result<(), MotionError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(MotionError::InvalidConfig(format!("{} must be positive, got {}", name, value)))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), MotionError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(MotionError::InvalidConfig(format!("{} must not be negative, got {}", name, value)))
    }
}
