//! Supports reading the motion configuration from YAML file (optional)

use std::path::Path;
use std::time::Duration;

use nalgebra::Vector3;
use regex::Regex;
use yaml_rust2::{Yaml, YamlLoader};

use crate::config::{ArmControllerConfig, BaseControllerConfig, MotionConfig, WorkspaceConfig};
use crate::parameter_error::ParameterError;
use crate::parameters::dh_parameters::LinkParameters;
use crate::path_check::SingularityLimits;
use crate::workspace::AxisAlignedBox;

impl MotionConfig {
    /// Read the configuration from YAML file. All sections and keys are optional,
    /// missing ones keep their defaults:
    /// ```yaml
    /// arm:
    ///   loop_frequency: 1000
    ///   joints_error: 0.005
    ///   settling_time: 10
    ///   waypoints: 20
    ///   gripper_settle: 2.0
    /// base:
    ///   kp: 0.5
    ///   kth: 0.5
    /// links:
    ///   alpha: [0, deg(90), 0, 0, deg(90), deg(-90)]
    ///   a: [0, 0, -0.425, -0.3922, 0, 0]
    ///   d: [0.1625, 0, 0, 0.1333, 0.0997, 0.0996]
    /// workspace:
    ///   floor: 0.0
    ///   boxes:
    ///     - { min: [-0.1, -0.1, 0], max: [0.1, 0.1, 0.2] }
    /// ```
    /// Angles may be given in radians or in degrees as `deg(angle)`.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let docs = YamlLoader::load_from_str(contents)
            .map_err(|e| ParameterError::ParseError(e.to_string()))?;
        let mut config = MotionConfig::default();
        let Some(doc) = docs.first() else {
            return Ok(config);
        };

        let parser = ValueParser::new()?;
        parser.read_arm(&doc["arm"], &mut config.arm)?;
        parser.read_base(&doc["base"], &mut config.base)?;
        parser.read_links(&doc["links"], &mut config.links)?;
        parser.read_workspace(&doc["workspace"], &mut config.workspace)?;

        config
            .validate()
            .map_err(|e| ParameterError::InvalidConfiguration(e.to_string()))?;
        Ok(config)
    }
}

struct ValueParser {
    degrees: Regex,
}

impl ValueParser {
    fn new() -> Result<Self, ParameterError> {
        let degrees = Regex::new(r"^deg\(\s*(-?\d+(\.\d+)?)\s*\)$")
            .map_err(|_| ParameterError::ParseError("Invalid regex pattern".to_string()))?;
        Ok(ValueParser { degrees })
    }

    /// Number in any of the YAML forms. Strings are accepted for `deg(...)` notation
    /// and for exponent forms some emitters produce.
    fn number(&self, value: &Yaml, key: &str) -> Result<f64, ParameterError> {
        match value {
            Yaml::Real(s) => s.parse().map_err(|_| ParameterError::ParseError(format!("{}: {}", key, s))),
            Yaml::Integer(i) => Ok(*i as f64),
            Yaml::String(s) => self.angle(s),
            _ => Err(ParameterError::ParseError(format!("{}: number expected", key))),
        }
    }

    fn angle(&self, text: &str) -> Result<f64, ParameterError> {
        if let Some(caps) = self.degrees.captures(text.trim()) {
            let degrees: f64 = caps
                .get(1)
                .ok_or_else(|| ParameterError::WrongAngle(format!("Bad representation: {}", text)))?
                .as_str()
                .parse()
                .map_err(|_| ParameterError::WrongAngle(text.to_string()))?;
            Ok(degrees.to_radians())
        } else {
            text.trim().parse().map_err(|_| ParameterError::WrongAngle(text.to_string()))
        }
    }

    fn read_f64(&self, section: &Yaml, key: &str, target: &mut f64) -> Result<(), ParameterError> {
        let value = &section[key];
        if !value.is_badvalue() {
            *target = self.number(value, key)?;
        }
        Ok(())
    }

    fn array<const N: usize>(&self, value: &Yaml, key: &str) -> Result<[f64; N], ParameterError> {
        let items = value
            .as_vec()
            .ok_or_else(|| ParameterError::ParseError(format!("{}: list expected", key)))?;
        if items.len() != N {
            return Err(ParameterError::InvalidLength { expected: N, found: items.len() });
        }
        let mut out = [0.0; N];
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = self.number(item, key)?;
        }
        Ok(out)
    }

    fn strings(&self, value: &Yaml, key: &str) -> Result<Vec<String>, ParameterError> {
        let items = value
            .as_vec()
            .ok_or_else(|| ParameterError::ParseError(format!("{}: list expected", key)))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ParameterError::ParseError(format!("{}: names must be strings", key)))
            })
            .collect()
    }

    fn read_arm(&self, section: &Yaml, arm: &mut ArmControllerConfig) -> Result<(), ParameterError> {
        if section.is_badvalue() {
            return Ok(());
        }
        self.read_f64(section, "loop_frequency", &mut arm.loop_frequency)?;
        self.read_f64(section, "joints_error", &mut arm.joints_error)?;
        self.read_f64(section, "settling_time", &mut arm.settling_time)?;
        self.read_f64(section, "snap_tolerance", &mut arm.snap_tolerance)?;

        let waypoints = &section["waypoints"];
        if !waypoints.is_badvalue() {
            let n = waypoints
                .as_i64()
                .filter(|n| *n > 0)
                .ok_or_else(|| ParameterError::ParseError("waypoints: positive integer expected".into()))?;
            arm.waypoints = n as usize;
        }

        let mut settle = arm.gripper_settle.as_secs_f64();
        self.read_f64(section, "gripper_settle", &mut settle)?;
        if settle < 0.0 || !settle.is_finite() {
            return Err(ParameterError::ParseError(format!("gripper_settle: {}", settle)));
        }
        arm.gripper_settle = Duration::from_secs_f64(settle);

        let SingularityLimits { mut min_determinant, mut min_singular_value } = arm.singularity;
        self.read_f64(section, "min_determinant", &mut min_determinant)?;
        self.read_f64(section, "min_singular_value", &mut min_singular_value)?;
        arm.singularity = SingularityLimits { min_determinant, min_singular_value };

        if !section["joint_names"].is_badvalue() {
            arm.joint_names = self.strings(&section["joint_names"], "joint_names")?;
            if arm.joint_names.len() != 6 {
                return Err(ParameterError::InvalidLength { expected: 6, found: arm.joint_names.len() });
            }
        }
        if !section["auxiliary_names"].is_badvalue() {
            arm.auxiliary_names = self.strings(&section["auxiliary_names"], "auxiliary_names")?;
        }
        let passthrough = &section["auxiliary_passthrough"];
        if !passthrough.is_badvalue() {
            arm.auxiliary_passthrough = passthrough
                .as_bool()
                .ok_or_else(|| ParameterError::ParseError("auxiliary_passthrough: boolean expected".into()))?;
        }
        Ok(())
    }

    fn read_base(&self, section: &Yaml, base: &mut BaseControllerConfig) -> Result<(), ParameterError> {
        if section.is_badvalue() {
            return Ok(());
        }
        self.read_f64(section, "kp", &mut base.kp)?;
        self.read_f64(section, "kth", &mut base.kth)?;
        self.read_f64(section, "loop_frequency", &mut base.loop_frequency)?;
        self.read_f64(section, "linear_speed", &mut base.linear_speed)?;
        self.read_f64(section, "angular_speed", &mut base.angular_speed)?;
        self.read_f64(section, "position_tolerance", &mut base.position_tolerance)?;
        self.read_f64(section, "heading_tolerance", &mut base.heading_tolerance)?;
        Ok(())
    }

    fn read_links(&self, section: &Yaml, links: &mut LinkParameters) -> Result<(), ParameterError> {
        if section.is_badvalue() {
            return Ok(());
        }
        for (key, target) in [("alpha", &mut links.alpha), ("a", &mut links.a), ("d", &mut links.d)] {
            let value = &section[key];
            if value.is_badvalue() {
                return Err(ParameterError::MissingField(format!("links.{}", key)));
            }
            *target = self.array::<6>(value, key)?;
        }
        Ok(())
    }

    fn read_workspace(&self, section: &Yaml, workspace: &mut WorkspaceConfig) -> Result<(), ParameterError> {
        if section.is_badvalue() {
            return Ok(());
        }
        for (key, target) in [("floor", &mut workspace.floor), ("ceiling", &mut workspace.ceiling)] {
            let value = &section[key];
            if !value.is_badvalue() && !value.is_null() {
                *target = Some(self.number(value, key)?);
            }
        }
        let boxes = &section["boxes"];
        if !boxes.is_badvalue() {
            let items = boxes
                .as_vec()
                .ok_or_else(|| ParameterError::ParseError("boxes: list expected".into()))?;
            workspace.boxes = items
                .iter()
                .map(|item| {
                    if item["min"].is_badvalue() || item["max"].is_badvalue() {
                        return Err(ParameterError::MissingField("box needs min and max".into()));
                    }
                    let min = self.array::<3>(&item["min"], "min")?;
                    let max = self.array::<3>(&item["max"], "max")?;
                    Ok(AxisAlignedBox::new(Vector3::from(min), Vector3::from(max)))
                })
                .collect::<Result<_, _>>()?;
        }
        Ok(())
    }
}
