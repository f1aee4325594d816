//! Feedback ingestion. A background delivery mechanism writes the latest reading, the
//! control loop reads whatever is currently stored. There is exactly one writer and
//! one reader per channel; the slot is updated atomically under a short lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::angles::quaternion_to_yaw;
use crate::base_controller::Pose2D;
use crate::kinematic_traits::{Joints, JOINTS_AT_ZERO};

/// Number of auxiliary (gripper finger) readings carried next to the arm joints.
pub const AUXILIARY_COUNT: usize = 3;

/// Joint names the UR5 driver publishes, in axis order.
pub const UR5_JOINT_NAMES: [&str; 6] = [
    "shoulder_pan_joint",
    "shoulder_lift_joint",
    "elbow_joint",
    "wrist_1_joint",
    "wrist_2_joint",
    "wrist_3_joint",
];

/// Finger joints of the simulated gripper.
pub const UR5_AUXILIARY_NAMES: [&str; AUXILIARY_COUNT] = ["hand_1_joint", "hand_2_joint", "hand_3_joint"];

/// Where a named reading goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Joint(usize),
    Auxiliary(usize),
}

/// Fixed name to axis lookup, built once as the axis set of a robot never changes.
#[derive(Debug, Clone)]
pub struct JointNameMap {
    axes: HashMap<String, Axis>,
}

impl JointNameMap {
    pub fn new<S: AsRef<str>>(joints: &[S], auxiliary: &[S]) -> Self {
        let mut axes = HashMap::with_capacity(joints.len() + auxiliary.len());
        for (i, name) in joints.iter().take(6).enumerate() {
            axes.insert(name.as_ref().to_string(), Axis::Joint(i));
        }
        for (i, name) in auxiliary.iter().take(AUXILIARY_COUNT).enumerate() {
            axes.insert(name.as_ref().to_string(), Axis::Auxiliary(i));
        }
        JointNameMap { axes }
    }

    pub fn ur5() -> Self {
        JointNameMap::new(&UR5_JOINT_NAMES, &UR5_AUXILIARY_NAMES)
    }

    pub fn axis(&self, name: &str) -> Option<Axis> {
        self.axes.get(name).copied()
    }
}

impl Default for JointNameMap {
    fn default() -> Self {
        JointNameMap::ur5()
    }
}

/// Latest arm reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackSample {
    pub joints: Joints,
    pub auxiliary: [f64; AUXILIARY_COUNT],
    /// Number of samples ingested so far, zero if nothing arrived yet.
    pub sequence: u64,
}

impl Default for FeedbackSample {
    fn default() -> Self {
        FeedbackSample {
            joints: JOINTS_AT_ZERO,
            auxiliary: [0.0; AUXILIARY_COUNT],
            sequence: 0,
        }
    }
}

/// Creates the joint feedback channel. The writer goes to the delivery thread,
/// the reader to the controller.
pub fn feedback_channel(names: JointNameMap) -> (FeedbackWriter, FeedbackReader) {
    let slot = Arc::new(Mutex::new(FeedbackSample::default()));
    (
        FeedbackWriter { names, slot: slot.clone() },
        FeedbackReader { slot },
    )
}

/// The only mutator of the joint feedback. Not cloneable.
#[derive(Debug)]
pub struct FeedbackWriter {
    names: JointNameMap,
    slot: Arc<Mutex<FeedbackSample>>,
}

impl FeedbackWriter {
    /// Applies a named position reading. Unrecognized names are ignored, recognized ones
    /// update normally. Returns the number of values applied.
    pub fn ingest<S: AsRef<str>>(&self, names: &[S], positions: &[f64]) -> usize {
        let mut sample = self.slot.lock();
        let mut applied = 0;
        for (name, &position) in names.iter().zip(positions.iter()) {
            match self.names.axis(name.as_ref()) {
                Some(Axis::Joint(i)) => sample.joints[i] = position,
                Some(Axis::Auxiliary(i)) => sample.auxiliary[i] = position,
                None => {
                    trace!("Ignoring feedback for unknown axis {}", name.as_ref());
                    continue;
                }
            }
            applied += 1;
        }
        sample.sequence += 1;
        applied
    }

    /// Stores a complete joint reading in axis order, auxiliary values are kept.
    pub fn set_joints(&self, joints: &Joints) {
        let mut slot = self.slot.lock();
        slot.joints = *joints;
        slot.sequence += 1;
    }
}

/// Read side of the joint feedback channel.
#[derive(Debug, Clone)]
pub struct FeedbackReader {
    slot: Arc<Mutex<FeedbackSample>>,
}

impl FeedbackReader {
    pub fn latest(&self) -> FeedbackSample {
        *self.slot.lock()
    }

    pub fn joints(&self) -> Joints {
        self.slot.lock().joints
    }

    pub fn has_sample(&self) -> bool {
        self.slot.lock().sequence > 0
    }
}

/// Latest base odometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OdometrySample {
    pub pose: Pose2D,
    pub sequence: u64,
}

pub fn odometry_channel() -> (OdometryWriter, OdometryReader) {
    let slot = Arc::new(Mutex::new(OdometrySample::default()));
    (OdometryWriter { slot: slot.clone() }, OdometryReader { slot })
}

/// The only mutator of the odometry. Not cloneable.
#[derive(Debug)]
pub struct OdometryWriter {
    slot: Arc<Mutex<OdometrySample>>,
}

impl OdometryWriter {
    pub fn update(&self, pose: Pose2D) {
        let mut slot = self.slot.lock();
        slot.pose = pose;
        slot.sequence += 1;
    }

    /// Odometry as usually published: planar position and the orientation quaternion.
    pub fn update_from_quaternion(&self, x: f64, y: f64, qx: f64, qy: f64, qz: f64, qw: f64) {
        self.update(Pose2D::new(x, y, quaternion_to_yaw(qx, qy, qz, qw)));
    }
}

#[derive(Debug, Clone)]
pub struct OdometryReader {
    slot: Arc<Mutex<OdometrySample>>,
}

impl OdometryReader {
    pub fn latest(&self) -> OdometrySample {
        *self.slot.lock()
    }

    pub fn pose(&self) -> Pose2D {
        self.slot.lock().pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_by_name() {
        let (writer, reader) = feedback_channel(JointNameMap::ur5());
        assert!(!reader.has_sample());

        // Driver order differs from the axis order.
        let applied = writer.ingest(
            &["elbow_joint", "shoulder_pan_joint", "wrist_3_joint", "hand_2_joint"],
            &[0.3, 0.1, 0.6, 0.02],
        );
        assert_eq!(applied, 4);
        let sample = reader.latest();
        assert_eq!(sample.joints, [0.1, 0.0, 0.3, 0.0, 0.0, 0.6]);
        assert_eq!(sample.auxiliary, [0.0, 0.02, 0.0]);
        assert_eq!(sample.sequence, 1);
        assert!(reader.has_sample());
    }

    #[test]
    fn test_unknown_names_ignored_partial_update_kept() {
        let (writer, reader) = feedback_channel(JointNameMap::ur5());
        writer.set_joints(&[1.0; 6]);
        let applied = writer.ingest(&["camera_tilt", "wrist_1_joint", "bogus"], &[9.0, -0.5, 9.0]);
        assert_eq!(applied, 1);
        assert_eq!(reader.joints(), [1.0, 1.0, 1.0, -0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_extra_positions_without_names_ignored() {
        let (writer, reader) = feedback_channel(JointNameMap::ur5());
        let applied = writer.ingest(&["shoulder_lift_joint"], &[0.4, 0.5, 0.6]);
        assert_eq!(applied, 1);
        assert_eq!(reader.joints()[1], 0.4);
    }

    #[test]
    fn test_custom_names() {
        let map = JointNameMap::new(&["a", "b", "c", "d", "e", "f"], &[]);
        assert_eq!(map.axis("c"), Some(Axis::Joint(2)));
        assert_eq!(map.axis("hand_1_joint"), None);
    }

    #[test]
    fn test_feedback_from_another_thread() {
        let (writer, reader) = feedback_channel(JointNameMap::ur5());
        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                writer.ingest(&["shoulder_pan_joint"], &[i as f64]);
            }
        });
        handle.join().unwrap();
        let sample = reader.latest();
        assert_eq!(sample.sequence, 100);
        assert_eq!(sample.joints[0], 99.0);
    }

    #[test]
    fn test_odometry_from_quaternion() {
        let (writer, reader) = odometry_channel();
        let yaw: f64 = 1.2;
        writer.update_from_quaternion(0.5, -0.5, 0.0, 0.0, (yaw / 2.0).sin(), (yaw / 2.0).cos());
        let pose = reader.pose();
        assert_eq!((pose.x, pose.y), (0.5, -0.5));
        assert!((pose.theta - yaw).abs() < 1e-12);
        assert_eq!(reader.latest().sequence, 1);
    }
}
