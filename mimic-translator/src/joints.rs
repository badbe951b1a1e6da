use crate::landmarks::Side;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, ops::Index};

/// Robot joints in the order the actuation service expects them.
///
/// The discriminant is the index into [`JointAngleSet::angles`], so the named
/// and positional views can't drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(usize)]
pub enum Joint {
    LShoulderPitch = 0,
    LShoulderRoll,
    LElbowRoll,
    LElbowYaw,
    LWristYaw,
    RShoulderPitch,
    RShoulderRoll,
    RElbowRoll,
    RElbowYaw,
    RWristYaw,
    LHipRoll,
    LHipPitch,
    LKneePitch,
    LAnklePitch,
    LAnkleRoll,
    RHipRoll,
    RHipPitch,
    RKneePitch,
    RAnklePitch,
    RAnkleRoll,
    HeadYaw,
    HeadPitch,
}

/// Arm joints the translator derives from landmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmJoints {
    pub shoulder_pitch: Joint,
    pub shoulder_roll: Joint,
    pub elbow_roll: Joint,
    pub elbow_yaw: Joint,
}

impl Joint {
    pub const COUNT: usize = 22;

    pub const ALL: [Joint; Joint::COUNT] = [
        Joint::LShoulderPitch,
        Joint::LShoulderRoll,
        Joint::LElbowRoll,
        Joint::LElbowYaw,
        Joint::LWristYaw,
        Joint::RShoulderPitch,
        Joint::RShoulderRoll,
        Joint::RElbowRoll,
        Joint::RElbowYaw,
        Joint::RWristYaw,
        Joint::LHipRoll,
        Joint::LHipPitch,
        Joint::LKneePitch,
        Joint::LAnklePitch,
        Joint::LAnkleRoll,
        Joint::RHipRoll,
        Joint::RHipPitch,
        Joint::RKneePitch,
        Joint::RAnklePitch,
        Joint::RAnkleRoll,
        Joint::HeadYaw,
        Joint::HeadPitch,
    ];

    /// Joints that can be non-zero
    pub const COMPUTED: [Joint; 8] = [
        Joint::LShoulderPitch,
        Joint::LShoulderRoll,
        Joint::LElbowRoll,
        Joint::LElbowYaw,
        Joint::RShoulderPitch,
        Joint::RShoulderRoll,
        Joint::RElbowRoll,
        Joint::RElbowYaw,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Joint::LShoulderPitch => "LShoulderPitch",
            Joint::LShoulderRoll => "LShoulderRoll",
            Joint::LElbowRoll => "LElbowRoll",
            Joint::LElbowYaw => "LElbowYaw",
            Joint::LWristYaw => "LWristYaw",
            Joint::RShoulderPitch => "RShoulderPitch",
            Joint::RShoulderRoll => "RShoulderRoll",
            Joint::RElbowRoll => "RElbowRoll",
            Joint::RElbowYaw => "RElbowYaw",
            Joint::RWristYaw => "RWristYaw",
            Joint::LHipRoll => "LHipRoll",
            Joint::LHipPitch => "LHipPitch",
            Joint::LKneePitch => "LKneePitch",
            Joint::LAnklePitch => "LAnklePitch",
            Joint::LAnkleRoll => "LAnkleRoll",
            Joint::RHipRoll => "RHipRoll",
            Joint::RHipPitch => "RHipPitch",
            Joint::RKneePitch => "RKneePitch",
            Joint::RAnklePitch => "RAnklePitch",
            Joint::RAnkleRoll => "RAnkleRoll",
            Joint::HeadYaw => "HeadYaw",
            Joint::HeadPitch => "HeadPitch",
        }
    }

    pub const fn arm(side: Side) -> ArmJoints {
        match side {
            Side::Left => ArmJoints {
                shoulder_pitch: Joint::LShoulderPitch,
                shoulder_roll: Joint::LShoulderRoll,
                elbow_roll: Joint::LElbowRoll,
                elbow_yaw: Joint::LElbowYaw,
            },
            Side::Right => ArmJoints {
                shoulder_pitch: Joint::RShoulderPitch,
                shoulder_roll: Joint::RShoulderRoll,
                elbow_roll: Joint::RElbowRoll,
                elbow_yaw: Joint::RElbowYaw,
            },
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One radian value per [`Joint`]. Joints nobody sets stay at `0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngleSet {
    angles: [f32; Joint::COUNT],
}

impl Default for JointAngleSet {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl JointAngleSet {
    pub fn zeroed() -> JointAngleSet {
        JointAngleSet {
            angles: [0.0; Joint::COUNT],
        }
    }

    pub fn set(&mut self, joint: Joint, radians: f32) {
        self.angles[joint.index()] = radians;
    }

    pub fn get(&self, joint: Joint) -> f32 {
        self.angles[joint.index()]
    }

    /// Wire order sequence
    pub fn angles(&self) -> &[f32; Joint::COUNT] {
        &self.angles
    }

    /// Named view over the computed joints
    pub fn named(&self) -> impl Iterator<Item = (Joint, f32)> + '_ {
        Joint::COMPUTED
            .iter()
            .map(move |joint| (*joint, self.get(*joint)))
    }

    /// True when every angle is within `tolerance` of zero
    pub fn is_neutral(&self, tolerance: f32) -> bool {
        self.angles.iter().all(|angle| angle.abs() < tolerance)
    }

    pub fn summary(&self) -> TranslationSummary {
        TranslationSummary {
            angles: self.angles.to_vec(),
            joint_values: self.named().collect(),
        }
    }
}

impl Index<Joint> for JointAngleSet {
    type Output = f32;

    fn index(&self, joint: Joint) -> &Self::Output {
        &self.angles[joint.index()]
    }
}

/// Serializable diagnostics for one translated frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationSummary {
    pub angles: Vec<f32>,
    pub joint_values: BTreeMap<Joint, f32>,
}
