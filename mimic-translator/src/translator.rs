use crate::config::{
    ElbowRollParams, ElbowYawParams, ShoulderPitchParams, ShoulderRollParams, TranslatorConfig,
};
use crate::geometry::{angle_between_2d, clamp, normalize2, normalize3};
use crate::joints::{Joint, JointAngleSet};
use crate::landmarks::{Frame, Keypoint, LandmarkError, Side};
use nalgebra as na;

/// Shoulder, elbow and wrist of one arm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmKeypoints {
    pub shoulder: Keypoint,
    pub elbow: Keypoint,
    pub wrist: Keypoint,
}

impl ArmKeypoints {
    pub fn new(shoulder: Keypoint, elbow: Keypoint, wrist: Keypoint) -> ArmKeypoints {
        ArmKeypoints {
            shoulder,
            elbow,
            wrist,
        }
    }

    pub fn from_frame(frame: &Frame, side: Side) -> Result<ArmKeypoints, LandmarkError> {
        Ok(ArmKeypoints::new(
            frame.keypoint(side.shoulder())?,
            frame.keypoint(side.elbow())?,
            frame.keypoint(side.wrist())?,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ArmAngles {
    pub shoulder_pitch: f32,
    pub shoulder_roll: f32,
    pub elbow_roll: f32,
    pub elbow_yaw: f32,
}

/// Image plane direction pointing down along the torso
fn torso_down() -> na::Vector2<f32> {
    na::Vector2::new(0.0, 1.0)
}

/// Pitch from the vertical share of the upper arm in the image plane.
///
/// Arm straight down maps to `max`, straight up to `min`.
pub fn shoulder_pitch(shoulder: &Keypoint, elbow: &Keypoint, params: &ShoulderPitchParams) -> f32 {
    let direction = elbow.planar() - shoulder.planar();
    let unit = normalize2(&direction);
    if unit == na::Vector2::zeros() {
        return 0.0;
    }
    let uy = clamp(unit.y, -1.0, 1.0);
    clamp(params.gain * uy + params.offset, params.min, params.max)
}

/// Roll from the sideways deviation of the upper arm.
///
/// Measured in the image plane from the torso direction, then scaled down by
/// how much of the arm points towards or away from the camera.
pub fn shoulder_roll(
    shoulder: &Keypoint,
    elbow: &Keypoint,
    side: Side,
    params: &ShoulderRollParams,
) -> f32 {
    let unit = normalize3(&(elbow.position() - shoulder.position()));
    if unit == na::Vector3::zeros() {
        return 0.0;
    }

    let lateral = unit.x.abs();
    if lateral < params.lateral_threshold {
        return 0.0;
    }

    let planar = elbow.planar() - shoulder.planar();
    if normalize2(&planar) == na::Vector2::zeros() {
        return 0.0;
    }
    // 0 hanging down, pi/2 sideways
    let theta = angle_between_2d(&planar, &torso_down());

    let depth = unit.z.abs();
    let attenuation = lateral / (lateral + depth + params.attenuation_epsilon);
    let roll = (theta * attenuation).min(params.max_roll);

    side.convention().shoulder_roll_sign * roll
}

/// Elbow flexion in degrees, 0 for a straight arm.
///
/// `None` when either arm segment has no length in the image plane.
pub fn elbow_flexion_deg(shoulder: &Keypoint, elbow: &Keypoint, wrist: &Keypoint) -> Option<f32> {
    let upper_arm = elbow.planar() - shoulder.planar();
    let forearm = elbow.planar() - wrist.planar();
    if normalize2(&upper_arm) == na::Vector2::zeros() || normalize2(&forearm) == na::Vector2::zeros()
    {
        return None;
    }
    let between = angle_between_2d(&upper_arm, &forearm).to_degrees();
    Some((180.0 - between).max(0.0))
}

/// One rung of the elbow roll ladder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexRule {
    /// applies when flexion is strictly below this
    pub below_deg: f32,
    pub output_deg: f32,
}

impl ElbowRollParams {
    /// Rules in evaluation order; flexion past all of them gets `max_output_deg`
    pub fn rules(&self) -> [FlexRule; 2] {
        [
            FlexRule {
                below_deg: self.low_flex_deg,
                output_deg: self.mid_output_deg,
            },
            FlexRule {
                below_deg: self.high_flex_deg,
                output_deg: self.mid_output_deg,
            },
        ]
    }

    /// Output magnitude in degrees for a flexion in degrees
    pub fn classify(&self, flex_deg: f32) -> f32 {
        self.rules()
            .iter()
            .find(|rule| flex_deg < rule.below_deg)
            .map(|rule| rule.output_deg)
            .unwrap_or(self.max_output_deg)
    }
}

/// Discrete elbow roll in radians.
pub fn elbow_roll(
    shoulder: &Keypoint,
    elbow: &Keypoint,
    wrist: &Keypoint,
    side: Side,
    params: &ElbowRollParams,
) -> f32 {
    match elbow_flexion_deg(shoulder, elbow, wrist) {
        Some(flex) => side.convention().elbow_roll_sign * params.classify(flex).to_radians(),
        None => 0.0,
    }
}

/// Fixed per side. Landmarks and threshold don't take part.
pub fn elbow_yaw(_arm: &ArmKeypoints, side: Side, _params: &ElbowYawParams) -> f32 {
    side.convention().elbow_yaw
}

/// Maps upper body landmarks onto robot joint angles.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Translator {
        Translator { config }
    }

    pub fn translate_arm(&self, arm: &ArmKeypoints, side: Side) -> ArmAngles {
        ArmAngles {
            shoulder_pitch: shoulder_pitch(&arm.shoulder, &arm.elbow, &self.config.shoulder_pitch),
            shoulder_roll: shoulder_roll(
                &arm.shoulder,
                &arm.elbow,
                side,
                &self.config.shoulder_roll,
            ),
            elbow_roll: elbow_roll(
                &arm.shoulder,
                &arm.elbow,
                &arm.wrist,
                side,
                &self.config.elbow_roll,
            ),
            elbow_yaw: elbow_yaw(arm, side, &self.config.elbow_yaw),
        }
    }

    /// Translate one frame.
    ///
    /// Fails on the first missing landmark or coordinate instead of guessing;
    /// run the frame through [`crate::validator::is_complete`] first.
    pub fn translate(&self, frame: &Frame) -> Result<JointAngleSet, LandmarkError> {
        let left = ArmKeypoints::from_frame(frame, Side::Left)?;
        let right = ArmKeypoints::from_frame(frame, Side::Right)?;

        let mut angles = JointAngleSet::zeroed();
        for (side, arm) in [(Side::Left, left), (Side::Right, right)] {
            let arm_angles = self.translate_arm(&arm, side);
            let joints = Joint::arm(side);
            angles.set(joints.shoulder_pitch, arm_angles.shoulder_pitch);
            angles.set(joints.shoulder_roll, arm_angles.shoulder_roll);
            angles.set(joints.elbow_roll, arm_angles.elbow_roll);
            angles.set(joints.elbow_yaw, arm_angles.elbow_yaw);
            tracing::trace!(%side, ?arm_angles, "translated arm");
        }
        Ok(angles)
    }
}

/// Translate with default parameters
pub fn translate(frame: &Frame) -> Result<JointAngleSet, LandmarkError> {
    Translator::default().translate(frame)
}
