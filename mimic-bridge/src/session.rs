use crate::{
    actuator::{ActuationReceipt, ActuatorError, PoseActuator, PoseCommand},
    bridge_config::{ActuationConfig, BridgeConfig},
};
use mimic_translator::{
    artifacts::ArtifactSink,
    joints::{JointAngleSet, TranslationSummary},
    landmarks::{Frame, LandmarkError},
    pipeline::{FramePipeline, PipelineResult},
    record::FrameRecord,
    translator::Translator,
    validator,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Angles below this count as zero when judging a pose
pub const NEUTRAL_TOLERANCE: f32 = 1e-4;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("frame is incomplete: {0}")]
    IncompleteFrame(#[from] LandmarkError),
    #[error("no usable pose detected")]
    NoUsablePose,
    #[error("no valid frames among {total_frames} sampled")]
    NoValidFrames { total_frames: usize },
    #[error("failed to actuate pose")]
    ActuatorError(#[from] ActuatorError),
}

type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub translation: TranslationSummary,
    pub response: ActuationReceipt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameActuation {
    /// Position among the valid frames, not among all sampled frames
    pub frame_valid_index: usize,
    pub response: ActuationReceipt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoReport {
    pub total_frames: usize,
    pub valid_frames: usize,
    pub invalid_frames: usize,
    pub valid_image_paths: Vec<PathBuf>,
    pub invalid_image_paths: Vec<PathBuf>,
    pub frames: Vec<FrameActuation>,
}

impl VideoReport {
    fn new(result: &PipelineResult, frames: Vec<FrameActuation>) -> VideoReport {
        VideoReport {
            total_frames: result.total_frames,
            valid_frames: result.valid_frames,
            invalid_frames: result.invalid_frames,
            valid_image_paths: result.valid_image_paths.clone(),
            invalid_image_paths: result.invalid_image_paths.clone(),
            frames,
        }
    }
}

fn ensure_usable(angles: &JointAngleSet) -> Result<()> {
    if angles.is_neutral(NEUTRAL_TOLERANCE) {
        return Err(SessionError::NoUsablePose);
    }
    Ok(())
}

/// Turns pose service output into robot commands.
pub struct Bridge {
    translator: Translator,
    pipeline: FramePipeline,
    actuation: ActuationConfig,
    actuator: Box<dyn PoseActuator>,
}

impl Bridge {
    pub fn new(config: BridgeConfig, actuator: Box<dyn PoseActuator>) -> Bridge {
        Bridge {
            translator: Translator::new(config.translator),
            pipeline: FramePipeline::new(config.pipeline),
            actuation: config.actuation,
            actuator,
        }
    }

    async fn dispatch(&mut self, angles: &JointAngleSet) -> Result<ActuationReceipt> {
        let command = PoseCommand::new(angles, self.actuation.interpolation_secs);
        Ok(self.actuator.set_pose(&command).await?)
    }

    /// Validate, translate and send a single frame.
    ///
    /// A pose that translates to all zeros is refused instead of sent.
    pub async fn pose_from_frame(&mut self, frame: &Frame) -> Result<FrameReport> {
        if let Some(gap) = validator::first_gap(frame) {
            return Err(gap.into());
        }
        let angles = self.translator.translate(frame)?;
        ensure_usable(&angles)?;
        let response = self.dispatch(&angles).await?;
        Ok(FrameReport {
            translation: angles.summary(),
            response,
        })
    }

    /// Filter a sampled video and send one pose per valid frame, in order.
    pub async fn pose_from_video<I, S>(&mut self, records: I, sink: &mut S) -> Result<VideoReport>
    where
        I: IntoIterator<Item = FrameRecord>,
        S: ArtifactSink + ?Sized,
    {
        let result = self.pipeline.process_frames(records, sink);
        if !result.has_valid_frames() {
            return Err(SessionError::NoValidFrames {
                total_frames: result.total_frames,
            });
        }

        let mut frames = Vec::with_capacity(result.valid_frames);
        for (frame_valid_index, frame) in result.valid_landmarks.iter().enumerate() {
            let angles = self.translator.translate(frame)?;
            let response = self.dispatch(&angles).await?;
            tracing::info!(frame_valid_index, sequence = response.sequence, "sent video pose");
            frames.push(FrameActuation {
                frame_valid_index,
                response,
            });
        }
        Ok(VideoReport::new(&result, frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::RecordingActuator;
    use approx::assert_relative_eq;
    use mimic_translator::{
        artifacts::MemoryArtifactSink,
        joints::Joint,
        landmarks::{Keypoint, Landmark},
    };

    fn kp(x: f32, y: f32, z: f32) -> Keypoint {
        Keypoint::new(x, y, z)
    }

    fn posed_frame() -> Frame {
        Frame::upper_body(
            (kp(0.0, 0.0, 0.0), kp(0.0, 1.0, 0.0), kp(1.0, 1.0, 0.0)),
            (kp(0.0, 0.0, 0.0), kp(-1.0, 0.0, 0.0), kp(-2.0, 0.0, 0.0)),
        )
    }

    fn bridge() -> (Bridge, RecordingActuator) {
        let log = RecordingActuator::default();
        let bridge = Bridge::new(BridgeConfig::default(), Box::new(log.clone()));
        (bridge, log)
    }

    #[tokio::test]
    async fn single_frame_is_sent() {
        let (mut bridge, log) = bridge();
        let report = bridge.pose_from_frame(&posed_frame()).await.unwrap();
        assert_eq!(report.response.sequence, 0);
        assert_relative_eq!(report.translation.joint_values[&Joint::RShoulderRoll], -1.2);

        let commands = log.commands().await;
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].angles, report.translation.angles);
        assert_eq!(commands[0].times, vec![3.0; Joint::COUNT]);
    }

    #[tokio::test]
    async fn incomplete_frame_names_the_gap() {
        let (mut bridge, log) = bridge();
        let frame = posed_frame().without("Left elbow");
        let err = bridge.pose_from_frame(&frame).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::IncompleteFrame(LandmarkError::MissingLandmark(Landmark::LeftElbow))
        ));
        assert!(log.commands().await.is_empty());
    }

    #[test]
    fn neutral_pose_is_refused() {
        assert!(matches!(
            ensure_usable(&JointAngleSet::zeroed()),
            Err(SessionError::NoUsablePose)
        ));
        let mut angles = JointAngleSet::zeroed();
        angles.set(Joint::HeadPitch, 5e-5);
        assert!(ensure_usable(&angles).is_err());
        angles.set(Joint::LElbowYaw, -1.3);
        assert!(ensure_usable(&angles).is_ok());
    }

    #[tokio::test]
    async fn video_sends_valid_frames_in_order() {
        let (mut bridge, log) = bridge();
        let records = vec![
            FrameRecord::from_frame(&posed_frame(), None),
            FrameRecord::from_frame(&posed_frame().without("Right wrist"), None),
            FrameRecord::from_frame(&Frame::upper_body(
                (kp(0.0, 0.0, 0.0), kp(0.0, -1.0, 0.0), kp(0.0, -2.0, 0.0)),
                (kp(0.0, 0.0, 0.0), kp(0.0, 1.0, 0.0), kp(0.0, 2.0, 0.0)),
            ), None),
        ];
        let mut sink = MemoryArtifactSink::default();
        let report = bridge.pose_from_video(records, &mut sink).await.unwrap();

        assert_eq!(report.total_frames, 3);
        assert_eq!(report.valid_frames, 2);
        assert_eq!(report.invalid_frames, 1);
        let indices: Vec<usize> = report.frames.iter().map(|f| f.frame_valid_index).collect();
        assert_eq!(indices, vec![0, 1]);

        let commands = log.commands().await;
        assert_eq!(commands.len(), 2);
        assert_relative_eq!(commands[0].angles[Joint::RShoulderRoll.index()], -1.2);
        assert_relative_eq!(
            commands[1].angles[Joint::LShoulderPitch.index()],
            -2.0,
            epsilon = 1e-6
        );
        assert!(sink.documents.contains_key("landmarks_all.json"));
    }

    #[tokio::test]
    async fn video_without_valid_frames_fails() {
        let (mut bridge, log) = bridge();
        let records = vec![FrameRecord::from_frame(&Frame::new(), None); 4];
        let err = bridge
            .pose_from_video(records, &mut MemoryArtifactSink::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NoValidFrames { total_frames: 4 }));
        assert!(log.commands().await.is_empty());
    }

    #[tokio::test]
    async fn empty_video_fails() {
        let (mut bridge, _) = bridge();
        let err = bridge
            .pose_from_video(Vec::new(), &mut MemoryArtifactSink::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NoValidFrames { total_frames: 0 }));
    }
}
