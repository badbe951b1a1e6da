use async_trait::async_trait;
use mimic_translator::joints::{Joint, JointAngleSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};

#[derive(Error, Debug)]
pub enum ActuatorError {
    #[error("error while sending pose")]
    IoError(#[from] std::io::Error),
    #[error("error while serializing pose")]
    SerializationError(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, ActuatorError>;

/// Full body target for the robot, one entry per joint in wire order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseCommand {
    pub joint_names: Vec<String>,
    pub angles: Vec<f32>,
    /// Seconds to reach each target
    pub times: Vec<f32>,
}

impl PoseCommand {
    pub fn new(angles: &JointAngleSet, interpolation_secs: f32) -> PoseCommand {
        PoseCommand {
            joint_names: Joint::ALL.iter().map(|joint| joint.name().to_owned()).collect(),
            angles: angles.angles().to_vec(),
            times: vec![interpolation_secs; Joint::COUNT],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuationReceipt {
    /// Position of the command in the stream, starting at 0
    pub sequence: usize,
}

#[async_trait]
pub trait PoseActuator: Send {
    async fn set_pose(&mut self, command: &PoseCommand) -> Result<ActuationReceipt>;
}

#[derive(Serialize)]
struct AnglesMessage<'a> {
    angles: &'a [f32],
}

/// Writes one `{"angles": [...]}` json object per line
pub struct JsonLinesActuator<W> {
    writer: W,
    sent: usize,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesActuator<W> {
    pub fn new(writer: W) -> JsonLinesActuator<W> {
        JsonLinesActuator { writer, sent: 0 }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> PoseActuator for JsonLinesActuator<W> {
    async fn set_pose(&mut self, command: &PoseCommand) -> Result<ActuationReceipt> {
        let mut line = serde_json::to_vec(&AnglesMessage {
            angles: &command.angles,
        })?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;

        let receipt = ActuationReceipt {
            sequence: self.sent,
        };
        self.sent += 1;
        tracing::debug!(sequence = receipt.sequence, "pose sent");
        Ok(receipt)
    }
}

/// Keeps every command, sends nothing.
///
/// Clones share one log, so a handle kept outside a bridge sees what the
/// bridge sent.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    commands: Arc<Mutex<Vec<PoseCommand>>>,
}

impl RecordingActuator {
    pub async fn commands(&self) -> Vec<PoseCommand> {
        self.commands.lock().await.clone()
    }
}

#[async_trait]
impl PoseActuator for RecordingActuator {
    async fn set_pose(&mut self, command: &PoseCommand) -> Result<ActuationReceipt> {
        let mut commands = self.commands.lock().await;
        commands.push(command.clone());
        tracing::debug!(sequence = commands.len() - 1, "pose recorded");
        Ok(ActuationReceipt {
            sequence: commands.len() - 1,
        })
    }
}
