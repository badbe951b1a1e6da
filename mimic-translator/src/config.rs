use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("error while accessing configuration")]
    IoError(#[from] std::io::Error),
    #[error("error while parsing json")]
    JsonError(#[from] serde_json::Error),
    #[error("error while parsing yaml")]
    YamlError(#[from] serde_yaml::Error),
    #[error("unsupported configuration format {0:?}, expected .json, .yaml or .yml")]
    UnsupportedFormat(String),
}

type Result<T> = std::result::Result<T, ConfigError>;

/// Json and yaml persistence shared by all configuration records.
///
/// The file format is picked from the extension.
pub trait ConfigFile: Serialize + DeserializeOwned + Sized {
    fn parse_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    fn parse_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    fn serialize_to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn serialize_to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match Format::from_path(path)? {
            Format::Json => Self::parse_json(&text),
            Format::Yaml => Self::parse_yaml(&text),
        }
    }

    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = match Format::from_path(path)? {
            Format::Json => self.serialize_to_json()?,
            Format::Yaml => self.serialize_to_yaml()?,
        };
        fs::write(path, text)?;
        Ok(())
    }
}

enum Format {
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Format> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_owned(),
            )),
        }
    }
}

/// Linear map from the vertical direction of the upper arm to pitch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ShoulderPitchParams {
    pub gain: f32,
    pub offset: f32,
    /// arm raised
    pub min: f32,
    /// arm hanging down
    pub max: f32,
}

impl Default for ShoulderPitchParams {
    fn default() -> Self {
        ShoulderPitchParams {
            gain: 1.8,
            offset: -0.2,
            min: -2.0,
            max: 1.6,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ShoulderRollParams {
    /// Minimum sideways share of the unit upper arm vector
    pub lateral_threshold: f32,
    /// radians
    pub max_roll: f32,
    pub attenuation_epsilon: f32,
}

impl Default for ShoulderRollParams {
    fn default() -> Self {
        ShoulderRollParams {
            lateral_threshold: 0.05,
            max_roll: 1.2,
            attenuation_epsilon: 1e-6,
        }
    }
}

/// Flexion buckets for elbow roll, all in degrees.
///
/// Both flexion bands below `high_flex_deg` map to `mid_output_deg`, so only
/// two outputs are reachable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ElbowRollParams {
    pub low_flex_deg: f32,
    pub high_flex_deg: f32,
    pub mid_output_deg: f32,
    pub max_output_deg: f32,
}

impl Default for ElbowRollParams {
    fn default() -> Self {
        ElbowRollParams {
            low_flex_deg: 10.0,
            high_flex_deg: 70.0,
            mid_output_deg: 30.0,
            max_output_deg: 88.5,
        }
    }
}

/// Elbow yaw is fixed per side; the threshold is accepted and ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ElbowYawParams {
    pub threshold: f32,
}

impl Default for ElbowYawParams {
    fn default() -> Self {
        ElbowYawParams { threshold: 0.05 }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct TranslatorConfig {
    pub shoulder_pitch: ShoulderPitchParams,
    pub shoulder_roll: ShoulderRollParams,
    pub elbow_roll: ElbowRollParams,
    pub elbow_yaw: ElbowYawParams,
}

impl ConfigFile for TranslatorConfig {}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Record key carrying the base64 visualization image
    pub visualization_key: String,
    pub image_extension: String,
    pub valid_landmarks_file: String,
    pub all_landmarks_file: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            visualization_key: "visualization_base64".to_owned(),
            image_extension: "png".to_owned(),
            valid_landmarks_file: "landmarks_valid.json".to_owned(),
            all_landmarks_file: "landmarks_all.json".to_owned(),
        }
    }
}

impl ConfigFile for PipelineConfig {}
