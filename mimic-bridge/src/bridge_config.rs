use lazy_static::lazy_static;
use mimic_translator::config::{ConfigFile, PipelineConfig, TranslatorConfig};
use serde::{Deserialize, Serialize};

/// How poses are handed to the robot
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ActuationConfig {
    /// Seconds each joint takes to reach its target
    pub interpolation_secs: f32,
}

impl Default for ActuationConfig {
    fn default() -> Self {
        ActuationConfig {
            interpolation_secs: 3.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct BridgeConfig {
    pub translator: TranslatorConfig,
    pub pipeline: PipelineConfig,
    pub actuation: ActuationConfig,
}

impl ConfigFile for BridgeConfig {}

lazy_static! {
    static ref INCLUDED_CONFIG: BridgeConfig = {
        let yaml = include_str!("../config/bridge.yaml");
        BridgeConfig::parse_yaml(yaml).unwrap()
    };
}

impl BridgeConfig {
    /// Configuration packaged with the binary
    pub fn included() -> BridgeConfig {
        INCLUDED_CONFIG.clone()
    }
}
