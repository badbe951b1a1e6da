use nalgebra as na;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("missing landmark: {0}")]
    MissingLandmark(Landmark),
    #[error("missing coordinate '{axis}' for {landmark}")]
    MissingCoordinate { landmark: Landmark, axis: Axis },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("side must be 'L' or 'R', got {0:?}")]
pub struct SideParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Mirrored sign conventions for one side of the body.
///
/// Every side-dependent sign lives here so left and right stay symmetric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideConvention {
    /// Left rolls outwards positive, right negative
    pub shoulder_roll_sign: f32,
    /// Left bends negative, right positive
    pub elbow_roll_sign: f32,
    /// Fixed elbow yaw in radians
    pub elbow_yaw: f32,
}

const LEFT_CONVENTION: SideConvention = SideConvention {
    shoulder_roll_sign: 1.0,
    elbow_roll_sign: -1.0,
    elbow_yaw: -1.3,
};

const RIGHT_CONVENTION: SideConvention = SideConvention {
    shoulder_roll_sign: -1.0,
    elbow_roll_sign: 1.0,
    elbow_yaw: 1.3,
};

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub const fn convention(self) -> &'static SideConvention {
        match self {
            Side::Left => &LEFT_CONVENTION,
            Side::Right => &RIGHT_CONVENTION,
        }
    }

    pub const fn shoulder(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftShoulder,
            Side::Right => Landmark::RightShoulder,
        }
    }

    pub const fn elbow(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftElbow,
            Side::Right => Landmark::RightElbow,
        }
    }

    pub const fn wrist(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftWrist,
            Side::Right => Landmark::RightWrist,
        }
    }
}

impl FromStr for Side {
    type Err = SideParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" | "l" | "Left" | "left" => Ok(Side::Left),
            "R" | "r" | "Right" | "right" => Ok(Side::Right),
            other => Err(SideParseError(other.to_owned())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "L"),
            Side::Right => write!(f, "R"),
        }
    }
}

/// Upper body landmarks the translator needs, in the order the pose service
/// reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Landmark {
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
}

impl Landmark {
    pub const ALL: [Landmark; 6] = [
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftWrist,
        Landmark::RightWrist,
    ];

    /// Key used by the pose service
    pub const fn name(self) -> &'static str {
        match self {
            Landmark::LeftShoulder => "Left shoulder",
            Landmark::RightShoulder => "Right shoulder",
            Landmark::LeftElbow => "Left elbow",
            Landmark::RightElbow => "Right elbow",
            Landmark::LeftWrist => "Left wrist",
            Landmark::RightWrist => "Right wrist",
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Key of the axis inside a landmark entry
    pub const fn key(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A fully specified landmark position.
///
/// Coordinates are whatever the detector emits; nothing here rescales them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, z: f32) -> Keypoint {
        Keypoint { x, y, z }
    }

    pub fn position(&self) -> na::Vector3<f32> {
        na::Vector3::new(self.x, self.y, self.z)
    }

    /// Projection onto the image plane
    pub fn planar(&self) -> na::Vector2<f32> {
        na::Vector2::new(self.x, self.y)
    }
}

/// Presence view of one landmark entry.
///
/// An axis is `Some` as soon as its key exists. Values that aren't numbers
/// read as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl Coordinates {
    pub fn from_entry(entry: &Value) -> Coordinates {
        let axis = |axis: Axis| {
            entry
                .get(axis.key())
                .map(|value| value.as_f64().map_or(f32::NAN, |v| v as f32))
        };
        Coordinates {
            x: axis(Axis::X),
            y: axis(Axis::Y),
            z: axis(Axis::Z),
        }
    }

    /// Object holding the present axes. NaN is written as `null`.
    pub fn to_entry(&self) -> Value {
        let mut point = Map::new();
        for axis in Axis::ALL {
            if let Some(value) = self.axis(axis) {
                point.insert(axis.key().to_owned(), Value::from(value));
            }
        }
        Value::Object(point)
    }

    pub fn axis(&self, axis: Axis) -> Option<f32> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn missing_axis(&self) -> Option<Axis> {
        Axis::ALL
            .iter()
            .copied()
            .find(|axis| self.axis(*axis).is_none())
    }

    pub fn to_keypoint(&self) -> Option<Keypoint> {
        Some(Keypoint::new(self.x?, self.y?, self.z?))
    }
}

impl From<Keypoint> for Coordinates {
    fn from(keypoint: Keypoint) -> Self {
        Coordinates {
            x: Some(keypoint.x),
            y: Some(keypoint.y),
            z: Some(keypoint.z),
        }
    }
}

/// Landmarks detected at a single instant, keyed by name.
///
/// Entries are kept as reported, in their original order, including fields
/// and entries nothing here reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame {
    entries: Map<String, Value>,
}

impl From<Map<String, Value>> for Frame {
    fn from(entries: Map<String, Value>) -> Self {
        Frame { entries }
    }
}

impl Frame {
    pub fn new() -> Frame {
        Frame::default()
    }

    /// Frame with all six upper body landmarks set
    pub fn upper_body(
        left: (Keypoint, Keypoint, Keypoint),
        right: (Keypoint, Keypoint, Keypoint),
    ) -> Frame {
        Frame::new()
            .with_keypoint(Landmark::LeftShoulder.name(), left.0)
            .with_keypoint(Landmark::LeftElbow.name(), left.1)
            .with_keypoint(Landmark::LeftWrist.name(), left.2)
            .with_keypoint(Landmark::RightShoulder.name(), right.0)
            .with_keypoint(Landmark::RightElbow.name(), right.1)
            .with_keypoint(Landmark::RightWrist.name(), right.2)
    }

    pub fn with_keypoint(self, name: &str, keypoint: Keypoint) -> Frame {
        self.with_coordinates(name, keypoint.into())
    }

    pub fn with_coordinates(self, name: &str, coordinates: Coordinates) -> Frame {
        self.with_entry(name, coordinates.to_entry())
    }

    /// Insert or replace a raw entry
    pub fn with_entry(mut self, name: &str, entry: Value) -> Frame {
        self.entries.insert(name.to_owned(), entry);
        self
    }

    pub fn without(mut self, name: &str) -> Frame {
        self.entries.retain(|key, _| key != name);
        self
    }

    pub fn entry(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn coordinates(&self, name: &str) -> Option<Coordinates> {
        self.entry(name).map(Coordinates::from_entry)
    }

    /// Resolve a required landmark, naming the first thing that's missing.
    pub fn keypoint(&self, landmark: Landmark) -> Result<Keypoint, LandmarkError> {
        let coordinates = self
            .coordinates(landmark.name())
            .ok_or(LandmarkError::MissingLandmark(landmark))?;
        let value = |axis| {
            coordinates
                .axis(axis)
                .ok_or(LandmarkError::MissingCoordinate { landmark, axis })
        };
        Ok(Keypoint::new(
            value(Axis::X)?,
            value(Axis::Y)?,
            value(Axis::Z)?,
        ))
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn into_entries(self) -> Map<String, Value> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
