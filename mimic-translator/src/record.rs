use crate::landmarks::Frame;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("error while parsing json")]
    DeserializationError(#[from] serde_json::Error),
    #[error("pose response is not a list of frames")]
    NotAList,
    #[error("frame {0} is not an object")]
    NotAnObject(usize),
    #[error("frame is not an object")]
    NotAFrame,
}

/// One per-frame record as the pose service returns it: landmark name to
/// coordinates, plus an optional encoded visualization image.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRecord {
    fields: Map<String, Value>,
}

impl FrameRecord {
    pub fn new(fields: Map<String, Value>) -> FrameRecord {
        FrameRecord { fields }
    }

    /// Record carrying `frame` and, optionally, a visualization payload
    pub fn from_frame(frame: &Frame, visualization: Option<(&str, &str)>) -> FrameRecord {
        let mut fields = frame.entries().clone();
        if let Some((key, payload)) = visualization {
            fields.insert(key.to_owned(), Value::String(payload.to_owned()));
        }
        FrameRecord { fields }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Separate the visualization payload from the landmarks.
    ///
    /// Everything else stays in the frame untouched and in order.
    pub fn into_parts(self, visualization_key: &str) -> (Frame, Option<String>) {
        let mut visualization = None;
        let mut entries = Map::new();
        for (name, value) in self.fields {
            if name == visualization_key {
                visualization = Some(match value {
                    Value::String(payload) => payload,
                    other => other.to_string(),
                });
            } else {
                entries.insert(name, value);
            }
        }
        (Frame::from(entries), visualization)
    }
}

const NON_FINITE: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Python's json writer emits bare `NaN` and `Infinity` for non-finite
/// floats. Turn those tokens into `null` so the key stays present.
fn replace_non_finite(text: &str) -> Cow<'_, str> {
    if !NON_FINITE.iter().any(|token| text.contains(token)) {
        return Cow::Borrowed(text);
    }

    let mut output = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = NON_FINITE.iter().find(|token| rest.starts_with(**token)) {
            output.push_str("null");
            rest = &rest[token.len()..];
            continue;
        }
        output.push(c);
        rest = &rest[c.len_utf8()..];
    }
    Cow::Owned(output)
}

/// Parse a pose service response listing one record per sampled frame.
pub fn parse_records(text: &str) -> Result<Vec<FrameRecord>, RecordError> {
    let value: Value = serde_json::from_str(&replace_non_finite(text))?;
    let Value::Array(items) = value else {
        return Err(RecordError::NotAList);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(FrameRecord::new(fields)),
            _ => Err(RecordError::NotAnObject(index)),
        })
        .collect()
}

/// Parse a single record, as sent for a still image.
pub fn parse_record(text: &str) -> Result<FrameRecord, RecordError> {
    let value: Value = serde_json::from_str(&replace_non_finite(text))?;
    match value {
        Value::Object(fields) => Ok(FrameRecord::new(fields)),
        _ => Err(RecordError::NotAFrame),
    }
}
