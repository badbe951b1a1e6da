use crate::artifacts::{ArtifactError, ArtifactSink};
use crate::config::PipelineConfig;
use crate::landmarks::Frame;
use crate::record::FrameRecord;
use crate::validator;
use std::path::PathBuf;

/// Name of the debug image for frame `index`.
///
/// Incomplete frames carry a `_bad` marker so a directory listing alone tells
/// them apart.
pub fn image_file_name(index: usize, complete: bool, extension: &str) -> String {
    if complete {
        format!("frame_{:04}.{}", index, extension)
    } else {
        format!("frame_{:04}_bad.{}", index, extension)
    }
}

/// Summary of one pipeline run. Collections keep arrival order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineResult {
    pub total_frames: usize,
    pub valid_frames: usize,
    pub invalid_frames: usize,
    /// Complete frames only, ready for translation
    pub valid_landmarks: Vec<Frame>,
    pub all_landmarks: Vec<Frame>,
    pub valid_image_paths: Vec<PathBuf>,
    pub invalid_image_paths: Vec<PathBuf>,
    pub valid_landmarks_document: Option<PathBuf>,
    pub all_landmarks_document: Option<PathBuf>,
}

impl PipelineResult {
    /// An empty result is a legitimate outcome the caller has to handle.
    pub fn has_valid_frames(&self) -> bool {
        !self.valid_landmarks.is_empty()
    }
}

/// Splits a sequence of frame records into complete and incomplete frames,
/// writing debug artifacts on the way.
#[derive(Debug, Clone, Default)]
pub struct FramePipeline {
    config: PipelineConfig,
}

impl FramePipeline {
    pub fn new(config: PipelineConfig) -> FramePipeline {
        FramePipeline { config }
    }

    pub fn process_frames<I, S>(&self, records: I, sink: &mut S) -> PipelineResult
    where
        I: IntoIterator<Item = FrameRecord>,
        S: ArtifactSink + ?Sized,
    {
        let mut result = PipelineResult::default();

        for (index, record) in records.into_iter().enumerate() {
            let (frame, visualization) = record.into_parts(&self.config.visualization_key);
            let complete = validator::is_complete(&frame);
            tracing::debug!(index, complete, "classified frame");

            let image_path = match visualization {
                Some(payload) => self.persist_image(sink, index, complete, &payload),
                None => None,
            };

            result.total_frames += 1;
            if complete {
                result.valid_landmarks.push(frame.clone());
                result.valid_image_paths.extend(image_path);
            } else {
                result.invalid_image_paths.extend(image_path);
            }
            result.all_landmarks.push(frame);
        }

        result.valid_frames = result.valid_landmarks.len();
        result.invalid_frames = result.total_frames - result.valid_frames;

        result.valid_landmarks_document =
            persist_landmarks(sink, &self.config.valid_landmarks_file, &result.valid_landmarks);
        result.all_landmarks_document =
            persist_landmarks(sink, &self.config.all_landmarks_file, &result.all_landmarks);

        tracing::info!(
            total = result.total_frames,
            valid = result.valid_frames,
            invalid = result.invalid_frames,
            "processed frames"
        );
        result
    }

    fn persist_image<S: ArtifactSink + ?Sized>(
        &self,
        sink: &mut S,
        index: usize,
        complete: bool,
        payload: &str,
    ) -> Option<PathBuf> {
        let file_name = image_file_name(index, complete, &self.config.image_extension);
        match sink.write_image(&file_name, payload) {
            Ok(path) => Some(path),
            Err(error) => {
                tracing::warn!(index, %file_name, %error, "failed to save frame visualization");
                None
            }
        }
    }
}

fn persist_landmarks<S: ArtifactSink + ?Sized>(
    sink: &mut S,
    file_name: &str,
    frames: &[Frame],
) -> Option<PathBuf> {
    let written = serde_json::to_string_pretty(frames)
        .map_err(ArtifactError::from)
        .and_then(|json| sink.write_document(file_name, &json));
    match written {
        Ok(path) => Some(path),
        Err(error) => {
            tracing::warn!(%file_name, %error, "failed to save landmarks document");
            None
        }
    }
}

/// Run the pipeline with default settings
pub fn process_frames<I, S>(records: I, sink: &mut S) -> PipelineResult
where
    I: IntoIterator<Item = FrameRecord>,
    S: ArtifactSink + ?Sized,
{
    FramePipeline::default().process_frames(records, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::MemoryArtifactSink;
    use crate::landmarks::Keypoint;

    const KEY: &str = "visualization_base64";
    const PAYLOAD: &str = "aGVsbG8=";

    fn complete_frame(seed: f32) -> Frame {
        let point = |offset: f32| Keypoint::new(seed, seed + offset, 0.0);
        Frame::upper_body(
            (point(0.0), point(1.0), point(2.0)),
            (point(0.0), point(1.0), point(2.0)),
        )
    }

    /// Five frames, 1 and 3 missing the right wrist
    fn five_records(with_images: bool) -> Vec<FrameRecord> {
        (0..5)
            .map(|index| {
                let mut frame = complete_frame(index as f32);
                if index % 2 == 1 {
                    frame = frame.without("Right wrist");
                }
                let visualization = if with_images { Some((KEY, PAYLOAD)) } else { None };
                FrameRecord::from_frame(&frame, visualization)
            })
            .collect()
    }

    /// Rejects every image and document
    struct BrokenSink;

    impl ArtifactSink for BrokenSink {
        fn write_image(&mut self, _: &str, _: &str) -> Result<PathBuf, ArtifactError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }

        fn write_document(&mut self, _: &str, _: &str) -> Result<PathBuf, ArtifactError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    #[test]
    fn image_names_mark_validity() {
        assert_eq!(image_file_name(3, true, "png"), "frame_0003.png");
        assert_eq!(image_file_name(12, false, "png"), "frame_0012_bad.png");
        assert_eq!(image_file_name(12345, true, "jpg"), "frame_12345.jpg");
    }

    #[test]
    fn empty_sequence() {
        let mut sink = MemoryArtifactSink::default();
        let result = process_frames(Vec::new(), &mut sink);
        assert_eq!(result.total_frames, 0);
        assert_eq!(result.valid_frames, 0);
        assert_eq!(result.invalid_frames, 0);
        assert!(result.valid_landmarks.is_empty());
        assert!(result.all_landmarks.is_empty());
        assert!(!result.has_valid_frames());
        assert_eq!(sink.documents["landmarks_valid.json"], "[]");
    }

    #[test]
    fn partitions_and_keeps_order() {
        let mut sink = MemoryArtifactSink::default();
        let result = process_frames(five_records(false), &mut sink);

        assert_eq!(result.total_frames, 5);
        assert_eq!(result.valid_frames, 3);
        assert_eq!(result.invalid_frames, 2);
        assert_eq!(
            result.valid_landmarks,
            vec![complete_frame(0.0), complete_frame(2.0), complete_frame(4.0)]
        );
        assert_eq!(result.all_landmarks.len(), 5);
        assert_eq!(
            result.all_landmarks[1],
            complete_frame(1.0).without("Right wrist")
        );
        // no payloads, no images
        assert!(sink.images.is_empty());
        assert!(result.valid_image_paths.is_empty());
        assert!(result.invalid_image_paths.is_empty());
    }

    #[test]
    fn images_named_by_index_and_validity() {
        let mut sink = MemoryArtifactSink::default();
        let result = process_frames(five_records(true), &mut sink);

        let names = |paths: &[PathBuf]| -> Vec<String> {
            paths.iter().map(|p| p.display().to_string()).collect()
        };
        assert_eq!(
            names(&result.valid_image_paths),
            vec!["frame_0000.png", "frame_0002.png", "frame_0004.png"]
        );
        assert_eq!(
            names(&result.invalid_image_paths),
            vec!["frame_0001_bad.png", "frame_0003_bad.png"]
        );
        assert_eq!(sink.images["frame_0002.png"], b"hello".to_vec());
    }

    #[test]
    fn landmarks_exclude_visualization() {
        let mut sink = MemoryArtifactSink::default();
        let result = process_frames(five_records(true), &mut sink);
        for frame in &result.all_landmarks {
            assert!(frame.entry(KEY).is_none());
        }
        let saved: Vec<Frame> =
            serde_json::from_str(&sink.documents["landmarks_valid.json"]).unwrap();
        assert_eq!(saved, result.valid_landmarks);
        let saved_all: Vec<Frame> =
            serde_json::from_str(&sink.documents["landmarks_all.json"]).unwrap();
        assert_eq!(saved_all, result.all_landmarks);
        assert_eq!(
            result.valid_landmarks_document,
            Some(PathBuf::from("landmarks_valid.json"))
        );
    }

    #[test]
    fn failed_images_do_not_abort() {
        let result = process_frames(five_records(true), &mut BrokenSink);
        assert_eq!(result.total_frames, 5);
        assert_eq!(result.valid_frames, 3);
        assert_eq!(result.invalid_frames, 2);
        assert!(result.valid_image_paths.is_empty());
        assert!(result.invalid_image_paths.is_empty());
        assert!(result.valid_landmarks_document.is_none());
        assert!(result.all_landmarks_document.is_none());
    }

    #[test]
    fn undecodable_payload_only_drops_that_image() {
        let mut records = five_records(true);
        records[2] = FrameRecord::from_frame(&complete_frame(2.0), Some((KEY, "%%%")));
        let mut sink = MemoryArtifactSink::default();
        let result = process_frames(records, &mut sink);
        assert_eq!(result.valid_frames, 3);
        assert_eq!(result.valid_image_paths.len(), 2);
        assert!(!sink.images.contains_key("frame_0002.png"));
    }

    #[test]
    fn present_but_null_coordinate_is_valid() {
        let frame = complete_frame(0.0)
            .with_entry("Left shoulder", serde_json::json!({"x": null, "y": 0.0, "z": 0.0}));
        let mut sink = MemoryArtifactSink::default();
        let result = process_frames(vec![FrameRecord::from_frame(&frame, None)], &mut sink);
        assert_eq!(result.total_frames, 1);
        assert_eq!(result.valid_frames, 1);
        assert_eq!(result.invalid_frames, 0);
    }

    #[test]
    fn documents_keep_extra_fields() {
        let visible = |seed: f32| serde_json::json!({"x": seed, "y": seed, "z": 0.0, "visibility": 0.9});
        let frame = Frame::new()
            .with_entry("Right wrist", visible(2.0))
            .with_entry("Right elbow", visible(1.0))
            .with_entry("Right shoulder", visible(0.0))
            .with_entry("Left wrist", visible(2.0))
            .with_entry("Left elbow", visible(1.0))
            .with_entry("Left shoulder", visible(0.0))
            .with_entry("frame_time", serde_json::json!(0.25));
        let mut sink = MemoryArtifactSink::default();
        let result = process_frames(
            vec![FrameRecord::from_frame(&frame, Some((KEY, PAYLOAD)))],
            &mut sink,
        );
        assert_eq!(result.valid_frames, 1);

        let saved: serde_json::Value =
            serde_json::from_str(&sink.documents["landmarks_valid.json"]).unwrap();
        let saved = saved[0].as_object().unwrap();
        assert_eq!(saved["Left wrist"]["visibility"], 0.9);
        assert_eq!(saved["frame_time"], 0.25);
        assert!(!saved.contains_key(KEY));
        let names: Vec<&str> = saved.keys().map(String::as_str).collect();
        assert_eq!(names[0], "Right wrist");
        assert_eq!(names[6], "frame_time");
    }

    #[test]
    fn custom_visualization_key() {
        let config = PipelineConfig {
            visualization_key: "overlay".to_owned(),
            image_extension: "jpg".to_owned(),
            ..Default::default()
        };
        let record = FrameRecord::from_frame(&complete_frame(0.0), Some(("overlay", PAYLOAD)));
        let mut sink = MemoryArtifactSink::default();
        let result = FramePipeline::new(config).process_frames(vec![record], &mut sink);
        assert_eq!(result.valid_image_paths, vec![PathBuf::from("frame_0000.jpg")]);
        assert_eq!(result.valid_landmarks, vec![complete_frame(0.0)]);
    }
}
