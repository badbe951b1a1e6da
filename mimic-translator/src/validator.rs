//! Completeness check run before a frame is handed to the translator.
//!
//! Only presence is checked. Values are never inspected, so a frame full of
//! NaN still counts as complete.

use crate::landmarks::{Frame, Landmark, LandmarkError};

pub const REQUIRED_LANDMARKS: [Landmark; 6] = Landmark::ALL;

/// First required landmark or coordinate missing from `frame`, if any.
pub fn first_gap(frame: &Frame) -> Option<LandmarkError> {
    REQUIRED_LANDMARKS
        .iter()
        .find_map(|landmark| frame.keypoint(*landmark).err())
}

pub fn is_complete(frame: &Frame) -> bool {
    first_gap(frame).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Axis, Coordinates, Keypoint};

    fn complete_frame(value: f32) -> Frame {
        let point = Keypoint::new(value, value, value);
        Frame::upper_body((point, point, point), (point, point, point))
    }

    #[test]
    fn complete_frame_passes() {
        assert!(is_complete(&complete_frame(0.5)));
    }

    #[test]
    fn values_are_not_inspected() {
        assert!(is_complete(&complete_frame(f32::NAN)));
        assert!(is_complete(&complete_frame(1e9)));
        assert!(is_complete(&complete_frame(-42.0)));
    }

    #[test]
    fn garbage_values_count_as_present() {
        for garbage in [
            serde_json::json!(null),
            serde_json::json!("0.1"),
            serde_json::json!([1, 2]),
        ] {
            let entry = serde_json::json!({"x": garbage, "y": 0.1, "z": 0.1});
            let frame = complete_frame(0.1).with_entry("Right elbow", entry);
            assert!(is_complete(&frame));
        }
    }

    #[test]
    fn extra_landmarks_are_ignored() {
        let frame = complete_frame(0.1).with_keypoint("Nose", Keypoint::default());
        assert!(is_complete(&frame));
    }

    #[test]
    fn each_missing_landmark_fails() {
        for landmark in REQUIRED_LANDMARKS {
            let frame = complete_frame(0.1).without(landmark.name());
            assert!(!is_complete(&frame), "{} missing but accepted", landmark);
            assert_eq!(
                first_gap(&frame),
                Some(LandmarkError::MissingLandmark(landmark))
            );
        }
    }

    #[test]
    fn each_missing_coordinate_fails() {
        for landmark in REQUIRED_LANDMARKS {
            for axis in Axis::ALL {
                let mut coordinates = Coordinates::from(Keypoint::new(0.1, 0.2, 0.3));
                match axis {
                    Axis::X => coordinates.x = None,
                    Axis::Y => coordinates.y = None,
                    Axis::Z => coordinates.z = None,
                }
                let frame = complete_frame(0.1).with_coordinates(landmark.name(), coordinates);
                assert_eq!(
                    first_gap(&frame),
                    Some(LandmarkError::MissingCoordinate { landmark, axis })
                );
            }
        }
    }

    #[test]
    fn empty_frame_fails_on_first_landmark() {
        assert_eq!(
            first_gap(&Frame::new()),
            Some(LandmarkError::MissingLandmark(Landmark::LeftShoulder))
        );
    }
}
