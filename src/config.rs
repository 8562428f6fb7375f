use crate::frame::orientation::{Orientation, VideoOrientation};
use crate::frame::CameraIntrinsics;
use crate::image_classifier::models::model_config::ModelConfig;
use chrono::Offset;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum CameraConfig {
    Fake {
        width: u32,
        height: u32,
        intrinsics: Option<CameraIntrinsics>,
    },
    StillImage {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Console,
    Gui,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub recognition_threshold: f32,
    pub max_results: usize,
    pub frame_interval: Duration,
    pub always_discard_late_frames: bool,
    pub video_orientation: VideoOrientation,
    pub camera_mount_orientation: Orientation,
    pub camera: CameraConfig,
    pub model: Option<ModelConfig>,
    pub display: DisplayKind,
    pub logger_timezone: chrono::FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recognition_threshold: 0.25,
            max_results: 5,
            frame_interval: Duration::from_millis(33),
            always_discard_late_frames: true,
            video_orientation: VideoOrientation::Portrait,
            camera_mount_orientation: Orientation::UpMirrored,
            camera: CameraConfig::Fake {
                width: 640,
                height: 480,
                intrinsics: None,
            },
            model: None,
            display: DisplayKind::Console,
            logger_timezone: mountain_standard_time(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `OBJECT_DETECTION_*` overrides. Unparseable values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(threshold) = lookup("OBJECT_DETECTION_THRESHOLD")
            .and_then(|value| value.trim().parse::<f32>().ok())
            .filter(|value| (0.0..=1.0).contains(value))
        {
            self.recognition_threshold = threshold;
        }

        if let Some(model_path) = lookup("OBJECT_DETECTION_MODEL") {
            let mut model = ModelConfig::resnet50(&model_path);
            if let Some(labels_path) = lookup("OBJECT_DETECTION_LABELS") {
                model.labels_path = PathBuf::from(labels_path);
            }
            self.model = Some(model);
        }

        if let Some(path) = lookup("OBJECT_DETECTION_IMAGE") {
            self.camera = CameraConfig::StillImage {
                path: PathBuf::from(path),
            };
        }

        if let Some(orientation) = lookup("OBJECT_DETECTION_MOUNT").and_then(|value| {
            value
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(Orientation::from_exif_value)
                .or_else(|| Orientation::from_name(value.trim()))
        }) {
            self.camera_mount_orientation = orientation;
        }

        if let Some(display) = lookup("OBJECT_DETECTION_DISPLAY") {
            self.display = match display.to_lowercase().as_str() {
                "gui" => DisplayKind::Gui,
                _ => DisplayKind::Console,
            };
        }

        self
    }
}

fn mountain_standard_time() -> chrono::FixedOffset {
    chrono::FixedOffset::west_opt(7 * 3600).unwrap_or_else(|| chrono::Utc.fix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.recognition_threshold, 0.25);
        assert_eq!(config.max_results, 5);
        assert!(config.always_discard_late_frames);
        assert_eq!(config.video_orientation, VideoOrientation::Portrait);
        assert_eq!(config.camera_mount_orientation, Orientation::UpMirrored);
        assert!(config.model.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(lookup(&[
            ("OBJECT_DETECTION_THRESHOLD", "0.5"),
            ("OBJECT_DETECTION_MODEL", "/models/resnet50.onnx"),
            ("OBJECT_DETECTION_LABELS", "/models/imagenet.txt"),
            ("OBJECT_DETECTION_IMAGE", "/tmp/cat.jpeg"),
            ("OBJECT_DETECTION_MOUNT", "1"),
            ("OBJECT_DETECTION_DISPLAY", "GUI"),
        ]));

        assert_eq!(config.recognition_threshold, 0.5);
        let model = config.model.unwrap();
        assert_eq!(model.onnx_model_path, PathBuf::from("/models/resnet50.onnx"));
        assert_eq!(model.labels_path, PathBuf::from("/models/imagenet.txt"));
        assert_eq!(
            config.camera,
            CameraConfig::StillImage {
                path: PathBuf::from("/tmp/cat.jpeg")
            }
        );
        assert_eq!(config.camera_mount_orientation, Orientation::Up);
        assert_eq!(config.display, DisplayKind::Gui);
    }

    #[test]
    fn test_out_of_range_threshold_is_ignored() {
        let config =
            Config::default().with_overrides(lookup(&[("OBJECT_DETECTION_THRESHOLD", "1.5")]));
        assert_eq!(config.recognition_threshold, 0.25);
    }
}
