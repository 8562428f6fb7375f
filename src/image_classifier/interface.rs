use crate::error::ClassifyError;
use crate::frame::CameraIntrinsics;
use image::DynamicImage;

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub label: String,
    pub confidence: f32,
}

impl Observation {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropAndScale {
    #[default]
    CenterCrop,
    ScaleFit,
    ScaleFill,
}

/// Built once per session and shared read-only with the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    pub crop_and_scale: CropAndScale,
    pub input_width: u32,
    pub input_height: u32,
}

/// Optional per-frame metadata passed alongside the image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationContext {
    pub intrinsics: Option<CameraIntrinsics>,
}

pub trait ImageClassifier: Send + Sync {
    fn request(&self) -> &ClassificationRequest;

    /// Returns observations ranked by descending confidence. An empty vector
    /// means "no results" and is not an error.
    fn classify(
        &self,
        image: &DynamicImage,
        context: &ClassificationContext,
    ) -> Result<Vec<Observation>, ClassifyError>;
}
