use crate::image_classifier::interface::CropAndScale;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub onnx_model_path: PathBuf,
    pub labels_path: PathBuf,
    /// (height, width)
    pub input_shape: (u32, u32),
    pub crop_and_scale: CropAndScale,
    pub mean: [f32; 3],
    pub std: [f32; 3],
    pub apply_softmax: bool,
}

impl ModelConfig {
    /// ImageNet-trained ResNet50 with a `<model>.txt` labels file beside it.
    pub fn resnet50(onnx_model_path: impl AsRef<Path>) -> Self {
        let onnx_model_path = onnx_model_path.as_ref().to_path_buf();
        Self {
            labels_path: onnx_model_path.with_extension("txt"),
            onnx_model_path,
            input_shape: (224, 224),
            crop_and_scale: CropAndScale::CenterCrop,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
            apply_softmax: true,
        }
    }
}
