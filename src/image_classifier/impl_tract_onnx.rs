use crate::error::{ClassifyError, StartupError};
use crate::image_classifier::interface::{
    ClassificationContext, ClassificationRequest, ImageClassifier, Observation,
};
use crate::image_classifier::models::model_config::ModelConfig;
use crate::image_classifier::tract::image::{crop_and_scale, image_to_tensor};
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use tract_onnx::prelude::*;

pub struct ImageClassifierTractOnnx {
    model: TypedRunnableModel<TypedModel>,
    labels: Vec<String>,
    request: ClassificationRequest,
    config: ModelConfig,
    logger: Arc<dyn Logger + Send + Sync>,
    intrinsics_logged: AtomicBool,
}

impl ImageClassifierTractOnnx {
    pub fn new(
        config: ModelConfig,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, StartupError> {
        let (height, width) = config.input_shape;
        let model_error = |reason: String| StartupError::ModelLoad {
            path: config.onnx_model_path.clone(),
            reason,
        };

        let model = tract_onnx::onnx()
            .model_for_path(&config.onnx_model_path)
            .and_then(|model| {
                model.with_input_fact(
                    0,
                    f32::fact([1, 3, height as usize, width as usize]).into(),
                )
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| model_error(e.to_string()))?;

        let labels = load_labels(&config.labels_path)?;

        let logger = logger.with_namespace("classifier").with_namespace("tract_onnx");
        let _ = logger.info(&format!(
            "Loaded {:?} with {} labels",
            config.onnx_model_path,
            labels.len()
        ));

        Ok(Self {
            model,
            labels,
            request: ClassificationRequest {
                crop_and_scale: config.crop_and_scale,
                input_width: width,
                input_height: height,
            },
            config,
            logger,
            intrinsics_logged: AtomicBool::new(false),
        })
    }
}

impl ImageClassifier for ImageClassifierTractOnnx {
    fn request(&self) -> &ClassificationRequest {
        &self.request
    }

    fn classify(
        &self,
        image: &DynamicImage,
        context: &ClassificationContext,
    ) -> Result<Vec<Observation>, ClassifyError> {
        log_intrinsics_once(self.logger.as_ref(), &self.intrinsics_logged, context);

        let input = crop_and_scale(image, &self.request);
        let tensor = image_to_tensor(&input, self.config.mean, self.config.std);

        let outputs = self
            .model
            .run(tvec!(tensor.into_tvalue()))
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| ClassifyError::Inference("model produced no outputs".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        let mut scores: Vec<f32> = output.iter().copied().collect();
        if self.config.apply_softmax {
            softmax(&mut scores);
        }

        Ok(rank(&scores, &self.labels))
    }
}

/// Reports the camera intrinsics of the first frame that carries them.
fn log_intrinsics_once(logger: &dyn Logger, logged: &AtomicBool, context: &ClassificationContext) {
    let Some(intrinsics) = context.intrinsics else {
        return;
    };
    if logged.swap(true, AtomicOrdering::Relaxed) {
        return;
    }
    let (fx, fy) = intrinsics.focal_length();
    let (cx, cy) = intrinsics.principal_point();
    let _ = logger.info(&format!(
        "Frames carry intrinsics f=({}, {}) c=({}, {})",
        fx, fy, cx, cy
    ));
}

pub fn load_labels(path: &Path) -> Result<Vec<String>, StartupError> {
    let contents = std::fs::read_to_string(path).map_err(|e| StartupError::LabelsLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let labels: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if labels.is_empty() {
        return Err(StartupError::LabelsLoad {
            path: path.to_path_buf(),
            reason: "file contains no labels".to_string(),
        });
    }

    Ok(labels)
}

pub fn softmax(scores: &mut [f32]) {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for score in scores.iter_mut() {
        *score = (*score - max).exp();
        sum += *score;
    }
    if sum > 0.0 {
        for score in scores.iter_mut() {
            *score /= sum;
        }
    }
}

/// Pairs scores with labels, highest confidence first.
pub fn rank(scores: &[f32], labels: &[String]) -> Vec<Observation> {
    let mut observations: Vec<Observation> = scores
        .iter()
        .enumerate()
        .map(|(index, &confidence)| {
            let label = labels
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("class_{}", index));
            Observation { label, confidence }
        })
        .collect();

    observations.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    observations
}
