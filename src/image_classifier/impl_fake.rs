use crate::error::ClassifyError;
use crate::image_classifier::interface::{
    ClassificationContext, ClassificationRequest, CropAndScale, ImageClassifier, Observation,
};
use crate::image_classifier::tract::image::crop_and_scale;
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use rand::distr::{Distribution, Uniform};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;

const LABELS: [&str; 18] = [
    "dog", "cat", "person", "car", "chair", "table", "bird", "tree", "bicycle", "book", "laptop",
    "phone", "cup", "bottle", "keyboard", "mouse", "plant", "clock",
];

/// Stands in for a real model: random labels, random ranked confidences.
pub struct ImageClassifierFake {
    logger: Arc<dyn Logger + Send + Sync>,
    request: ClassificationRequest,
    latency: Duration,
}

impl ImageClassifierFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, latency: Duration) -> Self {
        let logger = logger.with_namespace("classifier").with_namespace("fake");
        let _ = logger.info(
            "No model configured (set OBJECT_DETECTION_MODEL): results are simulated with random labels",
        );

        Self {
            logger,
            request: ClassificationRequest {
                crop_and_scale: CropAndScale::CenterCrop,
                input_width: 224,
                input_height: 224,
            },
            latency,
        }
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn request(&self) -> &ClassificationRequest {
        &self.request
    }

    fn classify(
        &self,
        image: &DynamicImage,
        _context: &ClassificationContext,
    ) -> Result<Vec<Observation>, ClassifyError> {
        let input = crop_and_scale(image, &self.request);
        let _ = self.logger.info(&format!(
            "Classifying {}x{} input",
            input.width(),
            input.height()
        ));

        std::thread::sleep(self.latency);

        let mut rng = rand::rng();
        let confidence_dist =
            Uniform::new(0.0f32, 1.0).map_err(|e| ClassifyError::Inference(e.to_string()))?;

        let mut labels = LABELS.to_vec();
        labels.shuffle(&mut rng);

        let mut remaining = 1.0f32;
        let mut observations = labels
            .into_iter()
            .map(|label| {
                let confidence = remaining * confidence_dist.sample(&mut rng);
                remaining -= confidence;
                Observation::new(label, confidence)
            })
            .collect::<Vec<_>>();

        observations.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_console::LoggerConsole;
    use crate::library::logger::impl_fake::LoggerFake;

    #[test]
    fn test_fake_output_is_ranked_and_bounded() {
        let logger = Arc::new(LoggerConsole::new(chrono::FixedOffset::east_opt(0).unwrap()));
        let classifier = ImageClassifierFake::new(logger, Duration::ZERO);
        let image = DynamicImage::new_rgb8(32, 24);

        let observations = classifier
            .classify(&image, &ClassificationContext::default())
            .unwrap();

        assert_eq!(observations.len(), LABELS.len());
        assert!(observations
            .windows(2)
            .all(|pair| pair[0].confidence >= pair[1].confidence));
        let total: f32 = observations.iter().map(|o| o.confidence).sum();
        assert!(total <= 1.0 + 1e-5);
        assert!(observations.iter().all(|o| (0.0..=1.0).contains(&o.confidence)));
    }

    #[test]
    fn test_announces_simulated_results_once() {
        let logger = LoggerFake::new();
        let classifier = ImageClassifierFake::new(Arc::new(logger.clone()), Duration::ZERO);
        let image = DynamicImage::new_rgb8(8, 8);
        for _ in 0..3 {
            classifier
                .classify(&image, &ClassificationContext::default())
                .unwrap();
        }

        let notices = logger
            .lines()
            .into_iter()
            .filter(|line| line.contains("results are simulated"))
            .collect::<Vec<_>>();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].starts_with("INFO classifier:fake:"));
    }
}
