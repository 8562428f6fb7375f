use super::main::ObjectDetection;
use crate::object_detection::core::Effect;
use std::sync::PoisonError;

impl ObjectDetection {
    pub fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Render { text } => {
                let shown = self
                    .device_display
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .show_text(&text);
                if let Err(e) = shown {
                    let _ = self.logger.error(&format!("Display update failed: {}", e));
                }
            }
            Effect::StopCapture => {
                let _ = self.logger.info("Stopping capture");
                self.stop();
            }
        }
    }
}
