use crate::config::Config;
use crate::error::ClassifyError;
use crate::image_classifier::interface::Observation;
use crate::result_filter::{filter, DisplayResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    Running {
        last_applied_sequence: Option<u64>,
        display_result: DisplayResult,
    },
    Stopped,
}

#[derive(Debug)]
pub enum Msg {
    ClassificationDone {
        sequence: u64,
        result: Result<Vec<Observation>, ClassifyError>,
    },
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Render { text: String },
    StopCapture,
}

pub fn init() -> (Model, Vec<Effect>) {
    (
        Model::Running {
            last_applied_sequence: None,
            display_result: DisplayResult::default(),
        },
        vec![Effect::Render {
            text: String::new(),
        }],
    )
}

pub fn transition(config: &Config, model: Model, msg: Msg) -> (Model, Vec<Effect>) {
    match (model, msg) {
        (Model::Stopped, _) => (Model::Stopped, vec![]),

        (Model::Running { .. }, Msg::Stop) => (Model::Stopped, vec![Effect::StopCapture]),

        (
            Model::Running {
                last_applied_sequence,
                display_result,
            },
            Msg::ClassificationDone { sequence, result },
        ) => {
            let is_stale = last_applied_sequence.is_some_and(|last| sequence <= last);

            match result {
                Ok(observations) if !is_stale => {
                    let display_result = filter(
                        &observations,
                        config.recognition_threshold,
                        config.max_results,
                    );
                    let text = display_result.as_str().to_string();
                    (
                        Model::Running {
                            last_applied_sequence: Some(sequence),
                            display_result,
                        },
                        vec![Effect::Render { text }],
                    )
                }
                // stale, or failed: keep showing what is already there
                _ => (
                    Model::Running {
                        last_applied_sequence,
                        display_result,
                    },
                    vec![],
                ),
            }
        }
    }
}
