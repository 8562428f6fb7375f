use std::path::PathBuf;
use thiserror::Error;

/// Conditions that make the session pointless to run. Never retried.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no video camera available")]
    NoCameraDevice,
    #[error("camera '{name}' failed to start: {reason}")]
    CameraStart { name: String, reason: String },
    #[error("capture session is already running")]
    AlreadyRunning,
    #[error("could not load model {path:?}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },
    #[error("could not load labels {path:?}: {reason}")]
    LabelsLoad { path: PathBuf, reason: String },
    #[error("display failed to initialize: {0}")]
    Display(String),
    #[error("could not spawn {name} thread: {source}")]
    ThreadSpawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame has zero dimensions ({width}x{height})")]
    ZeroDimensions { width: u32, height: u32 },
    #[error("malformed frame buffer: expected {expected} bytes, got {actual}")]
    MalformedBuffer { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    #[error("could not prepare model input: {0}")]
    Preprocess(String),
    #[error("inference failed: {0}")]
    Inference(String),
}
