use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::device_display::interface::DeviceDisplay;
use crate::error::StartupError;
use crate::frame_dispatcher::{DispatcherStatsSnapshot, FrameDispatcher};
use crate::frame_source::{FrameSource, FrameSourceStatsSnapshot};
use crate::image_classifier::interface::ImageClassifier;
use crate::library::logger::interface::Logger;
use crate::object_detection::core::{init, transition, Model, Msg};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

/// Requests shutdown of a running session from any thread.
#[derive(Clone)]
pub struct StopHandle {
    event_sender: Sender<Msg>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.event_sender.send(Msg::Stop);
    }
}

/// One capture session. The thread that calls `run` is the UI thread: it is
/// the only one that touches the display.
pub struct ObjectDetection {
    pub config: Config,
    pub logger: Arc<dyn Logger + Send + Sync>,
    pub model: Model,
    pub frame_source: FrameSource,
    pub frame_dispatcher: FrameDispatcher,
    pub device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    event_sender: Sender<Msg>,
    event_receiver: Receiver<Msg>,
    ui_alive: Arc<AtomicBool>,
}

impl ObjectDetection {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Option<Arc<dyn DeviceCamera + Send + Sync>>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    ) -> Self {
        let logger = logger.with_namespace("object_detection");
        let (event_sender, event_receiver) = channel();
        let ui_alive = Arc::new(AtomicBool::new(false));

        let frame_source = FrameSource::new(config.clone(), logger.clone(), device_camera);
        let frame_dispatcher = FrameDispatcher::new(
            config.clone(),
            logger.clone(),
            image_classifier,
            event_sender.clone(),
            ui_alive.clone(),
        );

        Self {
            model: init().0,
            config,
            logger,
            frame_source,
            frame_dispatcher,
            device_display,
            event_sender,
            event_receiver,
            ui_alive,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            event_sender: self.event_sender.clone(),
        }
    }

    pub fn start(&mut self) -> Result<(), StartupError> {
        self.device_display
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .init()
            .map_err(|e| StartupError::Display(e.to_string()))?;

        let (model, effects) = init();
        self.model = model;
        self.run_effects(effects);

        self.ui_alive.store(true, Ordering::SeqCst);
        if let Err(e) = self
            .frame_source
            .start(Arc::new(self.frame_dispatcher.clone()))
        {
            self.ui_alive.store(false, Ordering::SeqCst);
            return Err(e);
        }

        let _ = self.logger.info(&format!(
            "Session started, recognition threshold {}",
            self.config.recognition_threshold
        ));
        Ok(())
    }

    /// Processes completions until a stop is requested.
    pub fn run(&mut self) {
        while !matches!(self.model, Model::Stopped) {
            let Ok(msg) = self.event_receiver.recv() else {
                break;
            };
            self.update(msg);
        }
        self.stop();
    }

    pub fn update(&mut self, msg: Msg) {
        let model = std::mem::replace(&mut self.model, Model::Stopped);
        let (model, effects) = transition(&self.config, model, msg);
        self.model = model;
        self.run_effects(effects);
    }

    /// Halts capture. Inferences already running finish and are discarded.
    pub fn stop(&mut self) {
        self.ui_alive.store(false, Ordering::SeqCst);
        self.frame_source.stop();
    }

    pub fn frame_source_stats(&self) -> FrameSourceStatsSnapshot {
        self.frame_source.stats()
    }

    pub fn dispatcher_stats(&self) -> DispatcherStatsSnapshot {
        self.frame_dispatcher.stats()
    }
}

impl Drop for ObjectDetection {
    fn drop(&mut self) {
        self.stop();
    }
}
