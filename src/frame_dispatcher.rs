use crate::config::Config;
use crate::error::ClassifyError;
use crate::frame::Frame;
use crate::frame_source::FrameHandler;
use crate::image_classifier::interface::{ClassificationContext, ImageClassifier, Observation};
use crate::library::logger::interface::Logger;
use crate::object_detection::core::Msg;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

/// Held for the lifetime of one inference. Dropping it frees the slot.
struct InFlightGuard {
    in_flight: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(in_flight: &Arc<AtomicBool>) -> Option<Self> {
        in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                in_flight: in_flight.clone(),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[derive(Default)]
struct DispatcherStats {
    received: AtomicU64,
    dropped_busy: AtomicU64,
    dropped_malformed: AtomicU64,
    started: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    discarded: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStatsSnapshot {
    pub received: u64,
    pub dropped_busy: u64,
    pub dropped_malformed: u64,
    pub started: u64,
    pub completed: u64,
    pub failed: u64,
    /// Finished after the display went away.
    pub discarded: u64,
}

/// Bridges the capture thread to the classifier with at most one inference
/// outstanding. Frames arriving while one is running are dropped.
#[derive(Clone)]
pub struct FrameDispatcher {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    event_sender: Sender<Msg>,
    ui_alive: Arc<AtomicBool>,
    in_flight: Arc<AtomicBool>,
    stats: Arc<DispatcherStats>,
}

impl FrameDispatcher {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
        event_sender: Sender<Msg>,
        ui_alive: Arc<AtomicBool>,
    ) -> Self {
        let logger = logger.with_namespace("frame_dispatcher");
        let request = image_classifier.request();
        let _ = logger.info(&format!(
            "Classifier input {}x{} ({:?}), mount orientation {:?}",
            request.input_width,
            request.input_height,
            request.crop_and_scale,
            config.camera_mount_orientation
        ));

        Self {
            config,
            logger,
            image_classifier,
            event_sender,
            ui_alive,
            in_flight: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(DispatcherStats::default()),
        }
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            received: self.stats.received.load(Ordering::SeqCst),
            dropped_busy: self.stats.dropped_busy.load(Ordering::SeqCst),
            dropped_malformed: self.stats.dropped_malformed.load(Ordering::SeqCst),
            started: self.stats.started.load(Ordering::SeqCst),
            completed: self.stats.completed.load(Ordering::SeqCst),
            failed: self.stats.failed.load(Ordering::SeqCst),
            discarded: self.stats.discarded.load(Ordering::SeqCst),
        }
    }

    fn complete(&self, sequence: u64, result: Result<Vec<Observation>, ClassifyError>) {
        self.stats.completed.fetch_add(1, Ordering::SeqCst);

        match &result {
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::SeqCst);
                let _ = self
                    .logger
                    .error(&format!("Frame {}: {}", sequence, e));
            }
            Ok(observations) if observations.is_empty() => {
                let _ = self.logger.info(&format!("Frame {}: no results", sequence));
            }
            Ok(_) => {}
        }

        if !self.ui_alive.load(Ordering::SeqCst) {
            self.stats.discarded.fetch_add(1, Ordering::SeqCst);
            let _ = self.logger.info(&format!(
                "Frame {}: display is gone, discarding result",
                sequence
            ));
            return;
        }

        if self
            .event_sender
            .send(Msg::ClassificationDone { sequence, result })
            .is_err()
        {
            self.stats.discarded.fetch_add(1, Ordering::SeqCst);
            let _ = self.logger.info(&format!(
                "Frame {}: display is gone, discarding result",
                sequence
            ));
        }
    }
}

impl FrameHandler for FrameDispatcher {
    fn on_frame(&self, frame: Frame) {
        self.stats.received.fetch_add(1, Ordering::SeqCst);

        let Some(guard) = InFlightGuard::acquire(&self.in_flight) else {
            self.stats.dropped_busy.fetch_add(1, Ordering::SeqCst);
            return;
        };

        let sequence = frame.sequence();
        let (width, height) = frame.dimensions();
        let description = format!(
            "Frame {} ({}x{} {:?}, captured {})",
            sequence,
            width,
            height,
            frame.pixel_format(),
            frame.captured_at().format("%H:%M:%S%.3f")
        );
        let context = ClassificationContext {
            intrinsics: frame.intrinsics(),
        };

        let image = match frame.into_image() {
            Ok(image) => self.config.camera_mount_orientation.normalize(image),
            Err(e) => {
                self.stats.dropped_malformed.fetch_add(1, Ordering::SeqCst);
                let _ = self
                    .logger
                    .error(&format!("{} dropped: {}", description, e));
                return;
            }
        };

        self.stats.started.fetch_add(1, Ordering::SeqCst);

        let dispatcher = self.clone();
        let spawned = thread::Builder::new()
            .name("inference".to_string())
            .spawn(move || {
                let _guard = guard;
                let result = dispatcher.image_classifier.classify(&image, &context);
                dispatcher.complete(sequence, result);
            });

        if let Err(e) = spawned {
            self.stats.failed.fetch_add(1, Ordering::SeqCst);
            let _ = self.logger.error(&format!(
                "Frame {} dropped: could not start inference: {}",
                sequence, e
            ));
        }
    }
}
