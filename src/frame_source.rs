use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::error::StartupError;
use crate::frame::orientation::VideoOrientation;
use crate::frame::Frame;
use crate::library::latest_slot::{LatestSlot, PushOutcome};
use crate::library::logger::interface::Logger;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const CAPTURE_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Receives frames one at a time on the capture thread. The next frame is not
/// delivered until `on_frame` returns.
pub trait FrameHandler: Send + Sync {
    fn on_frame(&self, frame: Frame);
}

#[derive(Default)]
struct FrameSourceStats {
    captured: AtomicU64,
    delivered: AtomicU64,
    discarded_late: AtomicU64,
    capture_errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSourceStatsSnapshot {
    pub captured: u64,
    pub delivered: u64,
    pub discarded_late: u64,
    pub capture_errors: u64,
}

pub struct FrameSource {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    device_camera: Option<Arc<dyn DeviceCamera + Send + Sync>>,
    running: Arc<AtomicBool>,
    sequence: Arc<AtomicU64>,
    slot: Option<Arc<LatestSlot<Frame>>>,
    threads: Vec<JoinHandle<()>>,
    stats: Arc<FrameSourceStats>,
}

impl FrameSource {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Option<Arc<dyn DeviceCamera + Send + Sync>>,
    ) -> Self {
        Self {
            config,
            logger: logger.with_namespace("frame_source"),
            device_camera,
            running: Arc::new(AtomicBool::new(false)),
            sequence: Arc::new(AtomicU64::new(0)),
            slot: None,
            threads: Vec::new(),
            stats: Arc::new(FrameSourceStats::default()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> FrameSourceStatsSnapshot {
        FrameSourceStatsSnapshot {
            captured: self.stats.captured.load(Ordering::SeqCst),
            delivered: self.stats.delivered.load(Ordering::SeqCst),
            discarded_late: self.stats.discarded_late.load(Ordering::SeqCst),
            capture_errors: self.stats.capture_errors.load(Ordering::SeqCst),
        }
    }

    pub fn start(&mut self, handler: Arc<dyn FrameHandler + Send + Sync>) -> Result<(), StartupError> {
        if self.is_running() {
            return Err(StartupError::AlreadyRunning);
        }

        let device = self
            .device_camera
            .clone()
            .ok_or(StartupError::NoCameraDevice)?;
        if !device.is_available() {
            return Err(StartupError::NoCameraDevice);
        }

        device.start().map_err(|e| StartupError::CameraStart {
            name: device.name().to_string(),
            reason: e.to_string(),
        })?;

        let orientation = self.config.video_orientation;
        let _ = self.logger.info(&format!(
            "Camera '{}' started, connection orientation {:?}, discard late frames: {}",
            device.name(),
            orientation,
            self.config.always_discard_late_frames
        ));

        let slot = Arc::new(LatestSlot::new());
        self.running.store(true, Ordering::SeqCst);

        let producer = {
            let producer = Producer {
                device: device.clone(),
                slot: slot.clone(),
                running: self.running.clone(),
                sequence: self.sequence.clone(),
                stats: self.stats.clone(),
                logger: self.logger.clone(),
                orientation,
                discard_late: self.config.always_discard_late_frames,
            };
            thread::Builder::new()
                .name("camera".to_string())
                .spawn(move || producer.run())
        };
        let producer = match producer {
            Ok(handle) => handle,
            Err(source) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = device.stop();
                return Err(StartupError::ThreadSpawn {
                    name: "camera",
                    source,
                });
            }
        };

        let consumer = {
            let slot = slot.clone();
            let stats = self.stats.clone();
            thread::Builder::new()
                .name("capture".to_string())
                .spawn(move || {
                    while let Some(frame) = slot.take() {
                        stats.delivered.fetch_add(1, Ordering::SeqCst);
                        handler.on_frame(frame);
                    }
                })
        };
        let consumer = match consumer {
            Ok(handle) => handle,
            Err(source) => {
                self.running.store(false, Ordering::SeqCst);
                slot.close();
                let _ = device.stop();
                let _ = producer.join();
                return Err(StartupError::ThreadSpawn {
                    name: "capture",
                    source,
                });
            }
        };

        self.slot = Some(slot);
        self.threads = vec![producer, consumer];
        Ok(())
    }

    /// Halts delivery. Frames still waiting in the slot are dropped.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(slot) = self.slot.take() {
            slot.close();
        }

        if let Some(device) = &self.device_camera {
            if let Err(e) = device.stop() {
                let _ = self.logger.error(&format!("Camera failed to stop: {}", e));
            }
        }

        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                let _ = self.logger.error("Capture thread panicked");
            }
        }

        let stats = self.stats();
        let _ = self.logger.info(&format!(
            "Capture stopped: {} captured, {} delivered, {} discarded late",
            stats.captured, stats.delivered, stats.discarded_late
        ));
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Producer {
    device: Arc<dyn DeviceCamera + Send + Sync>,
    slot: Arc<LatestSlot<Frame>>,
    running: Arc<AtomicBool>,
    sequence: Arc<AtomicU64>,
    stats: Arc<FrameSourceStats>,
    logger: Arc<dyn Logger + Send + Sync>,
    orientation: VideoOrientation,
    discard_late: bool,
}

impl Producer {
    fn run(self) {
        while self.running.load(Ordering::SeqCst) {
            let buffer = match self.device.capture_frame() {
                Ok(buffer) => buffer,
                Err(e) => {
                    if !self.running.load(Ordering::SeqCst) {
                        break;
                    }
                    self.stats.capture_errors.fetch_add(1, Ordering::SeqCst);
                    let _ = self.logger.error(&format!("Capture failed: {}", e));
                    thread::sleep(CAPTURE_RETRY_DELAY);
                    continue;
                }
            };

            let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            self.stats.captured.fetch_add(1, Ordering::SeqCst);
            let frame = Frame::new(sequence, Utc::now(), self.orientation, buffer);

            let outcome = if self.discard_late {
                self.slot.push_latest(frame)
            } else {
                self.slot.put_blocking(frame)
            };

            match outcome {
                PushOutcome::Stored => {}
                PushOutcome::Displaced => {
                    self.stats.discarded_late.fetch_add(1, Ordering::SeqCst);
                }
                PushOutcome::Closed => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_camera::impl_fake::DeviceCameraFake;
    use crate::library::logger::impl_console::LoggerConsole;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct RecordingHandler {
        delay: Duration,
        frames: Mutex<Vec<(u64, VideoOrientation)>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl RecordingHandler {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                frames: Mutex::new(Vec::new()),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
            })
        }

        fn sequences(&self) -> Vec<u64> {
            self.frames.lock().unwrap().iter().map(|(s, _)| *s).collect()
        }
    }

    impl FrameHandler for RecordingHandler {
        fn on_frame(&self, frame: Frame) {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);
            thread::sleep(self.delay);
            self.frames
                .lock()
                .unwrap()
                .push((frame.sequence(), frame.connection_orientation()));
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn logger() -> Arc<dyn Logger + Send + Sync> {
        Arc::new(LoggerConsole::new(chrono::FixedOffset::east_opt(0).unwrap()))
    }

    fn fake_camera(interval: Duration) -> Arc<DeviceCameraFake> {
        Arc::new(DeviceCameraFake::new(logger(), 4, 4, interval))
    }

    fn wait_for(condition: impl Fn() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("condition not met in time");
    }

    #[test]
    fn test_missing_device_is_fatal() {
        let mut source = FrameSource::new(Config::default(), logger(), None);
        let result = source.start(RecordingHandler::new(Duration::ZERO));
        assert!(matches!(result, Err(StartupError::NoCameraDevice)));
        assert!(!source.is_running());
    }

    #[test]
    fn test_unavailable_device_is_fatal() {
        let camera = Arc::new(
            DeviceCameraFake::new(logger(), 4, 4, Duration::from_millis(1)).unavailable(),
        );
        let mut source = FrameSource::new(Config::default(), logger(), Some(camera));
        let result = source.start(RecordingHandler::new(Duration::ZERO));
        assert!(matches!(result, Err(StartupError::NoCameraDevice)));
    }

    #[test]
    fn test_delivers_portrait_frames_in_order() {
        let handler = RecordingHandler::new(Duration::ZERO);
        let mut source = FrameSource::new(
            Config::default(),
            logger(),
            Some(fake_camera(Duration::from_millis(2))),
        );

        source.start(handler.clone()).unwrap();
        wait_for(|| handler.frames.lock().unwrap().len() >= 5);
        source.stop();

        let frames = handler.frames.lock().unwrap().clone();
        assert!(frames
            .iter()
            .all(|(_, orientation)| *orientation == VideoOrientation::Portrait));
        let sequences = handler.sequences();
        assert!(sequences.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(handler.max_active.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_is_idempotent_and_halts_delivery() {
        let handler = RecordingHandler::new(Duration::ZERO);
        let mut source = FrameSource::new(
            Config::default(),
            logger(),
            Some(fake_camera(Duration::from_millis(1))),
        );

        source.stop();
        source.start(handler.clone()).unwrap();
        wait_for(|| !handler.frames.lock().unwrap().is_empty());
        source.stop();
        source.stop();

        let delivered = handler.frames.lock().unwrap().len();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(handler.frames.lock().unwrap().len(), delivered);
        assert!(!source.is_running());
    }

    #[test]
    fn test_second_start_is_rejected() {
        let mut source = FrameSource::new(
            Config::default(),
            logger(),
            Some(fake_camera(Duration::from_millis(1))),
        );
        source.start(RecordingHandler::new(Duration::ZERO)).unwrap();
        let again = source.start(RecordingHandler::new(Duration::ZERO));
        assert!(matches!(again, Err(StartupError::AlreadyRunning)));
    }

    #[test]
    fn test_slow_handler_causes_late_frames_to_be_discarded() {
        let handler = RecordingHandler::new(Duration::from_millis(20));
        let mut source = FrameSource::new(
            Config::default(),
            logger(),
            Some(fake_camera(Duration::from_millis(1))),
        );

        source.start(handler.clone()).unwrap();
        wait_for(|| handler.frames.lock().unwrap().len() >= 4);
        source.stop();

        assert!(source.stats().discarded_late > 0);
        let sequences = handler.sequences();
        assert!(sequences.windows(2).any(|pair| pair[1] - pair[0] > 1));
    }

    #[test]
    fn test_without_late_discard_every_frame_is_delivered() {
        let config = Config {
            always_discard_late_frames: false,
            ..Config::default()
        };
        let handler = RecordingHandler::new(Duration::from_millis(5));
        let mut source = FrameSource::new(
            config,
            logger(),
            Some(fake_camera(Duration::from_millis(1))),
        );

        source.start(handler.clone()).unwrap();
        wait_for(|| handler.frames.lock().unwrap().len() >= 5);
        source.stop();

        assert_eq!(source.stats().discarded_late, 0);
        let sequences = handler.sequences();
        assert!(sequences.windows(2).all(|pair| pair[1] == pair[0] + 1));
    }
}
