use crate::device_camera::interface::DeviceCamera;
use crate::frame::{CameraIntrinsics, CapturedBuffer, PixelFormat};
use crate::library::logger::interface::Logger;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Produces random-noise BGRA frames at a fixed pace.
pub struct DeviceCameraFake {
    logger: Arc<dyn Logger + Send + Sync>,
    width: u32,
    height: u32,
    frame_interval: Duration,
    available: bool,
    intrinsics: Option<CameraIntrinsics>,
    started: AtomicBool,
}

impl DeviceCameraFake {
    pub fn new(
        logger: Arc<dyn Logger + Send + Sync>,
        width: u32,
        height: u32,
        frame_interval: Duration,
    ) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            width,
            height,
            frame_interval,
            available: true,
            intrinsics: None,
            started: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn with_intrinsics(mut self, intrinsics: CameraIntrinsics) -> Self {
        self.intrinsics = Some(intrinsics);
        self
    }
}

impl DeviceCamera for DeviceCameraFake {
    fn name(&self) -> &str {
        "fake"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.available {
            return Err("fake camera is unplugged".into());
        }
        self.logger.info("Camera started")?;
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.started.swap(false, Ordering::SeqCst) {
            self.logger.info("Camera stopped")?;
        }
        Ok(())
    }

    fn capture_frame(&self) -> Result<CapturedBuffer, Box<dyn std::error::Error + Send + Sync>> {
        if !self.started.load(Ordering::SeqCst) {
            return Err("fake camera is not started".into());
        }

        std::thread::sleep(self.frame_interval);

        let mut data = vec![0u8; self.width as usize * self.height as usize * 4];
        rand::rng().fill(&mut data[..]);
        for alpha in data.iter_mut().skip(3).step_by(4) {
            *alpha = u8::MAX;
        }

        Ok(CapturedBuffer {
            width: self.width,
            height: self.height,
            pixel_format: PixelFormat::Bgra8,
            data,
            intrinsics: self.intrinsics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_console::LoggerConsole;

    fn camera() -> DeviceCameraFake {
        let logger = Arc::new(LoggerConsole::new(chrono::FixedOffset::east_opt(0).unwrap()));
        DeviceCameraFake::new(logger, 4, 3, Duration::from_millis(1))
    }

    #[test]
    fn test_capture_requires_start() {
        let camera = camera();
        assert!(camera.capture_frame().is_err());
        camera.start().unwrap();
        let buffer = camera.capture_frame().unwrap();
        assert_eq!((buffer.width, buffer.height), (4, 3));
        assert_eq!(buffer.data.len(), 4 * 3 * 4);
        assert!(buffer.data.iter().skip(3).step_by(4).all(|a| *a == 255));
        camera.stop().unwrap();
        camera.stop().unwrap();
        assert!(camera.capture_frame().is_err());
    }

    #[test]
    fn test_unavailable_camera_refuses_to_start() {
        let camera = camera().unavailable();
        assert!(!camera.is_available());
        assert!(camera.start().is_err());
    }
}
