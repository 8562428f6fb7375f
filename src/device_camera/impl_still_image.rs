use crate::device_camera::interface::DeviceCamera;
use crate::frame::{CapturedBuffer, PixelFormat};
use crate::library::logger::interface::Logger;
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Replays one decoded image file as a live stream.
pub struct DeviceCameraStillImage {
    logger: Arc<dyn Logger + Send + Sync>,
    path: PathBuf,
    frame_interval: Duration,
    image: Mutex<Option<RgbaImage>>,
}

impl DeviceCameraStillImage {
    pub fn new(
        logger: Arc<dyn Logger + Send + Sync>,
        path: PathBuf,
        frame_interval: Duration,
    ) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("still_image"),
            path,
            frame_interval,
            image: Mutex::new(None),
        }
    }
}

impl DeviceCamera for DeviceCameraStillImage {
    fn name(&self) -> &str {
        "still_image"
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let image = image::open(&self.path)?.to_rgba8();
        self.logger.info(&format!(
            "Loaded {:?} ({}x{})",
            self.path,
            image.width(),
            image.height()
        ))?;
        *self.image.lock().unwrap_or_else(PoisonError::into_inner) = Some(image);
        Ok(())
    }

    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.image
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }

    fn capture_frame(&self) -> Result<CapturedBuffer, Box<dyn std::error::Error + Send + Sync>> {
        std::thread::sleep(self.frame_interval);

        let guard = self.image.lock().unwrap_or_else(PoisonError::into_inner);
        let image = guard.as_ref().ok_or("still image camera is not started")?;

        Ok(CapturedBuffer {
            width: image.width(),
            height: image.height(),
            pixel_format: PixelFormat::Rgba8,
            data: image.as_raw().clone(),
            intrinsics: None,
        })
    }
}
