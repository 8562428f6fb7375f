pub mod impl_fake;
pub mod impl_still_image;
pub mod interface;

use crate::config::{CameraConfig, Config};
use crate::library::logger::interface::Logger;
use impl_fake::DeviceCameraFake;
use impl_still_image::DeviceCameraStillImage;
use interface::DeviceCamera;
use std::sync::Arc;

/// The configured video device, or `None` when it cannot exist.
pub fn default_device(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Option<Arc<dyn DeviceCamera + Send + Sync>> {
    match &config.camera {
        CameraConfig::Fake {
            width,
            height,
            intrinsics,
        } => {
            let camera = DeviceCameraFake::new(logger, *width, *height, config.frame_interval);
            Some(Arc::new(match intrinsics {
                Some(intrinsics) => camera.with_intrinsics(*intrinsics),
                None => camera,
            }))
        }
        CameraConfig::StillImage { path } => {
            let camera = DeviceCameraStillImage::new(logger, path.clone(), config.frame_interval);
            if camera.is_available() {
                Some(Arc::new(camera))
            } else {
                None
            }
        }
    }
}
