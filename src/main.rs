use config::{Config, DisplayKind};
use device_display::impl_console::DeviceDisplayConsole;
use device_display::impl_gui::DeviceDisplayGui;
use device_display::interface::DeviceDisplay;
use image_classifier::impl_fake::ImageClassifierFake;
use image_classifier::impl_tract_onnx::ImageClassifierTractOnnx;
use image_classifier::interface::ImageClassifier;
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use object_detection::main::ObjectDetection;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

mod config;
mod device_camera;
mod device_display;
mod error;
mod frame;
mod frame_dispatcher;
mod frame_source;
mod image_classifier;
mod library;
mod object_detection;
mod result_filter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let device_camera = device_camera::default_device(&config, logger.clone());

    let image_classifier: Arc<dyn ImageClassifier + Send + Sync> = match &config.model {
        Some(model_config) => {
            match ImageClassifierTractOnnx::new(model_config.clone(), logger.clone()) {
                Ok(classifier) => Arc::new(classifier),
                Err(e) => {
                    let _ = logger.error(&format!("Could not load model: {}", e));
                    return Err(e.into());
                }
            }
        }
        None => Arc::new(ImageClassifierFake::new(
            logger.clone(),
            Duration::from_millis(150),
        )),
    };

    let gui = (config.display == DisplayKind::Gui).then(DeviceDisplayGui::new);
    let result_window = gui.as_ref().map(DeviceDisplayGui::window);
    let device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>> = match gui {
        Some(display) => Arc::new(Mutex::new(display)),
        None => Arc::new(Mutex::new(DeviceDisplayConsole::new())),
    };

    let mut object_detection = ObjectDetection::new(
        config,
        logger.clone(),
        device_camera,
        image_classifier,
        device_display,
    );

    if let Err(e) = object_detection.start() {
        let _ = logger.error(&format!("Startup failed: {}", e));
        return Err(e.into());
    }

    let stop_handle = object_detection.stop_handle();
    let interrupt = stop_handle.clone();
    if let Err(e) = ctrlc::set_handler(move || interrupt.stop()) {
        let _ = logger.error(&format!("Could not install Ctrl-C handler: {}", e));
    }

    let Some(window) = result_window else {
        object_detection.run();
        log_session_stats(logger.as_ref(), &object_detection);
        return Ok(());
    };

    // winit wants its event loop on the main thread, so the session moves.
    let closer = window.closer();
    let session = thread::Builder::new()
        .name("session".to_string())
        .spawn(move || {
            object_detection.run();
            closer.close();
            object_detection
        })?;

    if let Err(e) = window.run() {
        let _ = logger.error(&format!("Result window failed: {}", e));
    }
    stop_handle.stop();

    match session.join() {
        Ok(object_detection) => log_session_stats(logger.as_ref(), &object_detection),
        Err(_) => {
            let _ = logger.error("Session thread panicked");
        }
    }

    Ok(())
}

fn log_session_stats(logger: &dyn Logger, object_detection: &ObjectDetection) {
    let capture = object_detection.frame_source_stats();
    let dispatch = object_detection.dispatcher_stats();
    let _ = logger.info(&format!(
        "Session ended: {} frames captured, {} discarded late, {} classified, {} dropped busy, {} malformed, {} failed, {} discarded after stop",
        capture.captured,
        capture.discarded_late,
        dispatch.completed,
        dispatch.dropped_busy,
        dispatch.dropped_malformed,
        dispatch.failed,
        dispatch.discarded
    ));
}
