use crate::device_display::interface::DeviceDisplay;
use eframe::egui;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// The egui side of `DeviceDisplayGui`. Must be run on the main thread.
pub struct ResultWindow {
    text: Arc<Mutex<String>>,
    close_requested: Arc<AtomicBool>,
}

/// Asks a running `ResultWindow` to close from any thread.
#[derive(Clone)]
pub struct WindowCloser {
    close_requested: Arc<AtomicBool>,
}

impl WindowCloser {
    pub fn close(&self) {
        self.close_requested.store(true, Ordering::SeqCst);
    }
}

impl ResultWindow {
    pub fn closer(&self) -> WindowCloser {
        WindowCloser {
            close_requested: self.close_requested.clone(),
        }
    }

    fn current_text(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Blocks until the window is closed by the user or through a `WindowCloser`.
    pub fn run(self) -> Result<(), eframe::Error> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([480.0, 200.0])
                .with_resizable(true),
            ..Default::default()
        };

        eframe::run_native(
            "Object Detection",
            options,
            Box::new(move |_cc| Box::new(self)),
        )
    }
}

impl eframe::App for ResultWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.close_requested.load(Ordering::SeqCst) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        let text = self.current_text();

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::from_rgb(20, 20, 20)))
            .show(ctx, |ui| {
                ui.add_space(12.0);
                for line in text.lines() {
                    ui.label(
                        egui::RichText::new(line)
                            .monospace()
                            .color(egui::Color32::WHITE)
                            .size(18.0),
                    );
                }
            });

        // Results arrive from outside the egui event loop.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

/// Publishes text for a `ResultWindow`. The window itself is driven by
/// whoever owns the main thread.
pub struct DeviceDisplayGui {
    text: Arc<Mutex<String>>,
    close_requested: Arc<AtomicBool>,
}

impl DeviceDisplayGui {
    pub fn new() -> Self {
        Self {
            text: Arc::new(Mutex::new(String::new())),
            close_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn window(&self) -> ResultWindow {
        ResultWindow {
            text: self.text.clone(),
            close_requested: self.close_requested.clone(),
        }
    }
}

impl Default for DeviceDisplayGui {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDisplay for DeviceDisplayGui {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.close_requested.load(Ordering::SeqCst) {
            return Err("result window was already closed".into());
        }
        Ok(())
    }

    fn show_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        *self.text.lock().unwrap_or_else(PoisonError::into_inner) = text.to_string();
        Ok(())
    }
}
