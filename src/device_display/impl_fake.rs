use crate::device_display::interface::DeviceDisplay;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};

/// Records every update so callers can inspect what would have been shown.
#[derive(Clone, Default)]
pub struct DeviceDisplayFake {
    history: Arc<Mutex<Vec<String>>>,
    initialized: bool,
    fail_init: bool,
}

impl DeviceDisplayFake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DeviceDisplay for DeviceDisplayFake {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.fail_init {
            return Err("display unavailable".into());
        }
        self.initialized = true;
        Ok(())
    }

    fn show_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        if !self.initialized {
            return Err("display not initialized".into());
        }
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
        Ok(())
    }
}
