use std::error::Error;

/// Where the formatted results end up. Only ever driven from the UI thread.
pub trait DeviceDisplay: Send + Sync {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Replaces everything on screen with `text` (may span several lines).
    fn show_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.show_text("")
    }
}
