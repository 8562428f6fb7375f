use crate::frame::CapturedBuffer;

pub trait DeviceCamera: Send + Sync {
    fn name(&self) -> &str;
    fn is_available(&self) -> bool;
    fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Blocks until the next sample is ready.
    fn capture_frame(&self) -> Result<CapturedBuffer, Box<dyn std::error::Error + Send + Sync>>;
}
