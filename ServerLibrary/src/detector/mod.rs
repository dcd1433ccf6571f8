pub mod stub;
pub mod yolo;

use image::RgbImage;
use Common::detection::object::DetectedObject;

/// Black-box interface to the pretrained object detection model.
///
/// Implementations are constructed once at startup and shared read-only
/// across request handlers.
pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self, image: &RgbImage) -> Result<Vec<DetectedObject>, String>;
}
