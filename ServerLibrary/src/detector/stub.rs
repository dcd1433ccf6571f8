use image::RgbImage;
use Common::detection::object::DetectedObject;
use crate::detector::Detector;

/// Canned-response detector for tests and for running the service without
/// model weights.
pub struct StubDetector {
    objects: Vec<DetectedObject>,
}

impl StubDetector {
    pub fn new(objects: Vec<DetectedObject>) -> Self {
        Self {
            objects,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Detector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&self, _image: &RgbImage) -> Result<Vec<DetectedObject>, String> {
        Ok(self.objects.clone())
    }
}
