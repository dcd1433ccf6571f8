use serde::{Serialize, Deserialize};
use crate::detection::coco_classes;
use crate::detection::bounding_box::BoundingBox;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DetectedObject {
    pub class_id: usize,
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}

impl DetectedObject {
    pub fn new(class_id: usize, confidence: f32, bounding_box: BoundingBox) -> Self {
        Self {
            class_id,
            confidence,
            bounding_box,
        }
    }

    pub fn class_name(&self) -> &'static str {
        coco_classes::class_name(self.class_id)
    }
}
