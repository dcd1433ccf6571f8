pub mod bounding_box;
pub mod coco_classes;
pub mod object;
pub mod vehicle_class;
