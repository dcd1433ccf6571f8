use std::fs;
use chrono::Local;
use image::{Rgb, RgbImage};
use imageproc::rect::Rect;
use ab_glyph::{FontVec, PxScale};
use sanitize_filename::sanitize;
use std::path::{Path, PathBuf};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use Common::detection::object::DetectedObject;
use crate::utils::config::Config;

/// Renders detected boxes and the vehicle count onto a copy of the source
/// image.
pub struct Annotator {
    font: FontVec,
    font_size: f32,
    border_width: u32,
    border_color: Rgb<u8>,
    text_color: Rgb<u8>,
}

impl Annotator {
    pub fn new(config: &Config) -> Result<Self, String> {
        let font_path = config.font_path.clone();
        let font_data = fs::read(&font_path)
            .map_err(|err| format!("Annotator: Cannot read font {font_path}.\nReason: {err}"))?;
        let font = FontVec::try_from_vec(font_data)
            .map_err(|err| format!("Annotator: Invalid font {font_path}.\nReason: {err}"))?;
        Ok(Self {
            font,
            font_size: config.font_size,
            border_width: config.border_width,
            border_color: Rgb(config.border_color),
            text_color: Rgb(config.text_color),
        })
    }

    pub fn render(&self, image: &RgbImage, objects: &[DetectedObject], vehicle_count: usize) -> RgbImage {
        let mut annotated = image.clone();
        let scale = PxScale::from(self.font_size);
        for object in objects {
            let bounding_box = &object.bounding_box;
            if bounding_box.width() == 0 || bounding_box.height() == 0 {
                continue;
            }
            let base_rectangle = Rect::at(bounding_box.xmin as i32, bounding_box.ymin as i32)
                .of_size(bounding_box.width(), bounding_box.height());
            for i in 0..self.border_width {
                let offset_rectangle = Rect::at(base_rectangle.left() - i as i32, base_rectangle.top() - i as i32)
                    .of_size(base_rectangle.width() + 2 * i, base_rectangle.height() + 2 * i);
                draw_hollow_rect_mut(&mut annotated, offset_rectangle, self.border_color);
            }
            let text = format!("{name}: {confidence:.2}", name = object.class_name(), confidence = object.confidence);
            let position_x = bounding_box.xmin as i32;
            let position_y = (bounding_box.ymax + self.border_width + 10) as i32;
            draw_text_mut(&mut annotated, self.text_color, position_x, position_y, scale, &self.font, &text);
        }
        let count_text = format!("Count: {vehicle_count}");
        draw_text_mut(&mut annotated, self.text_color, 20, 40, scale, &self.font, &count_text);
        annotated
    }

    /// Annotated copies are named after the uploaded file, or a timestamp
    /// when the upload carried no name.
    pub fn output_name(source_name: Option<&str>) -> String {
        let mut name = match source_name.map(sanitize).filter(|name| !name.is_empty()) {
            Some(name) => format!("server_{name}"),
            None => format!("server_{}.jpg", Local::now().format("%Y%m%d_%H%M%S")),
        };
        if Path::new(&name).extension().is_none() {
            name.push_str(".jpg");
        }
        name
    }

    pub fn save(image: &RgbImage, results_folder: &Path, output_name: &str) -> Result<PathBuf, String> {
        let output_path = results_folder.join(output_name);
        image.save(&output_path)
            .map_err(|err| format!("Annotator: Cannot write {output_path}.\nReason: {err}", output_path = output_path.display()))?;
        Ok(output_path)
    }
}
