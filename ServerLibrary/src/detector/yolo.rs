use std::collections::HashMap;
use anyhow::{anyhow, Context, Result};
use image::{imageops, Rgb, RgbImage};
use image::imageops::FilterType;
use tract_onnx::prelude::*;
use Common::detection::object::DetectedObject;
use Common::detection::bounding_box::BoundingBox;
use crate::detector::Detector;

/// YOLOv8-style detector running on tract.
///
/// Expects a single-input ONNX export with a `[1, 4 + classes, anchors]`
/// output head in center/width/height box format.
pub struct YoloDetector {
    model: TypedSimplePlan<TypedModel>,
    input_size: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
}

impl YoloDetector {
    pub fn new(model_path: &str, input_size: u32, confidence_threshold: f32, iou_threshold: f32) -> Result<Self> {
        let size = input_size as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {model_path}"))?
            .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, size, size)))
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;
        Ok(Self {
            model,
            input_size,
            confidence_threshold,
            iou_threshold,
        })
    }

    fn run_inference(&self, image: &RgbImage) -> Result<Vec<DetectedObject>> {
        let letterbox = Letterbox::compute(image.width(), image.height(), self.input_size);
        let canvas = letterbox_image(image, &letterbox, self.input_size);
        let size = self.input_size as usize;
        let input = tract_ndarray::Array4::from_shape_fn((1, 3, size, size), |(_, channel, y, x)| {
            canvas.get_pixel(x as u32, y as u32)[channel] as f32 / 255.0
        });
        let outputs = self.model.run(tvec!(input.into_tensor().into()))
            .context("model execution failed")?;
        let output = outputs.first().ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = output.to_array_view::<f32>().context("model output tensor was not f32")?;
        let candidates = decode_predictions(&view, self.confidence_threshold)?;
        let kept = non_maximum_suppression(candidates, self.iou_threshold);
        let objects = kept.iter()
            .map(|candidate| DetectedObject::new(candidate.class_id, candidate.confidence, letterbox.unmap(candidate)))
            .collect();
        Ok(objects)
    }
}

impl Detector for YoloDetector {
    fn name(&self) -> &'static str {
        "yolo"
    }

    fn detect(&self, image: &RgbImage) -> Result<Vec<DetectedObject>, String> {
        self.run_inference(image).map_err(|err| format!("Detector failure.\nReason: {err:#}"))
    }
}

/// Detection in model input coordinates, before mapping back to the source
/// image.
#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub class_id: usize,
    pub confidence: f32,
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

/// Aspect-preserving resize onto a square canvas, and the inverse mapping.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Letterbox {
    scale: f32,
    pad_x: u32,
    pad_y: u32,
    scaled_width: u32,
    scaled_height: u32,
    source_width: u32,
    source_height: u32,
}

impl Letterbox {
    pub fn compute(source_width: u32, source_height: u32, input_size: u32) -> Self {
        let scale = (input_size as f32 / source_width as f32).min(input_size as f32 / source_height as f32);
        let scaled_width = ((source_width as f32 * scale).round() as u32).clamp(1, input_size);
        let scaled_height = ((source_height as f32 * scale).round() as u32).clamp(1, input_size);
        Self {
            scale,
            pad_x: (input_size - scaled_width) / 2,
            pad_y: (input_size - scaled_height) / 2,
            scaled_width,
            scaled_height,
            source_width,
            source_height,
        }
    }

    pub fn unmap(&self, candidate: &Candidate) -> BoundingBox {
        let max_x = (self.source_width - 1) as f32;
        let max_y = (self.source_height - 1) as f32;
        let xmin = ((candidate.xmin - self.pad_x as f32) / self.scale).clamp(0.0, max_x);
        let xmax = ((candidate.xmax - self.pad_x as f32) / self.scale).clamp(0.0, max_x);
        let ymin = ((candidate.ymin - self.pad_y as f32) / self.scale).clamp(0.0, max_y);
        let ymax = ((candidate.ymax - self.pad_y as f32) / self.scale).clamp(0.0, max_y);
        BoundingBox::new(xmin as u32, xmax as u32, ymin as u32, ymax as u32)
    }
}

fn letterbox_image(image: &RgbImage, letterbox: &Letterbox, input_size: u32) -> RgbImage {
    let resized = imageops::resize(image, letterbox.scaled_width, letterbox.scaled_height, FilterType::Triangle);
    let mut canvas = RgbImage::from_pixel(input_size, input_size, Rgb([114, 114, 114]));
    imageops::replace(&mut canvas, &resized, letterbox.pad_x as i64, letterbox.pad_y as i64);
    canvas
}

pub(crate) fn decode_predictions(view: &tract_ndarray::ArrayViewD<f32>, confidence_threshold: f32) -> Result<Vec<Candidate>> {
    let shape = view.shape();
    if shape.len() != 3 || shape[0] != 1 || shape[1] <= 4 {
        return Err(anyhow!("unexpected model output shape {shape:?}"));
    }
    let class_count = shape[1] - 4;
    let anchor_count = shape[2];
    let mut candidates = Vec::new();
    for anchor in 0..anchor_count {
        let mut best_class = 0;
        let mut best_score = f32::NEG_INFINITY;
        for class_id in 0..class_count {
            let score = view[[0, 4 + class_id, anchor]];
            if score > best_score {
                best_score = score;
                best_class = class_id;
            }
        }
        if best_score < confidence_threshold {
            continue;
        }
        let center_x = view[[0, 0, anchor]];
        let center_y = view[[0, 1, anchor]];
        let width = view[[0, 2, anchor]];
        let height = view[[0, 3, anchor]];
        candidates.push(Candidate {
            class_id: best_class,
            confidence: best_score,
            xmin: center_x - width / 2.0,
            ymin: center_y - height / 2.0,
            xmax: center_x + width / 2.0,
            ymax: center_y + height / 2.0,
        });
    }
    Ok(candidates)
}

pub(crate) fn non_maximum_suppression(candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    let mut by_class: HashMap<usize, Vec<Candidate>> = HashMap::new();
    for candidate in candidates {
        by_class.entry(candidate.class_id).or_default().push(candidate);
    }
    let mut kept = Vec::new();
    for (_, mut group) in by_class {
        group.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let mut suppressed = vec![false; group.len()];
        for i in 0..group.len() {
            if suppressed[i] {
                continue;
            }
            for j in (i + 1)..group.len() {
                if !suppressed[j] && intersection_over_union(&group[i], &group[j]) > iou_threshold {
                    suppressed[j] = true;
                }
            }
            kept.push(group[i].clone());
        }
    }
    kept
}

fn intersection_over_union(a: &Candidate, b: &Candidate) -> f32 {
    let inter_xmin = a.xmin.max(b.xmin);
    let inter_ymin = a.ymin.max(b.ymin);
    let inter_xmax = a.xmax.min(b.xmax);
    let inter_ymax = a.ymax.min(b.ymax);
    let inter_area = (inter_xmax - inter_xmin).max(0.0) * (inter_ymax - inter_ymin).max(0.0);
    let area_a = (a.xmax - a.xmin).max(0.0) * (a.ymax - a.ymin).max(0.0);
    let area_b = (b.xmax - b.xmin).max(0.0) * (b.ymax - b.ymin).max(0.0);
    let union_area = area_a + area_b - inter_area;
    if union_area <= 0.0 {
        0.0
    } else {
        inter_area / union_area
    }
}
