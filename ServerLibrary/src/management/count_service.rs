use std::path::{Path, PathBuf};
use Common::detection::object::DetectedObject;
use Common::detection::vehicle_class::VehicleClass;
use crate::utils::logging::*;
use crate::utils::config::Config;
use crate::detector::Detector;
use crate::management::annotation::Annotator;
use crate::management::file_manager::{RESULTS_FOLDER, TEMPORARY_FOLDER, UPLOADS_FOLDER};

pub struct ServiceSettings {
    pub temporary_folder: PathBuf,
    pub uploads_folder: PathBuf,
    pub results_folder: PathBuf,
    pub retain_uploads: bool,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            temporary_folder: PathBuf::from(TEMPORARY_FOLDER),
            uploads_folder: PathBuf::from(UPLOADS_FOLDER),
            results_folder: PathBuf::from(RESULTS_FOLDER),
            retain_uploads: config.retain_uploads,
        }
    }
}

/// Shared, read-only inference state handed to every request handler.
///
/// Constructed once at startup; nothing in here is mutated afterwards.
pub struct CountService {
    detector: Box<dyn Detector>,
    annotator: Option<Annotator>,
    settings: ServiceSettings,
}

impl CountService {
    pub fn new(detector: Box<dyn Detector>, annotator: Option<Annotator>, settings: ServiceSettings) -> Self {
        Self {
            detector,
            annotator,
            settings,
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn count_vehicles(objects: &[DetectedObject]) -> usize {
        objects.iter().filter(|object| VehicleClass::is_vehicle(object.class_id)).count()
    }

    /// Decode, detect and count one uploaded image.
    ///
    /// The annotated copy is best-effort: a failed write is logged and the
    /// count is still returned.
    pub fn process_image(&self, image_path: &Path, source_name: Option<&str>) -> Result<usize, String> {
        let image = image::open(image_path)
            .map_err(|err| format!("Cannot read image {image_path}.\nReason: {err}", image_path = image_path.display()))?
            .to_rgb8();
        let objects = self.detector.detect(&image)?;
        let vehicle_count = Self::count_vehicles(&objects);
        logging_information!("Count Service", format!("{} objects detected, {} counted as vehicles", objects.len(), vehicle_count));
        if let Some(annotator) = &self.annotator {
            let annotated = annotator.render(&image, &objects, vehicle_count);
            let output_name = Annotator::output_name(source_name);
            match Annotator::save(&annotated, &self.settings.results_folder, &output_name) {
                Ok(output_path) => logging_information!("Count Service", format!("Saved annotated image {}", output_path.display())),
                Err(message) => logging_warning!("Count Service", message),
            }
        }
        Ok(vehicle_count)
    }
}
