use tokio::fs;
use crate::utils::logging::*;

pub const TEMPORARY_FOLDER: &str = "Temporary";
pub const UPLOADS_FOLDER: &str = "Uploads";
pub const RESULTS_FOLDER: &str = "Results";

pub struct FileManager;

impl FileManager {
    pub async fn run() {
        logging_information!("File Manager", "Initializing");
        let folders = [TEMPORARY_FOLDER, UPLOADS_FOLDER, RESULTS_FOLDER];
        for &folder_name in &folders {
            match fs::create_dir_all(folder_name).await {
                Ok(_) => logging_information!("File Manager", format!("Create {folder_name} folder successfully")),
                Err(err) => logging_error!("File Manager", format!("Cannot create {folder_name} folder"), format!("Err: {err}")),
            }
        }
        logging_information!("File Manager", "Online now");
    }

    pub async fn terminate() {
        logging_information!("File Manager", "Terminating");
        // Uploads and Results hold deliverables, only staging is discarded.
        match fs::remove_dir_all(TEMPORARY_FOLDER).await {
            Ok(_) => logging_information!("File Manager", format!("Deleted {TEMPORARY_FOLDER} folder successfully")),
            Err(err) => logging_error!("File Manager", format!("Cannot delete {TEMPORARY_FOLDER} folder"), format!("Err: {err}")),
        }
        logging_information!("File Manager", "Termination complete");
    }
}
