use tokio::time::sleep;
use std::time::Duration;
use actix_web::{web, App, HttpServer};
use crate::utils::logging::*;
use crate::utils::config::Config;
use crate::web::{api, page};
use crate::detector::yolo::YoloDetector;
use crate::management::annotation::Annotator;
use crate::management::file_manager::FileManager;
use crate::management::count_service::{CountService, ServiceSettings};

pub struct Server;

impl Server {
    pub async fn run() {
        let config = Config::now().await;
        FileManager::run().await;
        let detector = match YoloDetector::new(&config.model_path, config.model_input_size, config.confidence_threshold, config.iou_threshold) {
            Ok(detector) => detector,
            Err(err) => {
                logging_emergency!("Server", "Unable to load detection model", format!("Err: {err:#}"));
                return;
            },
        };
        logging_information!("Server", format!("Loaded detection model {}", config.model_path));
        let annotator = if config.save_annotated {
            match Annotator::new(&config) {
                Ok(annotator) => Some(annotator),
                Err(message) => {
                    logging_warning!("Server", "Annotation disabled", message);
                    None
                },
            }
        } else {
            None
        };
        let count_service = web::Data::new(CountService::new(Box::new(detector), annotator, ServiceSettings::from_config(&config)));
        let http_server = loop {
            let config = Config::now().await;
            let count_service = count_service.clone();
            let http_server = HttpServer::new(move || {
                App::new()
                    .app_data(count_service.clone())
                    .service(api::count::initialize())
                    .service(page::upload::initialize())
            }).bind(format!("0.0.0.0:{}", config.http_server_bind_port));
            match http_server {
                Ok(http_server) => break http_server,
                Err(err) => {
                    logging_critical!("Server", "Failed to bind port", format!("Err: {err}"));
                    sleep(Duration::from_secs(config.bind_retry_duration)).await;
                    continue;
                },
            }
        };
        logging_information!("Server", "Web service ready");
        logging_information!("Server", "Online now");
        if let Err(err) = http_server.run().await {
            logging_emergency!("Server", "An error occurred while running the web service", format!("Err: {err}"));
        }
    }

    pub async fn terminate() {
        logging_information!("Server", "Termination in progress");
        FileManager::terminate().await;
        logging_information!("Server", "Termination complete");
    }
}
