use std::fs;
use tokio::sync::RwLock;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use crate::utils::logging::*;

lazy_static! {
    static ref CONFIG: RwLock<Config> = RwLock::new(Config::new());
}

#[derive(Debug, Deserialize)]
struct ConfigTable {
    #[serde(rename = "Config")]
    config: Config,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub http_server_bind_port: u16, //port
    pub bind_retry_duration: u64, //seconds
    pub model_path: String, //path
    pub model_input_size: u32, //pixels
    pub confidence_threshold: f32, //0.0 - 1.0
    pub iou_threshold: f32, //0.0 - 1.0
    pub save_annotated: bool, //write annotated copies to the results folder
    pub retain_uploads: bool, //keep browser uploads after counting
    pub font_path: String, //path
    pub font_size: f32, //points
    pub border_width: u32, //pixels
    pub border_color: [u8; 3], //RGB
    pub text_color: [u8; 3], //RGB
}

impl Config {
    pub fn new() -> Self {
        //Seriously, the program must be terminated.
        match fs::read_to_string("./server.toml") {
            Ok(toml_string) => {
                match toml::from_str::<ConfigTable>(&toml_string) {
                    Ok(config_table) => {
                        let config = config_table.config;
                        if !Self::validate(&config) {
                            logging_emergency!("Config", "Invalid configuration file");
                            panic!("Invalid configuration file");
                        }
                        config
                    },
                    Err(err) => {
                        logging_emergency!("Config", "Unable to parse configuration file", format!("Err: {err}"));
                        panic!("Unable to parse configuration file");
                    },
                }
            },
            Err(err) => {
                logging_emergency!("Config", "Configuration file not found", format!("Err: {err}"));
                panic!("Configuration file not found");
            },
        }
    }

    pub async fn now() -> Config {
        CONFIG.read().await.clone()
    }

    pub async fn update(config: Config) {
        *CONFIG.write().await = config
    }

    pub fn validate(config: &Config) -> bool {
        Self::validate_second(config.bind_retry_duration)
            && Self::validate_path(&config.model_path)
            && Self::validate_input_size(config.model_input_size)
            && Self::validate_threshold(config.confidence_threshold)
            && Self::validate_threshold(config.iou_threshold)
            && Self::validate_path(&config.font_path)
            && config.font_size > 0.0
            && config.border_width > 0
    }

    fn validate_second(second: u64) -> bool {
        second <= 86400
    }

    fn validate_threshold(threshold: f32) -> bool {
        (0.0..=1.0).contains(&threshold)
    }

    fn validate_input_size(size: u32) -> bool {
        size >= 32 && size <= 4096 && size % 32 == 0
    }

    fn validate_path(path: &str) -> bool {
        !path.trim().is_empty()
    }
}
