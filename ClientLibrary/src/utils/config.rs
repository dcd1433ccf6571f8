use std::fs;
use std::sync::RwLock;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

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
    pub server_url: String, //count endpoint
}

impl Config {
    pub fn new() -> Self {
        //Seriously, the program must be terminated.
        let toml_string = fs::read_to_string("./client.toml").expect("No configuration found.");
        let config_table: ConfigTable = toml::from_str(&toml_string).expect("Unable parse configuration.");
        let config = config_table.config;
        if !Self::validate(&config) {
            panic!("Invalid configuration.");
        }
        config
    }

    pub fn now() -> Config {
        CONFIG.read().expect("Configuration lock poisoned.").clone()
    }

    pub fn update(config: Config) {
        *CONFIG.write().expect("Configuration lock poisoned.") = config
    }

    pub fn validate(config: &Config) -> bool {
        Self::validate_url(&config.server_url)
    }

    fn validate_url(url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }
}
