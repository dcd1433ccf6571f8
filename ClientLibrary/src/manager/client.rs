use uuid::Uuid;
use std::fs;
use std::path::Path;
use crate::utils::logging::*;
use crate::utils::config::Config;

pub struct Client;

impl Client {
    /// Upload one image to the counting endpoint and print the response.
    ///
    /// Failures are reported, not recovered; the transport's default timeout
    /// behavior applies.
    pub fn run(image_path: &Path) {
        let config = Config::now();
        logging_information!("Client", format!("Uploading {} to {}", image_path.display(), config.server_url));
        match Self::send_image(&config.server_url, image_path) {
            Ok(body) => match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(payload) => println!("Result from server: {payload}"),
                Err(_) => println!("Result from server: {body}"),
            },
            Err(message) => logging_error!("Client", message),
        }
    }

    fn send_image(server_url: &str, image_path: &Path) -> Result<String, String> {
        let image_bytes = fs::read(image_path)
            .map_err(|err| format!("Cannot read file {image_path}.\nReason: {err}", image_path = image_path.display()))?;
        let file_name = image_path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.jpg");
        let boundary = format!("----ParkingClientBoundary{}", Uuid::new_v4().simple());
        let body = Self::multipart_body(&boundary, "image", file_name, &image_bytes);
        let response = ureq::post(server_url)
            .set("Content-Type", &format!("multipart/form-data; boundary={boundary}"))
            .send_bytes(&body);
        match response {
            Ok(response) => response.into_string()
                .map_err(|err| format!("Cannot read server response.\nReason: {err}")),
            Err(ureq::Error::Status(code, response)) => {
                let text = response.into_string().unwrap_or_default();
                Err(format!("Error: {code} {text}"))
            },
            Err(err) => Err(format!("Error: {err}")),
        }
    }

    pub(crate) fn multipart_body(boundary: &str, field_name: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }
}
