use futures::TryStreamExt;
use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse, Responder, Scope};
use crate::management::count_service::CountService;
use crate::management::staged_upload::StagedUpload;
use crate::web::utils::multipart::{get_field_name, get_file_name, store_field};
use crate::web::utils::response::{ErrorResponse, VehicleCountResponse};

pub fn initialize() -> Scope {
    web::scope("/count")
        .service(count_image)
}

#[post("")]
async fn count_image(count_service: web::Data<CountService>, mut payload: Multipart) -> impl Responder {
    let mut upload = None;
    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = match field.content_disposition() {
            Some(content_disposition) => content_disposition,
            None => continue,
        };
        if get_field_name(content_disposition).as_deref() != Some("image") {
            continue;
        }
        let file_name = get_file_name(content_disposition);
        let staged = StagedUpload::new(&count_service.settings().temporary_folder, file_name.as_deref());
        if let Err(message) = store_field(&staged, &mut field).await {
            return HttpResponse::InternalServerError().json(ErrorResponse::new(message));
        }
        upload = Some((staged, file_name));
        break;
    }
    let Some((staged, file_name)) = upload else {
        return HttpResponse::BadRequest().json(ErrorResponse::new("no image file"));
    };
    let count_service = count_service.into_inner();
    let result = web::block(move || {
        let result = count_service.process_image(staged.path(), file_name.as_deref());
        drop(staged);
        result
    }).await;
    match result {
        Ok(Ok(vehicle_count)) => HttpResponse::Ok().json(VehicleCountResponse::new(vehicle_count)),
        Ok(Err(message)) => HttpResponse::InternalServerError().json(ErrorResponse::new(message)),
        Err(err) => HttpResponse::InternalServerError().json(ErrorResponse::new(format!("Inference task failed.\nReason: {err}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::Path;
    use image::RgbImage;
    use actix_web::{test, App};
    use actix_web::http::StatusCode;
    use Common::detection::object::DetectedObject;
    use Common::detection::bounding_box::BoundingBox;
    use crate::detector::stub::StubDetector;
    use crate::management::count_service::ServiceSettings;

    const BOUNDARY: &str = "------------------------testboundary";

    fn multipart_body(field_name: &str, file_name: Option<&str>, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n").as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{field_name}\"\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn png_bytes() -> Vec<u8> {
        let image = RgbImage::from_pixel(64, 64, image::Rgb([40, 40, 40]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn object(class_id: usize) -> DetectedObject {
        DetectedObject::new(class_id, 0.9, BoundingBox::new(10, 50, 10, 50))
    }

    fn count_service(detector: StubDetector, folder: &Path) -> web::Data<CountService> {
        let settings = ServiceSettings {
            temporary_folder: folder.join("Temporary"),
            uploads_folder: folder.join("Uploads"),
            results_folder: folder.join("Results"),
            retain_uploads: false,
        };
        std::fs::create_dir_all(&settings.temporary_folder).unwrap();
        std::fs::create_dir_all(&settings.uploads_folder).unwrap();
        std::fs::create_dir_all(&settings.results_folder).unwrap();
        web::Data::new(CountService::new(Box::new(detector), None, settings))
    }

    async fn post_count(count_service: web::Data<CountService>, body: Vec<u8>) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(App::new().app_data(count_service).service(initialize())).await;
        let request = test::TestRequest::post()
            .uri("/count")
            .insert_header(("content-type", format!("multipart/form-data; boundary={BOUNDARY}")))
            .set_payload(body)
            .to_request();
        test::call_service(&app, request).await
    }

    #[actix_web::test]
    async fn missing_image_field_is_a_client_error() {
        let folder = tempfile::tempdir().unwrap();
        let service = count_service(StubDetector::empty(), folder.path());
        let body = multipart_body("document", Some("lot.jpg"), b"irrelevant");
        let response = post_count(service, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(payload["error"], "no image file");
    }

    #[actix_web::test]
    async fn undecodable_upload_is_a_server_error() {
        let folder = tempfile::tempdir().unwrap();
        let service = count_service(StubDetector::empty(), folder.path());
        let body = multipart_body("image", Some("notes.txt"), b"plain text, not an image");
        let response = post_count(service.clone(), body).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let payload: serde_json::Value = test::read_body_json(response).await;
        assert!(payload["error"].as_str().unwrap().contains("Cannot read image"));
        // the staging file is gone even on the failure path
        let staged = std::fs::read_dir(&service.settings().temporary_folder).unwrap().count();
        assert_eq!(staged, 0);
    }

    #[actix_web::test]
    async fn vehicles_are_counted_and_non_vehicles_ignored() {
        let folder = tempfile::tempdir().unwrap();
        // 3 cars and 2 pedestrians
        let detector = StubDetector::new(vec![object(2), object(2), object(2), object(0), object(0)]);
        let service = count_service(detector, folder.path());
        let body = multipart_body("image", Some("lot.png"), &png_bytes());
        let response = post_count(service.clone(), body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(payload["vehicle_count"], 3);
        let staged = std::fs::read_dir(&service.settings().temporary_folder).unwrap().count();
        assert_eq!(staged, 0);
    }

    #[actix_web::test]
    async fn zero_detections_count_as_zero() {
        let folder = tempfile::tempdir().unwrap();
        let service = count_service(StubDetector::empty(), folder.path());
        let body = multipart_body("image", Some("empty_lot.png"), &png_bytes());
        let response = post_count(service, body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(payload["vehicle_count"], 0);
    }
}
