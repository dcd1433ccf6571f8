use chrono::Local;
use futures::TryStreamExt;
use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse, Responder, Scope};
use crate::utils::static_files::StaticFiles;
use crate::management::count_service::CountService;
use crate::management::staged_upload::StagedUpload;
use crate::web::utils::multipart::{get_field_name, get_file_name, store_field};

const MISSING_FILE_PAGE: &str = r#"<html><body style="font-family:sans-serif; text-align:center; padding-top:50px;">
<h3>Error: No image was uploaded.</h3>
<a href="/">Back</a>
</body></html>
"#;

const EMPTY_FILE_PAGE: &str = r#"<html><body style="font-family:sans-serif; text-align:center; padding-top:50px;">
<h3>Error: No file selected.</h3>
<a href="/">Back</a>
</body></html>
"#;

pub fn initialize() -> Scope {
    web::scope("")
        .service(index)
        .service(web_count)
}

#[get("/")]
async fn index() -> impl Responder {
    let html = StaticFiles::get("html/upload.html").expect("File not found in static files.").data;
    HttpResponse::Ok().content_type("text/html").body(html)
}

#[post("/web_count")]
async fn web_count(count_service: web::Data<CountService>, mut payload: Multipart) -> impl Responder {
    let mut upload = None;
    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = match field.content_disposition() {
            Some(content_disposition) => content_disposition,
            None => continue,
        };
        if get_field_name(content_disposition).as_deref() != Some("image") {
            continue;
        }
        let file_name = match get_file_name(content_disposition) {
            Some(file_name) if !file_name.is_empty() => file_name,
            _ => return HttpResponse::BadRequest().content_type("text/html").body(EMPTY_FILE_PAGE),
        };
        let settings = count_service.settings();
        let staged = if settings.retain_uploads {
            let saved_name = format!("{}.jpg", Local::now().format("%Y%m%d_%H%M%S"));
            StagedUpload::named(&settings.uploads_folder, &saved_name)
        } else {
            StagedUpload::new(&settings.temporary_folder, Some(&file_name))
        };
        if let Err(message) = store_field(&staged, &mut field).await {
            return HttpResponse::InternalServerError().content_type("text/html").body(error_page(&message));
        }
        upload = Some((staged, file_name));
        break;
    }
    let Some((staged, file_name)) = upload else {
        return HttpResponse::BadRequest().content_type("text/html").body(MISSING_FILE_PAGE);
    };
    let count_service = count_service.into_inner();
    let retain_uploads = count_service.settings().retain_uploads;
    let result = web::block(move || {
        let result = count_service.process_image(staged.path(), Some(&file_name));
        if retain_uploads {
            // the browser upload outlives the request, even when counting fails
            let _ = staged.into_path();
        }
        result
    }).await;
    match result {
        Ok(Ok(vehicle_count)) => HttpResponse::Ok().content_type("text/html").body(result_page(vehicle_count)),
        Ok(Err(message)) => HttpResponse::InternalServerError().content_type("text/html").body(error_page(&message)),
        Err(err) => HttpResponse::InternalServerError().content_type("text/html").body(error_page(&format!("Inference task failed.\nReason: {err}"))),
    }
}

fn result_page(vehicle_count: usize) -> String {
    let template = StaticFiles::get("html/result.html").expect("File not found in static files.").data;
    String::from_utf8_lossy(&template).replace("{{vehicle_count}}", &vehicle_count.to_string())
}

fn error_page(message: &str) -> String {
    format!(
        "<html><body style=\"font-family:sans-serif; text-align:center; padding-top:50px;\">\n<h3>Error: {message}</h3>\n<a href=\"/\">Back</a>\n</body></html>\n"
    )
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

    fn multipart_body(field_name: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n").as_bytes(),
        );
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

    fn count_service(detector: StubDetector, folder: &Path, retain_uploads: bool) -> web::Data<CountService> {
        let settings = ServiceSettings {
            temporary_folder: folder.join("Temporary"),
            uploads_folder: folder.join("Uploads"),
            results_folder: folder.join("Results"),
            retain_uploads,
        };
        std::fs::create_dir_all(&settings.temporary_folder).unwrap();
        std::fs::create_dir_all(&settings.uploads_folder).unwrap();
        std::fs::create_dir_all(&settings.results_folder).unwrap();
        web::Data::new(CountService::new(Box::new(detector), None, settings))
    }

    async fn post_web_count(count_service: web::Data<CountService>, body: Vec<u8>) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(App::new().app_data(count_service).service(initialize())).await;
        let request = test::TestRequest::post()
            .uri("/web_count")
            .insert_header(("content-type", format!("multipart/form-data; boundary={BOUNDARY}")))
            .set_payload(body)
            .to_request();
        test::call_service(&app, request).await
    }

    #[actix_web::test]
    async fn index_serves_the_upload_form() {
        let app = test::init_service(App::new().service(initialize())).await;
        let request = test::TestRequest::get().uri("/").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = test::read_body(response).await;
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("<form"));
        assert!(html.contains("name=\"image\""));
    }

    #[actix_web::test]
    async fn missing_image_field_renders_an_error_page() {
        let folder = tempfile::tempdir().unwrap();
        let service = count_service(StubDetector::empty(), folder.path(), true);
        let body = multipart_body("document", "lot.jpg", b"irrelevant");
        let response = post_web_count(service, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = test::read_body(response).await;
        assert!(String::from_utf8_lossy(&body).contains("No image was uploaded"));
    }

    #[actix_web::test]
    async fn empty_filename_renders_an_error_page() {
        let folder = tempfile::tempdir().unwrap();
        let service = count_service(StubDetector::empty(), folder.path(), true);
        let body = multipart_body("image", "", b"irrelevant");
        let response = post_web_count(service, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = test::read_body(response).await;
        assert!(String::from_utf8_lossy(&body).contains("No file selected"));
    }

    #[actix_web::test]
    async fn count_is_rendered_and_upload_retained() {
        let folder = tempfile::tempdir().unwrap();
        let detector = StubDetector::new(vec![
            DetectedObject::new(2, 0.9, BoundingBox::new(10, 50, 10, 50)),
            DetectedObject::new(2, 0.8, BoundingBox::new(60, 90, 10, 50)),
        ]);
        let service = count_service(detector, folder.path(), true);
        let body = multipart_body("image", "lot.png", &png_bytes());
        let response = post_web_count(service.clone(), body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = test::read_body(response).await;
        assert!(String::from_utf8_lossy(&body).contains("\"vehicle_count\": 2"));
        let uploads = std::fs::read_dir(&service.settings().uploads_folder).unwrap().count();
        assert_eq!(uploads, 1);
    }

    #[actix_web::test]
    async fn uploads_are_discarded_when_retention_is_off() {
        let folder = tempfile::tempdir().unwrap();
        let service = count_service(StubDetector::empty(), folder.path(), false);
        let body = multipart_body("image", "lot.png", &png_bytes());
        let response = post_web_count(service.clone(), body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let uploads = std::fs::read_dir(&service.settings().uploads_folder).unwrap().count();
        assert_eq!(uploads, 0);
        let staged = std::fs::read_dir(&service.settings().temporary_folder).unwrap().count();
        assert_eq!(staged, 0);
    }
}
