use tokio::fs::File;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use actix_multipart::Field;
use actix_web::http::header::ContentDisposition;
use crate::management::staged_upload::StagedUpload;

pub fn get_field_name(content_disposition: &ContentDisposition) -> Option<String> {
    match content_disposition.get_name() {
        Some(field_name) => Some(field_name.to_string()),
        _ => None,
    }
}

pub fn get_file_name(content_disposition: &ContentDisposition) -> Option<String> {
    match content_disposition.get_filename() {
        Some(file_name) => Some(file_name.to_string()),
        _ => None,
    }
}

pub async fn store_field(staged: &StagedUpload, field: &mut Field) -> Result<(), String> {
    let mut file = File::create(staged.path()).await
        .map_err(|err| format!("Cannot store upload.\nReason: {err}"))?;
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|err| format!("Cannot read upload stream.\nReason: {err}"))?;
        file.write_all(&data).await
            .map_err(|err| format!("Cannot store upload.\nReason: {err}"))?;
    }
    Ok(())
}
