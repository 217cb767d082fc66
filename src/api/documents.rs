//! Patient document uploads.

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway, MultipartForm};

use super::types::{Document, DocumentUpload};

pub const UPLOAD_PATH: &str = "/documents/upload";

fn patient_documents_endpoint(patient_id: i64) -> String {
    format!("/documents/patient/{patient_id}")
}

/// Upload a file as multipart fields `patient_id`, `document_type`, `file`.
///
/// # Errors
///
/// Returns an [`ApiError`]; an unknown patient is a 404.
pub async fn upload(gateway: &Gateway, upload: DocumentUpload) -> Result<Document, ApiError> {
    let DocumentUpload { patient_id, document_type, file_name, content_type, bytes } = upload;
    let form = MultipartForm::new().text("patient_id", patient_id).text("document_type", document_type);
    let form = match content_type {
        Some(mime) => form.file_with_type("file", file_name, mime, bytes),
        None => form.file("file", file_name, bytes),
    };
    gateway.send_json(ApiRequest::post(UPLOAD_PATH).multipart(form)).await
}

/// # Errors
///
/// Returns an [`ApiError`] if the request fails.
pub async fn for_patient(gateway: &Gateway, patient_id: i64) -> Result<Vec<Document>, ApiError> {
    gateway.send_json(ApiRequest::get(patient_documents_endpoint(patient_id))).await
}
