//! Patient registry, triage, and high-priority alerts.

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};

use super::Page;
use super::types::{NewPatient, Patient};

pub const PATIENTS_PATH: &str = "/patients/";
pub const HIGH_PRIORITY_ALERTS_PATH: &str = "/alerts/high-priority";

fn patient_endpoint(patient_id: i64) -> String {
    format!("/patients/{patient_id}")
}

fn triage_endpoint(patient_id: i64) -> String {
    format!("/patients/{patient_id}/triage")
}

/// # Errors
///
/// Returns an [`ApiError`] if the request fails.
pub async fn list(gateway: &Gateway, page: Page) -> Result<Vec<Patient>, ApiError> {
    gateway.send_json(page.apply(ApiRequest::get(PATIENTS_PATH))).await
}

/// # Errors
///
/// Returns an [`ApiError`]; an unknown id is a 404 [`ApiError::Validation`].
pub async fn get(gateway: &Gateway, patient_id: i64) -> Result<Patient, ApiError> {
    gateway.send_json(ApiRequest::get(patient_endpoint(patient_id))).await
}

/// Register a patient. The backend records the calling user as registrar.
///
/// # Errors
///
/// Returns an [`ApiError`] if the request fails.
pub async fn register(gateway: &Gateway, patient: &NewPatient) -> Result<Patient, ApiError> {
    gateway.send_json(ApiRequest::post(PATIENTS_PATH).json(patient)?).await
}

/// Set a patient's triage level. Levels are backend-defined strings.
///
/// # Errors
///
/// Returns an [`ApiError`] if the request fails.
pub async fn set_triage(gateway: &Gateway, patient_id: i64, triage_level: &str) -> Result<Patient, ApiError> {
    let body = serde_json::json!({ "triage_level": triage_level });
    gateway.send_json(ApiRequest::put(triage_endpoint(patient_id)).json_value(body)).await
}

/// Patients currently flagged as high priority.
///
/// # Errors
///
/// Returns an [`ApiError`] if the request fails.
pub async fn high_priority_alerts(gateway: &Gateway) -> Result<Vec<Patient>, ApiError> {
    gateway.send_json(ApiRequest::get(HIGH_PRIORITY_ALERTS_PATH)).await
}
